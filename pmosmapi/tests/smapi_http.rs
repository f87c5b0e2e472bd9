use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pmolibrary::MemoryLibrary;
use pmosmapi::{LibraryServices, SmapiConfig, SonosHelper, SonosService, smapi_router};
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

const CATALOG: &str = r#"
music_folders:
  - { id: 1, name: Music, root: 1 }
media_files:
  - { id: 1, path: /music, kind: directory, title: Music }
  - { id: 2, parent_id: 1, path: /music/Daft Punk, kind: album, title: Discovery, album_artist: Daft Punk }
  - { id: 3, parent_id: 2, path: /music/Daft Punk/01.flac, kind: music, title: One More Time, artist: Daft Punk, track_number: 1, duration_seconds: 320, suffix: flac }
  - { id: 4, parent_id: 2, path: /music/Daft Punk/02.flac, kind: music, title: Aerodynamic, artist: Daft Punk, track_number: 2, duration_seconds: 212, suffix: flac }
  - { id: 5, parent_id: 2, path: /music/Daft Punk/03.flac, kind: music, title: Digital Love, artist: Daft Punk, track_number: 3, duration_seconds: 301, suffix: flac }
playlists:
  - { id: 1, name: Favourites, username: alice, files: [5, 3] }
"#;

fn router() -> axum::Router {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    let library = Arc::new(MemoryLibrary::from_yaml_file(file.path()).unwrap());

    let config = SmapiConfig {
        host: "192.168.1.20".into(),
        http_port: 4040,
        context_path: "music".into(),
        ..Default::default()
    };
    let helper = SonosHelper::new(LibraryServices::from_shared(library), config);
    smapi_router(Arc::new(SonosService::new(helper)))
}

fn soap(body: &str) -> Request<Body> {
    let envelope = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <credentials xmlns="http://www.sonos.com/Services/1.1">
      <deviceId>00-0E-58-28-3B-8C:5</deviceId>
      <deviceProvider>Sonos</deviceProvider>
    </credentials>
  </s:Header>
  <s:Body>{}</s:Body>
</s:Envelope>"#,
        body
    );

    Request::post("/ws/Sonos")
        .header(header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"")
        .header("SOAPACTION", "\"http://www.sonos.com/Services/1.1#getMetadata\"")
        .body(Body::from(envelope))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, String, String) {
    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn get_metadata_pages_album_tracks() {
    let (status, content_type, xml) = send(soap(
        r#"<getMetadata xmlns="http://www.sonos.com/Services/1.1">
             <id>2</id><index>1</index><count>1</count>
           </getMetadata>"#,
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/xml; charset=\"utf-8\"");
    assert!(xml.contains("<index>1</index>"));
    assert!(xml.contains("<count>1</count>"));
    assert!(xml.contains("<total>3</total>"));
    assert!(xml.contains("<title>Aerodynamic</title>"));
    assert!(xml.contains("<mimeType>audio/flac</mimeType>"));
    assert!(!xml.contains("One More Time"));
}

#[tokio::test]
async fn get_metadata_playlist() {
    let (status, _, xml) = send(soap(
        r#"<getMetadata xmlns="http://www.sonos.com/Services/1.1">
             <id>pl-1</id><index>0</index><count>10</count>
           </getMetadata>"#,
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<total>2</total>"));
    let digital = xml.find("Digital Love").unwrap();
    let one_more = xml.find("One More Time").unwrap();
    assert!(digital < one_more);
}

#[tokio::test]
async fn get_media_uri_uses_context_path() {
    let (status, _, xml) = send(soap(
        r#"<getMediaURI xmlns="http://www.sonos.com/Services/1.1"><id>3</id></getMediaURI>"#,
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains(
        "<getMediaURIResult>http://192.168.1.20:4040/music/stream?id=3</getMediaURIResult>"
    ));
}

#[tokio::test]
async fn get_last_update_returns_tokens() {
    let (status, _, xml) = send(soap(
        r#"<getLastUpdate xmlns="http://www.sonos.com/Services/1.1"/>"#,
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<getLastUpdateResult>"));
    assert!(xml.contains("<catalog>"));
    assert!(xml.contains("<favorites>"));
}

#[tokio::test]
async fn malformed_id_is_item_not_found() {
    let (status, _, xml) = send(soap(
        r#"<getMetadata xmlns="http://www.sonos.com/Services/1.1"><id>pl-one</id></getMetadata>"#,
    ))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(xml.contains("<faultcode>s:Client.ItemNotFound</faultcode>"));
}

#[tokio::test]
async fn presentation_map_is_served() {
    let request = Request::get("/sonos/presentationMap.xml")
        .body(Body::empty())
        .unwrap();
    let (status, content_type, xml) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/xml"));
    assert!(xml.contains("<Presentation>"));
}
