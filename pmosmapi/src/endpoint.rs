//! # Point d'entrée HTTP SMAPI
//!
//! - `POST <endpoint_path>` : enveloppe SOAP, une opération par requête
//! - `GET /sonos/presentationMap.xml` : presentation map statique
//!
//! Les faults SOAP 1.1 sont renvoyés avec un statut HTTP 500.

use crate::config::PRESENTATION_MAP_PATH;
use crate::error::{Result, SmapiError};
use crate::model::text_element;
use crate::presentation::PRESENTATION_MAP;
use crate::service::SonosService;
use crate::soap::{SMAPI_NAMESPACE, SoapAction, SoapFault, build_soap_response, parse_soap_action};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use xmltree::{Element, XMLNode};

const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

const FALLBACK_FAULT: &str = "<?xml version=\"1.0\"?><s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body><s:Fault><faultcode>s:Server</faultcode><faultstring>Internal Error</faultstring></s:Fault></s:Body></s:Envelope>";

/// Nombre d'éléments renvoyés quand la requête ne précise pas `count`
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Routeur axum du service SMAPI
pub fn smapi_router(service: Arc<SonosService>) -> Router {
    let endpoint_path = service.helper().config().normalized_endpoint_path();

    Router::new()
        .route(&endpoint_path, post(control_handler))
        .route(PRESENTATION_MAP_PATH, get(presentation_map_handler))
        .with_state(service)
}

async fn control_handler(State(service): State<Arc<SonosService>>, body: Bytes) -> Response {
    let (status, xml) = handle_soap_request(&service, &body).await;
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response()
}

async fn presentation_map_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        PRESENTATION_MAP,
    )
        .into_response()
}

/// Traite une enveloppe SOAP complète et renvoie le statut et le XML à servir
pub async fn handle_soap_request(service: &SonosService, body: &[u8]) -> (StatusCode, String) {
    let action = match parse_soap_action(body) {
        Ok(action) => action,
        Err(e) => {
            error!("❌ Failed to parse SOAP: {}", e);
            let fault = SoapFault::client(format!("Invalid SOAP request: {}", e));
            return (StatusCode::INTERNAL_SERVER_ERROR, fault_xml(&fault));
        }
    };

    debug!("🎬 Received SMAPI action: {}", action.name);
    if let Some(credentials) = action.credentials() {
        debug!(
            device_id = credentials.device_id.as_deref().unwrap_or(""),
            provider = credentials.device_provider.as_deref().unwrap_or(""),
            "Caller credentials"
        );
    }

    match dispatch(service, &action).await {
        Ok(result) => match build_soap_response(SMAPI_NAMESPACE, &action.name, result) {
            Ok(xml) => (StatusCode::OK, xml),
            Err(e) => {
                error!("❌ Failed to build SOAP response for {}: {}", action.name, e);
                (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_FAULT.to_string())
            }
        },
        Err(err) => {
            if err.is_client_error() {
                warn!("⚠️ {} rejected: {}", action.name, err);
            } else {
                error!("❌ {} failed: {}", action.name, err);
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                fault_xml(&SoapFault::from(&err)),
            )
        }
    }
}

fn fault_xml(fault: &SoapFault) -> String {
    fault
        .to_xml()
        .unwrap_or_else(|_| FALLBACK_FAULT.to_string())
}

fn result_name(action: &str) -> String {
    format!("{}Result", action)
}

/// Appelle l'opération correspondant à `action.name`
///
/// `Ok(None)` produit une réponse `<…Response/>` vide.
async fn dispatch(service: &SonosService, action: &SoapAction) -> Result<Option<Element>> {
    let name = action.name.as_str();

    match name {
        "getLastUpdate" => {
            let update = service.get_last_update().await?;
            Ok(Some(update.to_element(&result_name(name))))
        }
        "getMetadata" => {
            let list = service
                .get_metadata(
                    arg_str(action, "id"),
                    arg_u32(action, "index", 0)?,
                    arg_u32(action, "count", DEFAULT_PAGE_SIZE)?,
                    arg_bool(action, "recursive")?,
                )
                .await?;
            Ok(Some(list.to_element(&result_name(name))))
        }
        "getSessionId" => {
            let session = service
                .get_session_id(arg_str(action, "username"), arg_str(action, "password"))
                .await?;
            Ok(Some(text_element(&result_name(name), &session)))
        }
        "getMediaMetadata" => {
            let media = service.get_media_metadata(arg_str(action, "id")).await?;
            let mut result = Element::new(&result_name(name));
            result.children.push(XMLNode::Element(media.to_element()));
            Ok(Some(result))
        }
        "getMediaURI" => {
            let uri = service.get_media_uri(arg_str(action, "id")).await?;
            Ok(Some(uri.to_element(&result_name(name))))
        }
        "rateItem" => {
            service
                .rate_item(arg_str(action, "id"), arg_i32(action, "rating")?)
                .await?;
            Ok(None)
        }
        "createContainer" => {
            service
                .create_container(
                    arg_str(action, "containerType"),
                    arg_str(action, "title"),
                    arg_str(action, "parentId"),
                    arg_str(action, "seedId"),
                )
                .await?;
            Ok(None)
        }
        "addToContainer" => {
            service
                .add_to_container(
                    arg_str(action, "id"),
                    arg_str(action, "parentId"),
                    arg_i32(action, "index")?,
                    arg_str(action, "updateId"),
                )
                .await?;
            Ok(None)
        }
        "renameContainer" => {
            service
                .rename_container(arg_str(action, "id"), arg_str(action, "title"))
                .await?;
            Ok(None)
        }
        "getStreamingMetadata" => {
            service
                .get_streaming_metadata(
                    arg_str(action, "id"),
                    arg_str(action, "startTime"),
                    arg_i32(action, "duration")?,
                )
                .await?;
            Ok(None)
        }
        "reorderContainer" => {
            service
                .reorder_container(
                    arg_str(action, "id"),
                    arg_str(action, "from"),
                    arg_i32(action, "to")?,
                    arg_str(action, "updateId"),
                )
                .await?;
            Ok(None)
        }
        "getExtendedMetadataText" => {
            service
                .get_extended_metadata_text(arg_str(action, "id"), arg_str(action, "type"))
                .await?;
            Ok(None)
        }
        "getDeviceLinkCode" => {
            service
                .get_device_link_code(arg_str(action, "householdId"))
                .await?;
            Ok(None)
        }
        "deleteItem" => {
            service.delete_item(arg_str(action, "favorite")).await?;
            Ok(None)
        }
        "reportAccountAction" => {
            service
                .report_account_action(arg_str(action, "type"))
                .await?;
            Ok(None)
        }
        "setPlayedSeconds" => {
            service
                .set_played_seconds(arg_str(action, "id"), arg_i32(action, "seconds")?)
                .await?;
            Ok(None)
        }
        "reportPlaySeconds" => {
            service
                .report_play_seconds(arg_str(action, "id"), arg_i32(action, "seconds")?)
                .await?;
            Ok(None)
        }
        "getDeviceAuthToken" => {
            service
                .get_device_auth_token(
                    arg_str(action, "householdId"),
                    arg_str(action, "linkCode"),
                    arg_str(action, "linkDeviceId"),
                )
                .await?;
            Ok(None)
        }
        "reportStatus" => {
            service
                .report_status(
                    arg_str(action, "id"),
                    arg_i32(action, "errorCode")?,
                    arg_str(action, "message"),
                )
                .await?;
            Ok(None)
        }
        "getExtendedMetadata" => {
            service.get_extended_metadata(arg_str(action, "id")).await?;
            Ok(None)
        }
        "getScrollIndices" => {
            service.get_scroll_indices(arg_str(action, "id")).await?;
            Ok(None)
        }
        "deleteContainer" => {
            service.delete_container(arg_str(action, "id")).await?;
            Ok(None)
        }
        "reportPlayStatus" => {
            service
                .report_play_status(arg_str(action, "id"), arg_str(action, "status"))
                .await?;
            Ok(None)
        }
        "getContentKey" => {
            service
                .get_content_key(arg_str(action, "id"), arg_str(action, "uri"))
                .await?;
            Ok(None)
        }
        "search" => {
            service
                .search(
                    arg_str(action, "id"),
                    arg_str(action, "term"),
                    arg_u32(action, "index", 0)?,
                    arg_u32(action, "count", DEFAULT_PAGE_SIZE)?,
                )
                .await?;
            Ok(None)
        }
        "removeFromContainer" => {
            service
                .remove_from_container(
                    arg_str(action, "id"),
                    arg_str(action, "indices"),
                    arg_str(action, "updateId"),
                )
                .await?;
            Ok(None)
        }
        "createItem" => {
            service.create_item(arg_str(action, "favorite")).await?;
            Ok(None)
        }
        other => {
            info!("❓ Unknown SMAPI action: {}", other);
            Err(SmapiError::UnsupportedOperation(other.to_string()))
        }
    }
}

fn arg_str<'a>(action: &'a SoapAction, name: &str) -> &'a str {
    action.arg(name).unwrap_or("")
}

fn invalid_argument(name: &str, value: &str) -> SmapiError {
    SmapiError::InvalidArgument {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Entier non signé, `default` si l'argument est absent ou vide
fn arg_u32(action: &SoapAction, name: &str, default: u32) -> Result<u32> {
    match action.arg(name) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| invalid_argument(name, value)),
    }
}

fn arg_i32(action: &SoapAction, name: &str) -> Result<i32> {
    match action.arg(name) {
        None | Some("") => Ok(0),
        Some(value) => value.parse().map_err(|_| invalid_argument(name, value)),
    }
}

/// Booléen `xsd:boolean` (`true`, `false`, `1`, `0`)
fn arg_bool(action: &SoapAction, name: &str) -> Result<bool> {
    match action.arg(name) {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(value) => Err(invalid_argument(name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::tests::helper;

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>{}</s:Body>
</s:Envelope>"#,
            body
        )
    }

    async fn call(body: &str) -> (StatusCode, String) {
        let service = SonosService::new(helper());
        handle_soap_request(&service, envelope(body).as_bytes()).await
    }

    #[tokio::test]
    async fn test_get_metadata_defaults() {
        let (status, xml) = call(
            r#"<getMetadata xmlns="http://www.sonos.com/Services/1.1"><id>root</id></getMetadata>"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("<getMetadataResponse xmlns=\"http://www.sonos.com/Services/1.1\">"));
        assert!(xml.contains("<getMetadataResult>"));
        assert!(xml.contains("<index>0</index>"));
        assert!(xml.contains("<count>2</count>"));
        assert!(xml.contains("<total>2</total>"));
        assert!(xml.contains("<title>Browse library</title>"));
    }

    #[tokio::test]
    async fn test_invalid_count_is_client_fault() {
        let (status, xml) = call(
            r#"<getMetadata xmlns="http://www.sonos.com/Services/1.1"><id>root</id><count>-4</count></getMetadata>"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(xml.contains("<faultcode>s:Client.InvalidArguments</faultcode>"));
    }

    #[tokio::test]
    async fn test_unknown_item_fault() {
        let (status, xml) = call(
            r#"<getMediaURI xmlns="http://www.sonos.com/Services/1.1"><id>12345</id></getMediaURI>"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(xml.contains("<faultcode>s:Client.ItemNotFound</faultcode>"));
    }

    #[tokio::test]
    async fn test_unknown_action_fault() {
        let (status, xml) =
            call(r#"<launchRocket xmlns="http://www.sonos.com/Services/1.1"/>"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(xml.contains("<faultcode>s:Client.UnsupportedOperation</faultcode>"));
    }

    #[tokio::test]
    async fn test_malformed_envelope() {
        let service = SonosService::new(helper());
        let (status, xml) = handle_soap_request(&service, b"<s:Envelope").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(xml.contains("<faultcode>s:Client</faultcode>"));
    }

    #[tokio::test]
    async fn test_stub_operation_empty_response() {
        let (status, xml) = call(
            r#"<rateItem xmlns="http://www.sonos.com/Services/1.1"><id>3</id><rating>1</rating></rateItem>"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("rateItemResponse"));
        assert!(!xml.contains("rateItemResult"));
    }

    /// Opérations acceptées sans effet, avec des arguments typiques d'une enceinte
    const UNSUPPORTED_CALLS: &[(&str, &str)] = &[
        ("rateItem", "<id>3</id><rating>1</rating>"),
        (
            "createContainer",
            "<containerType>playlist</containerType><title>New</title><parentId>playlists</parentId><seedId>3</seedId>",
        ),
        (
            "addToContainer",
            "<id>3</id><parentId>pl-10</parentId><index>2</index><updateId>u1</updateId>",
        ),
        ("renameContainer", "<id>pl-10</id><title>Renamed</title>"),
        (
            "getStreamingMetadata",
            "<id>3</id><startTime>2024-01-01T00:00:00Z</startTime><duration>3600</duration>",
        ),
        (
            "reorderContainer",
            "<id>pl-10</id><from>0</from><to>2</to><updateId>u1</updateId>",
        ),
        ("getExtendedMetadataText", "<id>3</id><type>ARTIST</type>"),
        ("getDeviceLinkCode", "<householdId>Sonos_abc</householdId>"),
        ("deleteItem", "<favorite>3</favorite>"),
        ("reportAccountAction", "<type>upgrade</type>"),
        ("setPlayedSeconds", "<id>3</id><seconds>42</seconds>"),
        ("reportPlaySeconds", "<id>3</id><seconds>42</seconds>"),
        (
            "getDeviceAuthToken",
            "<householdId>Sonos_abc</householdId><linkCode>XYZ</linkCode><linkDeviceId>dev</linkDeviceId>",
        ),
        (
            "reportStatus",
            "<id>3</id><errorCode>1</errorCode><message>skipped</message>",
        ),
        ("getExtendedMetadata", "<id>3</id>"),
        ("getScrollIndices", "<id>library</id>"),
        ("deleteContainer", "<id>pl-10</id>"),
        ("reportPlayStatus", "<id>3</id><status>PLAY_START</status>"),
        ("getContentKey", "<id>3</id><uri>http://x/stream?id=3</uri>"),
        ("search", "<id>root</id><term>air</term><index>0</index><count>10</count>"),
        (
            "removeFromContainer",
            "<id>pl-10</id><indices>0,2</indices><updateId>u1</updateId>",
        ),
        ("createItem", "<favorite>3</favorite>"),
    ];

    #[tokio::test]
    async fn test_every_unsupported_operation_is_dispatched() {
        assert_eq!(UNSUPPORTED_CALLS.len(), 22);

        for (op, args) in UNSUPPORTED_CALLS {
            let (status, xml) = call(&format!(
                r#"<{op} xmlns="http://www.sonos.com/Services/1.1">{args}</{op}>"#
            ))
            .await;

            assert_eq!(status, StatusCode::OK, "{op}: {xml}");
            assert!(xml.contains(&format!("<{op}Response")), "{op}: {xml}");
            assert!(!xml.contains(&format!("{op}Result")), "{op}: {xml}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_operation_without_arguments() {
        for (op, _) in UNSUPPORTED_CALLS {
            let (status, xml) =
                call(&format!(r#"<{op} xmlns="http://www.sonos.com/Services/1.1"/>"#)).await;
            assert_eq!(status, StatusCode::OK, "{op}: {xml}");
        }
    }

    #[tokio::test]
    async fn test_get_media_metadata_playlist() {
        let (status, xml) = call(
            r#"<getMediaMetadata xmlns="http://www.sonos.com/Services/1.1"><id>pl-10</id></getMediaMetadata>"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("<getMediaMetadataResult>"));
        assert!(xml.contains("<id>pl-10</id>"));
        assert!(xml.contains("<itemType>playlist</itemType>"));
    }

    #[test]
    fn test_arg_bool() {
        let mut action = SoapAction {
            name: "getMetadata".into(),
            namespace: None,
            args: Default::default(),
            header: None,
        };
        assert!(!arg_bool(&action, "recursive").unwrap());

        action.args.insert("recursive".into(), "1".into());
        assert!(arg_bool(&action, "recursive").unwrap());

        action.args.insert("recursive".into(), "yes".into());
        assert!(arg_bool(&action, "recursive").is_err());
    }
}
