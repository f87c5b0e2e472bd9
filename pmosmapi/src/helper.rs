//! # Traduction du domaine vers les formes SMAPI
//!
//! [`SonosHelper`] interroge les services de la bibliothèque et construit les
//! collections et pistes renvoyées aux enceintes. Il ne garde aucun état
//! modifiable : une instance est partagée par toutes les requêtes.

use crate::config::SmapiConfig;
use crate::error::{Result, SmapiError};
use crate::ids::{ID_LIBRARY, ID_PLAYLISTS, SonosId};
use crate::model::{AbstractMedia, ItemType, MediaCollection, MediaMetadata, TrackMetadata};
use pmolibrary::mime::mime_type;
use pmolibrary::{
    MediaFile, MediaFileService, Player, PlayerService, Playlist, PlaylistService,
    SettingsService, TranscodingService,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Collaborateurs de la façade
#[derive(Clone)]
pub struct LibraryServices {
    pub media_files: Arc<dyn MediaFileService>,
    pub playlists: Arc<dyn PlaylistService>,
    pub players: Arc<dyn PlayerService>,
    pub transcoding: Arc<dyn TranscodingService>,
    pub settings: Arc<dyn SettingsService>,
}

impl LibraryServices {
    /// Tous les services fournis par une même implémentation
    pub fn from_shared<T>(library: Arc<T>) -> Self
    where
        T: MediaFileService
            + PlaylistService
            + PlayerService
            + TranscodingService
            + SettingsService
            + 'static,
    {
        Self {
            media_files: library.clone(),
            playlists: library.clone(),
            players: library.clone(),
            transcoding: library.clone(),
            settings: library,
        }
    }
}

pub struct SonosHelper {
    services: LibraryServices,
    config: SmapiConfig,
}

impl SonosHelper {
    pub fn new(services: LibraryServices, config: SmapiConfig) -> Self {
        Self { services, config }
    }

    pub fn config(&self) -> &SmapiConfig {
        &self.config
    }

    /// Menu principal : bibliothèque et playlists
    pub fn for_root(&self) -> Vec<MediaCollection> {
        vec![
            MediaCollection::new(ID_LIBRARY, ItemType::Collection, "Browse library"),
            MediaCollection::new(ID_PLAYLISTS, ItemType::Collection, "Playlists"),
        ]
    }

    /// Contenu des racines de tous les dossiers musicaux, à plat
    pub async fn for_library(&self) -> Result<Vec<AbstractMedia>> {
        let folders = self.services.settings.get_all_music_folders().await?;
        let player = self.services.players.get_guest_player().await?;

        let mut result = Vec::new();
        for folder in folders {
            debug!(folder = %folder.name, root = folder.root, "Listing music folder");
            let children = self.services.media_files.get_children(folder.root).await?;
            for child in &children {
                if let Some(media) = self.for_media_file(&player, child).await {
                    result.push(media);
                }
            }
        }
        Ok(result)
    }

    pub async fn for_playlists(&self) -> Result<Vec<MediaCollection>> {
        let playlists = self.services.playlists.get_all_playlists().await?;
        Ok(playlists.iter().map(|p| self.for_playlist_collection(p)).collect())
    }

    /// Collection `pl-<n>` d'une playlist, l'artiste est son propriétaire
    pub fn for_playlist_collection(&self, playlist: &Playlist) -> MediaCollection {
        let mut collection = MediaCollection::new(
            SonosId::Playlist(playlist.id).to_string(),
            ItemType::Playlist,
            playlist.name.clone(),
        );
        collection.artist = Some(playlist.username.clone());
        collection.can_play = true;
        collection
    }

    /// Pistes audio d'une playlist
    pub async fn for_playlist(&self, id: u32) -> Result<Vec<MediaMetadata>> {
        let files = self.services.playlists.get_files_in_playlist(id).await?;
        self.for_songs(&files).await
    }

    /// Enfants d'un répertoire : sous-répertoires puis pistes audio
    pub async fn for_directory_content(&self, id: u32) -> Result<Vec<AbstractMedia>> {
        if self.services.media_files.get_media_file(id).await?.is_none() {
            return Err(SmapiError::NotFound {
                kind: "media file",
                id: id.to_string(),
            });
        }

        let player = self.services.players.get_guest_player().await?;
        let children = self.services.media_files.get_children(id).await?;

        let mut result = Vec::with_capacity(children.len());
        for child in &children {
            if let Some(media) = self.for_media_file(&player, child).await {
                result.push(media);
            }
        }
        Ok(result)
    }

    /// Répertoire en collection, piste audio en métadonnées, `None` sinon
    async fn for_media_file(&self, player: &Player, file: &MediaFile) -> Option<AbstractMedia> {
        if file.is_directory() {
            Some(self.for_directory(file).into())
        } else if file.is_audio() {
            Some(self.for_song_with_player(player, file).await.into())
        } else {
            None
        }
    }

    pub fn for_directory(&self, dir: &MediaFile) -> MediaCollection {
        let item_type = if dir.is_album() {
            ItemType::Album
        } else {
            ItemType::Container
        };

        let mut collection =
            MediaCollection::new(SonosId::MediaFile(dir.id).to_string(), item_type, dir.title.clone());
        collection.artist = dir.album_artist.clone().or_else(|| dir.artist.clone());
        collection.can_play = dir.is_album();
        collection.album_art_uri = Some(self.cover_art_uri(dir.id));
        collection
    }

    /// Piste SMAPI pour un fichier audio, vue par le lecteur invité
    pub async fn for_song(&self, song: &MediaFile) -> Result<MediaMetadata> {
        let player = self.services.players.get_guest_player().await?;
        Ok(self.for_song_with_player(&player, song).await)
    }

    async fn for_songs(&self, files: &[MediaFile]) -> Result<Vec<MediaMetadata>> {
        let player = self.services.players.get_guest_player().await?;

        let mut result = Vec::with_capacity(files.len());
        for file in files.iter().filter(|f| f.is_audio()) {
            result.push(self.for_song_with_player(&player, file).await);
        }
        Ok(result)
    }

    async fn for_song_with_player(&self, player: &Player, song: &MediaFile) -> MediaMetadata {
        let suffix = self.services.transcoding.get_suffix(player, song).await;
        let art_id = song.parent_id.unwrap_or(song.id);

        MediaMetadata {
            id: SonosId::MediaFile(song.id).to_string(),
            item_type: ItemType::Track,
            title: song.title.clone(),
            mime_type: mime_type(&suffix),
            genre: song.genre.clone(),
            track_metadata: TrackMetadata {
                artist: song.artist.clone(),
                album: song.album_name.clone(),
                album_artist: song.album_artist.clone(),
                duration: song.duration_seconds,
                album_art_uri: Some(self.cover_art_uri(art_id)),
                track_number: song.track_number,
                can_play: true,
                can_skip: false,
            },
        }
    }

    /// Toutes les pistes audio sous un répertoire (parcours en profondeur) ou
    /// d'une playlist
    pub async fn recursive_songs(&self, id: SonosId) -> Result<Vec<MediaMetadata>> {
        match id {
            SonosId::Playlist(n) => self.for_playlist(n).await,
            SonosId::MediaFile(n) => {
                let files = self.collect_songs(n).await?;
                self.for_songs(&files).await
            }
            other => Err(SmapiError::InvalidId(other.to_string())),
        }
    }

    async fn collect_songs(&self, root: u32) -> Result<Vec<MediaFile>> {
        if self.services.media_files.get_media_file(root).await?.is_none() {
            return Err(SmapiError::NotFound {
                kind: "media file",
                id: root.to_string(),
            });
        }

        let mut songs = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(dir) = stack.pop() {
            if !visited.insert(dir) {
                continue;
            }
            let children = self.services.media_files.get_children(dir).await?;

            // Les sous-répertoires sont empilés à l'envers pour être visités dans l'ordre
            for child in children.iter().rev().filter(|c| c.is_directory()) {
                stack.push(child.id);
            }
            songs.extend(children.into_iter().filter(|c| c.is_audio()));
        }
        Ok(songs)
    }

    pub async fn media_file(&self, id: u32) -> Result<MediaFile> {
        self.services
            .media_files
            .get_media_file(id)
            .await?
            .ok_or_else(|| SmapiError::NotFound {
                kind: "media file",
                id: id.to_string(),
            })
    }

    pub async fn playlist(&self, id: u32) -> Result<Playlist> {
        self.services
            .playlists
            .get_playlist(id)
            .await?
            .ok_or_else(|| SmapiError::NotFound {
                kind: "playlist",
                id: SonosId::Playlist(id).to_string(),
            })
    }

    /// URL de lecture : `<base>stream?id=<id>`
    pub fn media_uri(&self, id: u32) -> String {
        format!("{}stream?id={}", self.config.base_url(), id)
    }

    /// URL de pochette : `<base>coverArt.view?id=<id>&size=<taille>`
    pub fn cover_art_uri(&self, id: u32) -> String {
        format!(
            "{}coverArt.view?id={}&size={}",
            self.config.base_url(),
            id,
            self.config.artwork_size
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pmolibrary::MemoryLibrary;

    pub(crate) const CATALOG: &str = r#"
music_folders:
  - { id: 1, name: Music, root: 1 }
media_files:
  - { id: 1, path: /music, kind: directory, title: Music }
  - { id: 2, parent_id: 1, path: /music/Air, kind: album, title: Moon Safari, album_artist: Air }
  - { id: 3, parent_id: 2, path: /music/Air/01.flac, kind: music, title: La femme d'argent, artist: Air, album_name: Moon Safari, genre: Electronic, track_number: 1, duration_seconds: 430, suffix: flac }
  - { id: 4, parent_id: 2, path: /music/Air/02.mp3, kind: music, title: Sexy Boy, artist: Air, album_name: Moon Safari, track_number: 2, duration_seconds: 298, suffix: mp3 }
  - { id: 5, parent_id: 1, path: /music/Live, kind: directory, title: Live }
  - { id: 6, parent_id: 5, path: /music/Live/Paris, kind: directory, title: Paris }
  - { id: 7, parent_id: 6, path: /music/Live/Paris/01.ogg, kind: music, title: Encore, suffix: ogg }
  - { id: 8, parent_id: 5, path: /music/Live/intro.mp3, kind: music, title: Intro, suffix: mp3 }
  - { id: 9, parent_id: 1, path: /music/clip.avi, kind: video, title: Clip, suffix: avi }
playlists:
  - { id: 10, name: Road trip, username: admin, files: [4, 9, 3] }
  - { id: 11, name: Empty, username: guest, files: [] }
players:
  - { id: 1, name: guest, transcodings: { flac: mp3 } }
"#;

    pub(crate) fn helper() -> SonosHelper {
        let library = Arc::new(MemoryLibrary::from_yaml_str(CATALOG).unwrap());
        let config = SmapiConfig {
            host: "10.0.0.5".into(),
            http_port: 4040,
            ..Default::default()
        };
        SonosHelper::new(LibraryServices::from_shared(library), config)
    }

    fn ids(items: &[AbstractMedia]) -> Vec<&str> {
        items.iter().map(|m| m.id()).collect()
    }

    #[test]
    fn test_for_root() {
        let root = helper().for_root();
        assert_eq!(root.len(), 2);
        assert_eq!(root[0].id, "library");
        assert_eq!(root[0].title, "Browse library");
        assert_eq!(root[1].id, "playlists");
        assert!(root.iter().all(|c| c.can_enumerate && !c.can_play));
        assert!(root.iter().all(|c| c.item_type == ItemType::Collection));
    }

    #[tokio::test]
    async fn test_for_library_lists_folder_roots() {
        let items = helper().for_library().await.unwrap();
        // Répertoires d'abord, le clip vidéo est ignoré
        assert_eq!(ids(&items), vec!["5", "2"]);
    }

    #[tokio::test]
    async fn test_for_playlists() {
        let playlists = helper().for_playlists().await.unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, "pl-10");
        assert_eq!(playlists[0].item_type, ItemType::Playlist);
        assert_eq!(playlists[0].artist.as_deref(), Some("admin"));
        assert!(playlists[0].can_play && playlists[0].can_enumerate);
    }

    #[tokio::test]
    async fn test_for_playlist_skips_non_audio() {
        let songs = helper().for_playlist(10).await.unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3"]);
    }

    #[tokio::test]
    async fn test_for_directory_content() {
        let items = helper().for_directory_content(2).await.unwrap();
        assert_eq!(ids(&items), vec!["3", "4"]);

        let items = helper().for_directory_content(1).await.unwrap();
        match &items[1] {
            AbstractMedia::Collection(album) => {
                assert_eq!(album.item_type, ItemType::Album);
                assert!(album.can_play);
                assert_eq!(album.artist.as_deref(), Some("Air"));
            }
            other => panic!("expected album collection, got {other:?}"),
        }
        match &items[0] {
            AbstractMedia::Collection(dir) => {
                assert_eq!(dir.item_type, ItemType::Container);
                assert!(!dir.can_play);
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_for_directory_content_unknown() {
        let err = helper().for_directory_content(404).await.unwrap_err();
        assert!(matches!(err, SmapiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_for_song_uses_transcoded_mime_type() {
        let helper = helper();
        let song = helper.media_file(3).await.unwrap();
        let metadata = helper.for_song(&song).await.unwrap();

        assert_eq!(metadata.id, "3");
        assert_eq!(metadata.item_type, ItemType::Track);
        assert_eq!(metadata.mime_type, "audio/mpeg");
        assert_eq!(metadata.genre.as_deref(), Some("Electronic"));

        let track = &metadata.track_metadata;
        assert_eq!(track.artist.as_deref(), Some("Air"));
        assert_eq!(track.album.as_deref(), Some("Moon Safari"));
        assert_eq!(track.duration, Some(430));
        assert_eq!(track.track_number, Some(1));
        assert!(track.can_play);
        assert!(!track.can_skip);
        assert_eq!(
            track.album_art_uri.as_deref(),
            Some("http://10.0.0.5:4040/coverArt.view?id=2&size=300")
        );
    }

    #[tokio::test]
    async fn test_recursive_songs() {
        let helper = helper();
        let songs = helper.recursive_songs(SonosId::MediaFile(5)).await.unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["8", "7"]);

        let all = helper.recursive_songs(SonosId::MediaFile(1)).await.unwrap();
        assert_eq!(all.len(), 4);

        assert!(matches!(
            helper.recursive_songs(SonosId::Root).await,
            Err(SmapiError::InvalidId(_))
        ));
    }

    #[test]
    fn test_uris() {
        let helper = helper();
        assert_eq!(helper.media_uri(42), "http://10.0.0.5:4040/stream?id=42");
        assert_eq!(
            helper.cover_art_uri(7),
            "http://10.0.0.5:4040/coverArt.view?id=7&size=300"
        );
    }

    #[test]
    fn test_uris_use_media_server() {
        let library = Arc::new(MemoryLibrary::from_yaml_str(CATALOG).unwrap());
        let config = SmapiConfig {
            host: "10.0.0.5".into(),
            media_base_url: Some("http://nas.local:4533".into()),
            context_path: "rest".into(),
            ..Default::default()
        };
        let helper = SonosHelper::new(LibraryServices::from_shared(library), config);

        assert_eq!(helper.media_uri(3), "http://nas.local:4533/rest/stream?id=3");
        assert_eq!(
            helper.cover_art_uri(2),
            "http://nas.local:4533/rest/coverArt.view?id=2&size=300"
        );
        assert_eq!(
            helper.config().endpoint_url(),
            "http://10.0.0.5:4040/ws/Sonos"
        );
    }
}
