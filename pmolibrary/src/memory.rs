//! # Bibliothèque en mémoire
//!
//! [`MemoryLibrary`] implémente tous les services de [`crate::services`] à partir
//! d'un [`Catalog`] décrit en YAML. Le catalogue est validé au chargement puis
//! reste immuable : les accès concurrents ne prennent aucun verrou.
//!
//! ## Format du catalogue
//!
//! ```yaml
//! music_folders:
//!   - { id: 1, name: Music, root: 1 }
//! media_files:
//!   - { id: 1, path: /music, kind: directory, title: Music }
//!   - { id: 2, parent_id: 1, path: /music/Album, kind: album, title: Album }
//!   - { id: 3, parent_id: 2, path: /music/Album/01.flac, kind: music,
//!       title: Intro, suffix: flac, track_number: 1, duration_seconds: 215 }
//! playlists:
//!   - { id: 7, name: Road trip, username: admin, files: [3] }
//! players:
//!   - { id: 1, name: guest, transcodings: { flac: mp3 } }
//! ```

use crate::model::{MediaFile, MusicFolder, Player, Playlist};
use crate::services::{
    MediaFileService, PlayerService, PlaylistService, SettingsService, TranscodingService,
};
use crate::{LibraryError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

const GUEST_PLAYER_NAME: &str = "guest";
const DEFAULT_SUFFIX: &str = "mp3";

/// Contenu brut d'un catalogue YAML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub music_folders: Vec<MusicFolder>,
    #[serde(default)]
    pub media_files: Vec<MediaFile>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub players: Vec<Player>,
}

/// Bibliothèque indexée en mémoire
#[derive(Debug, Clone)]
pub struct MemoryLibrary {
    files: HashMap<u32, MediaFile>,
    children: HashMap<u32, Vec<u32>>,
    music_folders: Vec<MusicFolder>,
    playlists: Vec<Playlist>,
    players: Vec<Player>,
}

impl MemoryLibrary {
    /// Construit la bibliothèque après validation des références du catalogue
    pub fn new(catalog: Catalog) -> Result<Self> {
        let mut files = HashMap::with_capacity(catalog.media_files.len());
        for file in catalog.media_files {
            let id = file.id;
            if files.insert(id, file).is_some() {
                return Err(LibraryError::Invalid(format!("duplicate media file id {}", id)));
            }
        }

        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for file in files.values() {
            if let Some(parent) = file.parent_id {
                match files.get(&parent) {
                    Some(p) if p.is_directory() => children.entry(parent).or_default().push(file.id),
                    Some(_) => {
                        return Err(LibraryError::Invalid(format!(
                            "media file {} has non-directory parent {}",
                            file.id, parent
                        )));
                    }
                    None => {
                        return Err(LibraryError::Invalid(format!(
                            "media file {} references unknown parent {}",
                            file.id, parent
                        )));
                    }
                }
            }
        }

        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| compare_siblings(&files[a], &files[b]));
        }

        for folder in &catalog.music_folders {
            if !files.get(&folder.root).is_some_and(|f| f.is_directory()) {
                return Err(LibraryError::Invalid(format!(
                    "music folder '{}' root {} is not a known directory",
                    folder.name, folder.root
                )));
            }
        }

        for playlist in &catalog.playlists {
            for file_id in &playlist.files {
                if !files.contains_key(file_id) {
                    warn!(
                        playlist_id = playlist.id,
                        file_id = *file_id,
                        "Playlist references an unknown media file, it will be skipped"
                    );
                }
            }
        }

        info!(
            media_files = files.len(),
            music_folders = catalog.music_folders.len(),
            playlists = catalog.playlists.len(),
            "Library catalog loaded"
        );

        Ok(Self {
            files,
            children,
            music_folders: catalog.music_folders,
            playlists: catalog.playlists,
            players: catalog.players,
        })
    }

    /// Bibliothèque vide (aucun dossier, aucune playlist)
    pub fn empty() -> Self {
        Self {
            files: HashMap::new(),
            children: HashMap::new(),
            music_folders: Vec::new(),
            playlists: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        Self::new(catalog)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading library catalog");
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Répertoires d'abord par titre, puis fichiers par numéro de piste et titre
fn compare_siblings(a: &MediaFile, b: &MediaFile) -> std::cmp::Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| {
            if a.is_directory() {
                std::cmp::Ordering::Equal
            } else {
                a.track_number
                    .unwrap_or(u32::MAX)
                    .cmp(&b.track_number.unwrap_or(u32::MAX))
            }
        })
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl MediaFileService for MemoryLibrary {
    async fn get_media_file(&self, id: u32) -> Result<Option<MediaFile>> {
        Ok(self.files.get(&id).cloned())
    }

    async fn get_children(&self, id: u32) -> Result<Vec<MediaFile>> {
        if !self.files.contains_key(&id) {
            return Err(LibraryError::NotFound {
                kind: "media file",
                id,
            });
        }

        Ok(self
            .children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.files.get(c).cloned()).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PlaylistService for MemoryLibrary {
    async fn get_all_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.playlists.clone())
    }

    async fn get_playlist(&self, id: u32) -> Result<Option<Playlist>> {
        Ok(self.playlists.iter().find(|p| p.id == id).cloned())
    }

    async fn get_files_in_playlist(&self, id: u32) -> Result<Vec<MediaFile>> {
        let playlist = self
            .playlists
            .iter()
            .find(|p| p.id == id)
            .ok_or(LibraryError::NotFound { kind: "playlist", id })?;

        Ok(playlist
            .files
            .iter()
            .filter_map(|file_id| self.files.get(file_id).cloned())
            .collect())
    }
}

#[async_trait]
impl PlayerService for MemoryLibrary {
    async fn get_guest_player(&self) -> Result<Player> {
        Ok(self
            .players
            .iter()
            .find(|p| p.name == GUEST_PLAYER_NAME)
            .cloned()
            .unwrap_or_else(Player::guest))
    }
}

#[async_trait]
impl TranscodingService for MemoryLibrary {
    async fn get_suffix(&self, player: &Player, file: &MediaFile) -> String {
        let Some(suffix) = file.suffix.as_deref().map(str::to_lowercase) else {
            return DEFAULT_SUFFIX.to_string();
        };

        player
            .transcodings
            .get(&suffix)
            .cloned()
            .unwrap_or(suffix)
    }
}

#[async_trait]
impl SettingsService for MemoryLibrary {
    async fn get_all_music_folders(&self) -> Result<Vec<MusicFolder>> {
        Ok(self.music_folders.clone())
    }
}
