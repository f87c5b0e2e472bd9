//! Types de domaine de la bibliothèque

use serde::Deserialize;
use std::collections::HashMap;

/// Nature d'un fichier média
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFileKind {
    Directory,
    Album,
    Music,
    Podcast,
    AudioBook,
    Video,
}

impl MediaFileKind {
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Music | Self::Podcast | Self::AudioBook)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory | Self::Album)
    }
}

/// Fichier ou répertoire indexé
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaFile {
    pub id: u32,
    #[serde(default)]
    pub parent_id: Option<u32>,
    pub path: String,
    pub kind: MediaFileKind,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album_artist: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    /// Extension du fichier sans le point (ex: "flac")
    #[serde(default)]
    pub suffix: Option<String>,
}

impl MediaFile {
    pub fn is_audio(&self) -> bool {
        self.kind.is_audio()
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    pub fn is_album(&self) -> bool {
        self.kind == MediaFileKind::Album
    }
}

/// Playlist utilisateur
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playlist {
    pub id: u32,
    pub name: String,
    /// Propriétaire de la playlist
    pub username: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// Identifiants des fichiers, dans l'ordre de lecture
    #[serde(default)]
    pub files: Vec<u32>,
}

/// Lecteur et ses règles de transcodage
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    /// Suffixe source -> suffixe produit (ex: "flac" -> "mp3")
    #[serde(default)]
    pub transcodings: HashMap<String, String>,
}

impl Player {
    /// Lecteur invité sans transcodage
    pub fn guest() -> Self {
        Self {
            id: 0,
            name: "guest".to_string(),
            transcodings: HashMap::new(),
        }
    }
}

/// Dossier racine de la bibliothèque
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MusicFolder {
    pub id: u32,
    pub name: String,
    /// Identifiant du répertoire racine du dossier
    pub root: u32,
}
