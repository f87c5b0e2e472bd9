//! # Identifiants SMAPI
//!
//! Les enceintes ne manipulent que des chaînes opaques. Les formes publiées sont :
//!
//! | chaîne      | objet                          |
//! |-------------|--------------------------------|
//! | `root`      | menu principal                 |
//! | `library`   | navigation par dossier musical |
//! | `playlists` | liste des playlists            |
//! | `pl-<n>`    | playlist `n`                   |
//! | `<n>`       | fichier ou répertoire `n`      |
//!
//! [`SonosId`] en donne une représentation typée ; l'analyse ne panique jamais.

use crate::error::SmapiError;
use std::fmt;
use std::str::FromStr;

pub const ID_ROOT: &str = "root";
pub const ID_LIBRARY: &str = "library";
pub const ID_PLAYLISTS: &str = "playlists";
pub const ID_PLAYLIST_PREFIX: &str = "pl-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SonosId {
    Root,
    Library,
    Playlists,
    Playlist(u32),
    MediaFile(u32),
}

impl SonosId {
    /// Identifiant numérique d'un fichier média, erreur pour toute autre forme
    pub fn media_file_id(&self) -> Result<u32, SmapiError> {
        match self {
            SonosId::MediaFile(id) => Ok(*id),
            other => Err(SmapiError::InvalidId(other.to_string())),
        }
    }
}

impl FromStr for SonosId {
    type Err = SmapiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SmapiError::InvalidId(s.to_string());

        match s {
            ID_ROOT => Ok(SonosId::Root),
            ID_LIBRARY => Ok(SonosId::Library),
            ID_PLAYLISTS => Ok(SonosId::Playlists),
            _ => {
                if let Some(n) = s.strip_prefix(ID_PLAYLIST_PREFIX) {
                    parse_numeric(n).map(SonosId::Playlist).ok_or_else(invalid)
                } else {
                    parse_numeric(s).map(SonosId::MediaFile).ok_or_else(invalid)
                }
            }
        }
    }
}

/// Nombre décimal strict : pas de signe, pas d'espace
fn parse_numeric(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for SonosId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SonosId::Root => f.write_str(ID_ROOT),
            SonosId::Library => f.write_str(ID_LIBRARY),
            SonosId::Playlists => f.write_str(ID_PLAYLISTS),
            SonosId::Playlist(id) => write!(f, "{}{}", ID_PLAYLIST_PREFIX, id),
            SonosId::MediaFile(id) => write!(f, "{}", id),
        }
    }
}
