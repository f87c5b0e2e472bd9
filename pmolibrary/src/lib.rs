//! # pmolibrary - Bibliothèque musicale vue par le pont Sonos
//!
//! Cette crate décrit le modèle de domaine (fichiers média, playlists, lecteurs,
//! dossiers musicaux) et les contrats des services dont dépend la façade SMAPI.
//!
//! ## Architecture
//!
//! - [`model`] : types de domaine (`MediaFile`, `Playlist`, `Player`, `MusicFolder`)
//! - [`services`] : traits asynchrones des collaborateurs (recherche de fichiers,
//!   playlists, lecteurs, transcodage, paramètres)
//! - [`mime`] : type MIME à partir d'un suffixe de fichier
//! - [`memory`] : implémentation en mémoire de tous les services, chargée depuis un
//!   catalogue YAML
//!
//! ## Exemple
//!
//! ```no_run
//! use pmolibrary::{MemoryLibrary, MediaFileService};
//!
//! # async fn example() -> pmolibrary::Result<()> {
//! let library = MemoryLibrary::from_yaml_file("library.yaml")?;
//! if let Some(file) = library.get_media_file(42).await? {
//!     println!("{}", file.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod mime;
pub mod model;
pub mod services;

pub use memory::{Catalog, MemoryLibrary};
pub use model::{MediaFile, MediaFileKind, MusicFolder, Player, Playlist};
pub use services::{
    MediaFileService, PlayerService, PlaylistService, SettingsService, TranscodingService,
};

/// Erreurs des services de bibliothèque
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;
