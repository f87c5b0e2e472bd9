//! # pmosmapi - Façade SMAPI pour enceintes Sonos
//!
//! Cette crate expose une bibliothèque musicale ([`pmolibrary`]) aux enceintes
//! Sonos via SMAPI, l'interface SOAP des services de musique. Elle ne fait que
//! traduire : les identifiants opaques des enceintes deviennent des recherches
//! dans la bibliothèque, et les objets du domaine deviennent des réponses SMAPI.
//!
//! ## Architecture
//!
//! - [`ids`] : identifiants `root`, `library`, `playlists`, `pl-<n>`, `<n>`
//! - [`model`] : collections, pistes et listes paginées SMAPI
//! - [`paging`] : découpage `index` / `count` / `total`
//! - [`helper`] : conversion du domaine vers les formes SMAPI
//! - [`service`] : une méthode par opération SMAPI
//! - [`soap`] : parsing et construction des enveloppes SOAP
//! - [`endpoint`] : router axum (`POST /ws/Sonos`, presentation map)
//! - [`registration`] : ajout du service sur un contrôleur (`customsd`)
//!
//! ## Exemple
//!
//! ```no_run
//! use pmolibrary::MemoryLibrary;
//! use pmosmapi::{LibraryServices, SmapiConfig, SonosHelper, SonosService, smapi_router};
//! use std::sync::Arc;
//!
//! let library = Arc::new(MemoryLibrary::empty());
//! let helper = SonosHelper::new(LibraryServices::from_shared(library), SmapiConfig::default());
//! let router = smapi_router(Arc::new(SonosService::new(helper)));
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod helper;
pub mod ids;
pub mod model;
pub mod paging;
pub mod presentation;
pub mod registration;
pub mod server_ext;
pub mod service;
pub mod soap;

pub use config::SmapiConfig;
pub use endpoint::{handle_soap_request, smapi_router};
pub use error::{Result, SmapiError};
pub use helper::{LibraryServices, SonosHelper};
pub use ids::SonosId;
pub use model::{AbstractMedia, ItemType, LastUpdate, MediaCollection, MediaList, MediaMetadata, TrackMetadata};
pub use registration::{RegistrationError, register_with_controller};
pub use server_ext::SonosServerExt;
pub use service::SonosService;
