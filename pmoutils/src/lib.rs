//! # pmoutils - Utilitaires réseau partagés
//!
//! - [`guess_local_ip`] : devine l'adresse IP locale utilisée pour les connexions sortantes
//! - [`normalize_context_path`] / [`build_base_url`] : construction des URLs publiées
//!   vers les contrôleurs (streams, pochettes)
//!
//! # Examples
//!
//! ```
//! use pmoutils::build_base_url;
//!
//! let base = build_base_url("192.168.1.42", 4040, "music");
//! assert_eq!(base, "http://192.168.1.42:4040/music/");
//! ```
mod ip_utils;
mod url_utils;

pub use ip_utils::guess_local_ip;
pub use url_utils::{build_base_url, normalize_context_path};
