//! Presentation map annoncée lors de l'enregistrement
//!
//! Les enceintes y lisent les substitutions de taille à appliquer aux URLs de
//! pochettes (`size=<n>` dans [`crate::helper::SonosHelper::cover_art_uri`]).

/// Version publiée dans le formulaire `customsd`
pub const PRESENTATION_MAP_VERSION: u32 = 0;

pub const PRESENTATION_MAP: &str = include_str!("presentationMap.xml");
