//! Paramètres de la façade SMAPI
//!
//! [`SmapiConfig`] est une copie figée des clés `host.*` et `sonos.*` : le
//! service et l'enregistrement ne relisent jamais le singleton de configuration.

use pmoconfig::Config;
use pmoutils::{build_base_url, normalize_context_path};

/// Chemin de la presentation map servie aux contrôleurs
pub const PRESENTATION_MAP_PATH: &str = "/sonos/presentationMap.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmapiConfig {
    /// Hôte annoncé (IP ou URL complète)
    pub host: String,
    pub http_port: u16,
    /// Serveur de médias des URLs de flux et de pochettes, `None` pour ce serveur
    pub media_base_url: Option<String>,
    /// Préfixe des URLs de flux et de pochettes
    pub context_path: String,
    /// Route HTTP du point SOAP
    pub endpoint_path: String,
    pub service_id: u32,
    pub service_name: String,
    pub poll_interval: u32,
    pub auth_type: String,
    pub caps: Vec<String>,
    pub artwork_size: u32,
    pub controller_ip: Option<String>,
}

impl Default for SmapiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            http_port: 4040,
            media_base_url: None,
            context_path: "/".to_string(),
            endpoint_path: "/ws/Sonos".to_string(),
            service_id: 255,
            service_name: "PMOMusic".to_string(),
            poll_interval: 1200,
            auth_type: "UserId".to_string(),
            caps: vec![
                "search".to_string(),
                "trFavorites".to_string(),
                "alFavorites".to_string(),
            ],
            artwork_size: 300,
            controller_ip: None,
        }
    }
}

impl SmapiConfig {
    /// Construit la configuration à partir du singleton `pmoconfig`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            host: config.get_base_url(),
            http_port: config.get_http_port(),
            media_base_url: config.get_sonos_media_base_url(),
            context_path: config.get_sonos_context_path()?,
            endpoint_path: config.get_sonos_endpoint_path()?,
            service_id: config.get_sonos_service_id()?,
            service_name: config.get_sonos_service_name()?,
            poll_interval: config.get_sonos_poll_interval()?,
            auth_type: config.get_sonos_auth_type()?,
            caps: config.get_sonos_caps()?,
            artwork_size: config.get_sonos_artwork_size()?,
            controller_ip: config.get_sonos_controller_ip(),
        })
    }

    /// Base des URLs de flux et de pochettes : `<media_base_url><context>`
    ///
    /// Sans `media_base_url`, `http://<host>:<port><context>`. Un
    /// `media_base_url` sans schéma reprend le port de ce serveur.
    pub fn base_url(&self) -> String {
        let host = self.media_base_url.as_deref().unwrap_or(&self.host);
        build_base_url(host, self.http_port, &self.context_path)
    }

    /// Les URLs de flux sont-elles servies par un serveur de médias externe ?
    pub fn has_media_server(&self) -> bool {
        self.media_base_url.is_some()
    }

    /// URL publique de ce serveur, sans préfixe de contexte
    fn server_url(&self) -> String {
        build_base_url(&self.host, self.http_port, "/")
    }

    /// URL du point SOAP enregistrée auprès du contrôleur
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.server_url().trim_end_matches('/'),
            self.normalized_endpoint_path()
        )
    }

    pub fn presentation_map_url(&self) -> String {
        format!(
            "{}{}",
            self.server_url().trim_end_matches('/'),
            PRESENTATION_MAP_PATH
        )
    }

    /// Route du point SOAP, toujours absolue et sans `/` final
    pub fn normalized_endpoint_path(&self) -> String {
        let path = normalize_context_path(&self.endpoint_path);
        if path == "/" {
            path
        } else {
            path.trim_end_matches('/').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = SmapiConfig {
            host: "192.168.1.20".into(),
            context_path: "music".into(),
            ..Default::default()
        };

        assert_eq!(config.base_url(), "http://192.168.1.20:4040/music/");
        assert_eq!(config.endpoint_url(), "http://192.168.1.20:4040/ws/Sonos");
        assert_eq!(
            config.presentation_map_url(),
            "http://192.168.1.20:4040/sonos/presentationMap.xml"
        );
    }

    #[test]
    fn test_media_base_url_is_independent_of_endpoint() {
        let config = SmapiConfig {
            host: "192.168.1.20".into(),
            media_base_url: Some("http://nas.local:4533".into()),
            context_path: "rest".into(),
            ..Default::default()
        };

        assert!(config.has_media_server());
        assert_eq!(config.base_url(), "http://nas.local:4533/rest/");
        assert_eq!(config.endpoint_url(), "http://192.168.1.20:4040/ws/Sonos");
        assert_eq!(
            config.presentation_map_url(),
            "http://192.168.1.20:4040/sonos/presentationMap.xml"
        );
    }

    #[test]
    fn test_media_base_url_without_scheme_keeps_port() {
        let config = SmapiConfig {
            host: "192.168.1.20".into(),
            media_base_url: Some("10.0.0.9".into()),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://10.0.0.9:4040/");
        assert!(!SmapiConfig::default().has_media_server());
    }

    #[test]
    fn test_endpoint_path_normalization() {
        let config = SmapiConfig {
            endpoint_path: "ws/Sonos/".into(),
            ..Default::default()
        };
        assert_eq!(config.normalized_endpoint_path(), "/ws/Sonos");
    }
}
