//! # Enregistrement auprès d'un contrôleur Sonos
//!
//! Une enceinte accepte l'ajout d'un service de musique personnalisé via un
//! formulaire HTTP sur `http://<ip>:1400/customsd`. Le formulaire annonce l'URL
//! du point SOAP, l'intervalle de sondage et les capacités du service.

use crate::config::SmapiConfig;
use crate::presentation::PRESENTATION_MAP_VERSION;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const CONTROLLER_PORT: u16 = 1400;
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(15);
const CONTAINER_TYPE: &str = "MService";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("No Sonos controller configured (sonos.controller_ip)")]
    MissingController,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// URL du formulaire d'ajout de service d'un contrôleur
pub fn customsd_url(controller_ip: &str) -> String {
    format!("http://{}:{}/customsd", controller_ip, CONTROLLER_PORT)
}

/// Champs du formulaire, dans l'ordre attendu ; `caps` est répété
pub fn registration_form(config: &SmapiConfig) -> Vec<(&'static str, String)> {
    let endpoint_url = config.endpoint_url();

    let mut form = vec![
        ("sid", config.service_id.to_string()),
        ("name", config.service_name.clone()),
        ("uri", endpoint_url.clone()),
        ("secureUri", endpoint_url),
        ("pollInterval", config.poll_interval.to_string()),
        ("authType", config.auth_type.clone()),
        ("containerType", CONTAINER_TYPE.to_string()),
    ];
    form.extend(config.caps.iter().map(|cap| ("caps", cap.clone())));
    form.push(("presentationMapVersion", PRESENTATION_MAP_VERSION.to_string()));
    form.push(("presentationMapUri", config.presentation_map_url()));
    form
}

/// Poste le formulaire au contrôleur configuré et renvoie sa réponse brute
pub async fn register_with_controller(config: &SmapiConfig) -> Result<String, RegistrationError> {
    let controller_ip = config
        .controller_ip
        .as_deref()
        .ok_or(RegistrationError::MissingController)?;
    let url = customsd_url(controller_ip);
    let form = registration_form(config);

    info!("📡 Registering Sonos service '{}' at {}", config.service_name, url);
    debug!("Registration form: {:?}", form);

    let client = Client::builder().timeout(REGISTRATION_TIMEOUT).build()?;
    let response = client
        .post(&url)
        .form(&form)
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;

    info!("✅ Sonos service registered with controller {}", controller_ip);
    debug!("Controller response: {}", body);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customsd_url() {
        assert_eq!(customsd_url("192.168.1.30"), "http://192.168.1.30:1400/customsd");
    }

    #[test]
    fn test_registration_form() {
        let config = SmapiConfig {
            host: "192.168.1.20".into(),
            ..Default::default()
        };
        let form = registration_form(&config);

        let value = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(value("sid"), Some("255"));
        assert_eq!(value("name"), Some("PMOMusic"));
        assert_eq!(value("uri"), Some("http://192.168.1.20:4040/ws/Sonos"));
        assert_eq!(value("secureUri"), value("uri"));
        assert_eq!(value("pollInterval"), Some("1200"));
        assert_eq!(value("authType"), Some("UserId"));
        assert_eq!(value("containerType"), Some("MService"));
        assert_eq!(value("presentationMapVersion"), Some("0"));
        assert_eq!(
            value("presentationMapUri"),
            Some("http://192.168.1.20:4040/sonos/presentationMap.xml")
        );

        let caps: Vec<&str> = form
            .iter()
            .filter(|(k, _)| *k == "caps")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(caps, vec!["search", "trFavorites", "alFavorites"]);
    }

    #[tokio::test]
    async fn test_register_without_controller() {
        let err = register_with_controller(&SmapiConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingController));
    }
}
