//! Parser SOAP pour les opérations SMAPI

use super::{SoapBody, SoapEnvelope, SoapHeader};
use std::collections::HashMap;
use std::io::BufReader;
use xmltree::Element;

/// Opération SMAPI extraite d'une enveloppe SOAP
#[derive(Debug, Clone)]
pub struct SoapAction {
    /// Nom de l'opération (ex: "getMetadata")
    pub name: String,

    /// Namespace de l'opération
    pub namespace: Option<String>,

    /// Arguments de l'opération (texte des enfants directs)
    pub args: HashMap<String, String>,

    pub header: Option<SoapHeader>,
}

/// Identité de l'enceinte transmise dans l'en-tête `credentials`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub device_id: Option<String>,
    pub device_provider: Option<String>,
    pub session_id: Option<String>,
}

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("No action found in SOAP Body")]
    NoAction,
}

impl SoapAction {
    /// Valeur textuelle d'un argument
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Contenu de l'en-tête `credentials`, `None` si absent
    pub fn credentials(&self) -> Option<Credentials> {
        let credentials = self.header.as_ref()?.content.get_child("credentials")?;
        let text = |name: &str| {
            credentials
                .get_child(name)
                .and_then(|e| e.get_text())
                .map(|t| t.trim().to_string())
        };

        Some(Credentials {
            device_id: text("deviceId"),
            device_provider: text("deviceProvider"),
            session_id: text("sessionId"),
        })
    }
}

/// Parse une opération SOAP à partir de bytes XML
pub fn parse_soap_action(xml: &[u8]) -> Result<SoapAction, SoapParseError> {
    let envelope = parse_soap_envelope(xml)?;
    extract_action(envelope)
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    let header = find_child(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    let body = find_child(&root, "Body")
        .map(|e| SoapBody { content: e.clone() })
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope { header, body })
}

fn find_child<'a>(root: &'a Element, suffix: &str) -> Option<&'a Element> {
    root.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|e| e.name.ends_with(suffix))
}

fn extract_action(envelope: SoapEnvelope) -> Result<SoapAction, SoapParseError> {
    // Format: <getMetadata xmlns="http://www.sonos.com/Services/1.1">...</getMetadata>
    let action_elem = envelope
        .body
        .content
        .children
        .iter()
        .find_map(|n| n.as_element())
        .ok_or(SoapParseError::NoAction)?;

    let mut args = HashMap::new();
    for child in &action_elem.children {
        if let Some(elem) = child.as_element() {
            let value = elem.get_text().unwrap_or_default().trim().to_string();
            args.insert(elem.name.clone(), value);
        }
    }

    Ok(SoapAction {
        name: action_elem.name.clone(),
        namespace: action_elem.namespace.clone(),
        args,
        header: envelope.header,
    })
}
