//! # Module SOAP - enveloppes SMAPI
//!
//! Les enceintes Sonos parlent SOAP 1.1 en style document/literal : le corps
//! contient un seul élément `<operation>` dans le namespace SMAPI, dont les
//! enfants sont les arguments. Les réponses suivent la même forme avec un
//! élément `<operation>Response`.
//!
//! ## Fonctionnalités
//!
//! - ✅ Parsing d'enveloppes SOAP et extraction de l'opération
//! - ✅ Lecture de l'en-tête `credentials` SMAPI
//! - ✅ Construction de réponses à partir d'un [`xmltree::Element`]
//! - ✅ SOAP Faults avec détail `SonosError`
//!
//! ## Exemple
//!
//! ```
//! use pmosmapi::soap::{parse_soap_action, build_soap_response, SMAPI_NAMESPACE};
//!
//! let body = r#"<?xml version="1.0"?>
//! <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
//!   <s:Body>
//!     <getMediaURI xmlns="http://www.sonos.com/Services/1.1">
//!       <id>42</id>
//!     </getMediaURI>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let action = parse_soap_action(body.as_bytes()).unwrap();
//! assert_eq!(action.name, "getMediaURI");
//! assert_eq!(action.arg("id"), Some("42"));
//!
//! let xml = build_soap_response(SMAPI_NAMESPACE, &action.name, None).unwrap();
//! assert!(xml.contains("getMediaURIResponse"));
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::build_soap_response;
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, SonosFaultDetail, build_soap_fault};
pub use parser::{Credentials, SoapAction, SoapParseError, parse_soap_action, parse_soap_envelope};

/// Namespace des enveloppes SOAP 1.1
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace des opérations SMAPI
pub const SMAPI_NAMESPACE: &str = "http://www.sonos.com/Services/1.1";
