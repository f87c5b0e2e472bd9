//! SOAP Faults SMAPI

use super::builder::build_soap_envelope_with_body;
use crate::error::{SmapiError, fault_codes};
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Client.ItemNotFound")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    pub detail: Option<SonosFaultDetail>,
}

/// Contenu de l'élément `<detail>` lu par les enceintes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonosFaultDetail {
    pub exception_info: String,
    /// Code numérique spécifique au service, affiché par le contrôleur
    pub sonos_error: Option<u32>,
}

impl SoapFault {
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: SonosFaultDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Fault générique pour une requête illisible
    pub fn client(fault_string: impl Into<String>) -> Self {
        Self::new(fault_codes::CLIENT, fault_string)
    }

    pub fn to_xml(&self) -> Result<String, xmltree::Error> {
        build_soap_fault(&self.fault_code, &self.fault_string, self.detail.as_ref())
    }
}

impl From<&SmapiError> for SoapFault {
    fn from(err: &SmapiError) -> Self {
        let code = err.fault_code();
        let fault = SoapFault::new(code, err.to_string());
        let exception_info = code.trim_start_matches("s:").to_string();

        fault.with_detail(SonosFaultDetail {
            exception_info,
            sonos_error: None,
        })
    }
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "s:Client")
/// * `fault_string` - Message d'erreur
/// * `detail` - Détail `ExceptionInfo` / `SonosError` optionnel
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    detail: Option<&SonosFaultDetail>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new("s:Fault");

    let mut faultcode_elem = Element::new("faultcode");
    faultcode_elem
        .children
        .push(XMLNode::Text(fault_code.to_string()));
    fault.children.push(XMLNode::Element(faultcode_elem));

    let mut faultstring_elem = Element::new("faultstring");
    faultstring_elem
        .children
        .push(XMLNode::Text(fault_string.to_string()));
    fault.children.push(XMLNode::Element(faultstring_elem));

    if let Some(detail) = detail {
        let mut detail_elem = Element::new("detail");

        let mut info = Element::new("ExceptionInfo");
        info.children
            .push(XMLNode::Text(detail.exception_info.clone()));
        detail_elem.children.push(XMLNode::Element(info));

        if let Some(code) = detail.sonos_error {
            let mut sonos_error = Element::new("SonosError");
            sonos_error.children.push(XMLNode::Text(code.to_string()));
            detail_elem.children.push(XMLNode::Element(sonos_error));
        }

        fault.children.push(XMLNode::Element(detail_elem));
    }

    build_soap_envelope_with_body(fault)
}
