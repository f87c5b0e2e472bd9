//! Construction de réponses SOAP

use super::SOAP_ENVELOPE_NAMESPACE;
use xmltree::{Element, XMLNode};

pub(super) fn build_soap_envelope_with_body(body_child: Element) -> Result<String, xmltree::Error> {
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        SOAP_ENVELOPE_NAMESPACE.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Construit une réponse SOAP SMAPI
///
/// # Arguments
///
/// * `namespace` - Namespace par défaut posé sur `<action>Response`
/// * `action` - Nom de l'opération (ex: "getMetadata")
/// * `result` - Élément résultat (ex: `<getMetadataResult>`), `None` pour une
///   réponse vide
pub fn build_soap_response(
    namespace: &str,
    action: &str,
    result: Option<Element>,
) -> Result<String, xmltree::Error> {
    let mut response_elem = Element::new(&format!("{}Response", action));
    response_elem
        .attributes
        .insert("xmlns".to_string(), namespace.to_string());

    if let Some(result) = result {
        response_elem.children.push(XMLNode::Element(result));
    }

    build_soap_envelope_with_body(response_elem)
}
