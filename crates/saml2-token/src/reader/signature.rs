//! `ds:Signature` reader.
//!
//! Only the structure is read here; algorithms are kept as URIs and judged
//! by the verifier.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roxmltree::Node;

use crate::error::{ReadError, RequiredField};
use crate::signature::{KeyInfo, SignatureReference, Transform, XmlSignature};
use crate::types::XMLDSIG_NS;
use crate::xml::NodeExt;

use super::unexpected;

const EXC_C14N_NS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

pub(super) fn read_signature(element: Node<'_, '_>) -> Result<XmlSignature, ReadError> {
    let mut children = element.child_elements();

    let signed_info = children
        .next()
        .filter(|e| e.is(XMLDSIG_NS, "SignedInfo"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::SignedInfo))?;
    let signature_value = children
        .next()
        .filter(|e| e.is(XMLDSIG_NS, "SignatureValue"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::SignatureValue))?;
    let signature_value = decode(signature_value, "SignatureValue", RequiredField::SignatureValue)?;

    let mut key_info = KeyInfo::default();
    for child in children {
        if child.is(XMLDSIG_NS, "KeyInfo") {
            read_key_info(child, &mut key_info)?;
        } else if !child.is(XMLDSIG_NS, "Object") {
            return Err(unexpected(child, element));
        }
    }

    let mut parts = signed_info.child_elements();
    let c14n = parts
        .next()
        .filter(|e| e.is(XMLDSIG_NS, "CanonicalizationMethod"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::CanonicalizationMethod))?;
    let method = parts
        .next()
        .filter(|e| e.is(XMLDSIG_NS, "SignatureMethod"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::SignatureMethod))?;
    let reference = parts
        .next()
        .filter(|e| e.is(XMLDSIG_NS, "Reference"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::Reference))?;
    if let Some(extra) = parts.next() {
        return Err(unexpected(extra, signed_info));
    }

    Ok(XmlSignature {
        canonicalization_method: algorithm(c14n)?,
        inclusive_prefixes: inclusive_prefixes(c14n),
        signature_method: algorithm(method)?,
        reference: read_reference(reference)?,
        signature_value,
        key_info,
    })
}

fn read_reference(element: Node<'_, '_>) -> Result<SignatureReference, ReadError> {
    let mut transforms = Vec::new();
    let mut digest_method = None;
    let mut digest_value = None;

    for child in element.child_elements() {
        if child.tag_name().namespace() != Some(XMLDSIG_NS) {
            return Err(unexpected(child, element));
        }
        match child.tag_name().name() {
            "Transforms" if transforms.is_empty() && digest_method.is_none() => {
                for transform in child.child_elements() {
                    if !transform.is(XMLDSIG_NS, "Transform") {
                        return Err(unexpected(transform, child));
                    }
                    transforms.push(Transform::from_uri(
                        &algorithm(transform)?,
                        inclusive_prefixes(transform),
                    ));
                }
            }
            "DigestMethod" if digest_method.is_none() => digest_method = Some(algorithm(child)?),
            "DigestValue" if digest_method.is_some() && digest_value.is_none() => {
                digest_value = Some(decode(child, "DigestValue", RequiredField::DigestValue)?);
            }
            _ => return Err(unexpected(child, element)),
        }
    }

    Ok(SignatureReference {
        uri: element.attribute("URI").unwrap_or_default().to_string(),
        transforms,
        digest_method: digest_method
            .ok_or(ReadError::MissingRequiredField(RequiredField::DigestMethod))?,
        digest_value: digest_value
            .ok_or(ReadError::MissingRequiredField(RequiredField::DigestValue))?,
    })
}

fn read_key_info(element: Node<'_, '_>, key_info: &mut KeyInfo) -> Result<(), ReadError> {
    for child in element.child_elements() {
        if child.is(XMLDSIG_NS, "KeyName") {
            let name = child.text_content().trim().to_string();
            if !name.is_empty() {
                key_info.key_names.push(name);
            }
        } else if child.is(XMLDSIG_NS, "X509Data") {
            for data in child.child_elements() {
                if data.is(XMLDSIG_NS, "X509Certificate") {
                    key_info.certificates.push(
                        STANDARD
                            .decode(compact(&data.text_content()))
                            .map_err(|e| ReadError::malformed("X509Certificate", e))?,
                    );
                }
            }
        }
    }
    Ok(())
}

fn algorithm(element: Node<'_, '_>) -> Result<String, ReadError> {
    element
        .attribute("Algorithm")
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .ok_or(ReadError::MissingRequiredField(RequiredField::Algorithm))
}

fn inclusive_prefixes(element: Node<'_, '_>) -> Vec<String> {
    element
        .find_child(EXC_C14N_NS, "InclusiveNamespaces")
        .and_then(|e| e.attribute("PrefixList"))
        .map(|list| list.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

fn decode(
    element: Node<'_, '_>,
    field: &'static str,
    required: RequiredField,
) -> Result<Vec<u8>, ReadError> {
    let text = compact(&element.text_content());
    if text.is_empty() {
        return Err(ReadError::MissingRequiredField(required));
    }
    STANDARD
        .decode(text)
        .map_err(|e| ReadError::malformed(field, e))
}
