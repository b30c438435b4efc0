//! Statement readers.

use roxmltree::Node;
use url::Url;

use crate::error::{ReadError, RequiredField, ValueError};
use crate::types::{
    Action, Attribute, AttributeStatement, AuthnContext, AuthnStatement, AuthzDecisionStatement,
    Decision, Statement, SubjectLocality, UnrecognizedStatement, IDENTITY_CLAIMS_NS, SAML_NS,
    XSI_NS,
};
use crate::xml::NodeExt;

use super::{
    expanded_name, optional_attribute, optional_instant, parse_instant, required_attribute,
    unexpected,
};

pub(super) fn read_statement(element: Node<'_, '_>) -> Result<Statement, ReadError> {
    match element.tag_name().name() {
        "AttributeStatement" => read_attribute_statement(element).map(Statement::Attribute),
        "AuthnStatement" => read_authn_statement(element).map(Statement::Authentication),
        "AuthzDecisionStatement" => {
            read_authz_decision_statement(element).map(Statement::AuthorizationDecision)
        }
        _ => {
            let type_name = xsi_type(element)?.unwrap_or_else(|| expanded_name(element));
            Ok(Statement::Unrecognized(UnrecognizedStatement { type_name }))
        }
    }
}

/// Resolves `xsi:type` to `namespace#local`.
fn xsi_type(element: Node<'_, '_>) -> Result<Option<String>, ReadError> {
    let Some(raw) = element.attribute((XSI_NS, "type")) else {
        return Ok(None);
    };
    let (namespace, local) = element.resolve_qname(raw).ok_or_else(|| {
        ReadError::malformed("xsi:type", ValueError::UnboundPrefix(raw.to_string()))
    })?;
    Ok(Some(match namespace {
        Some(ns) => format!("{ns}#{local}"),
        None => local.to_string(),
    }))
}

fn read_attribute_statement(element: Node<'_, '_>) -> Result<AttributeStatement, ReadError> {
    let mut attributes = Vec::new();
    for child in element.child_elements() {
        if child.is(SAML_NS, "Attribute") {
            attributes.push(read_attribute(child)?);
        } else if child.is(SAML_NS, "EncryptedAttribute") {
            return Err(ReadError::EncryptedContent("EncryptedAttribute".to_string()));
        } else {
            return Err(unexpected(child, element));
        }
    }
    Ok(AttributeStatement { attributes })
}

/// Reads a `saml:Attribute` element. Also used for actor documents.
pub(crate) fn read_attribute(element: Node<'_, '_>) -> Result<Attribute, ReadError> {
    let name = required_attribute(element, "Name", RequiredField::AttributeName)?;
    let name_format = element
        .attribute("NameFormat")
        .map(|format| {
            Url::parse(format)
                .map(|_| format.to_string())
                .map_err(|e| ReadError::malformed("NameFormat", e))
        })
        .transpose()?;

    let mut attribute = Attribute {
        name: name.to_string(),
        name_format,
        friendly_name: optional_attribute(element, "FriendlyName"),
        value_type: None,
        original_issuer: element
            .attribute((IDENTITY_CLAIMS_NS, "OriginalIssuer"))
            .map(str::to_string),
        values: Vec::new(),
    };

    for (index, child) in element.child_elements().enumerate() {
        if !child.is(SAML_NS, "AttributeValue") {
            return Err(unexpected(child, element));
        }
        let value_type = xsi_type(child)?;
        if index == 0 {
            attribute.value_type = value_type;
        } else if attribute.value_type != value_type {
            return Err(ReadError::InconsistentValueTypes {
                attribute: attribute.name,
            });
        }
        attribute.values.push(child.deep_text());
    }
    Ok(attribute)
}

fn read_authn_statement(element: Node<'_, '_>) -> Result<AuthnStatement, ReadError> {
    let authn_instant = parse_instant(
        element
            .attribute("AuthnInstant")
            .ok_or(ReadError::MissingRequiredField(RequiredField::AuthnInstant))?,
        "AuthnInstant",
    )?;

    let mut subject_locality = None;
    let mut authn_context = None;
    for child in element.child_elements() {
        if child.is(SAML_NS, "SubjectLocality")
            && subject_locality.is_none()
            && authn_context.is_none()
        {
            subject_locality = Some(SubjectLocality {
                address: optional_attribute(child, "Address"),
                dns_name: optional_attribute(child, "DNSName"),
            });
        } else if child.is(SAML_NS, "AuthnContext") && authn_context.is_none() {
            authn_context = Some(read_authn_context(child)?);
        } else {
            return Err(unexpected(child, element));
        }
    }

    Ok(AuthnStatement {
        authn_instant,
        session_index: optional_attribute(element, "SessionIndex"),
        session_not_on_or_after: optional_instant(element, "SessionNotOnOrAfter")?,
        subject_locality,
        authn_context: authn_context
            .ok_or(ReadError::MissingRequiredField(RequiredField::AuthnContext))?,
    })
}

fn read_authn_context(element: Node<'_, '_>) -> Result<AuthnContext, ReadError> {
    let mut context = AuthnContext::default();
    let mut declared = false;
    for child in element.child_elements() {
        if child.tag_name().namespace() != Some(SAML_NS) {
            return Err(unexpected(child, element));
        }
        let text = child.text_content().trim().to_string();
        match child.tag_name().name() {
            "AuthnContextClassRef" if context.class_ref.is_none() && !declared => {
                context.class_ref = Some(text).filter(|t| !t.is_empty());
            }
            "AuthnContextDeclRef" if !declared => {
                context.decl_ref = Some(text).filter(|t| !t.is_empty());
                declared = true;
            }
            "AuthnContextDecl" if !declared => declared = true,
            "AuthenticatingAuthority" => {
                if text.is_empty() {
                    return Err(ReadError::MissingRequiredField(RequiredField::AuthnContext));
                }
                context.authenticating_authorities.push(text);
            }
            _ => return Err(unexpected(child, element)),
        }
    }
    if context.class_ref.is_none() && context.decl_ref.is_none() && !declared {
        return Err(ReadError::MissingRequiredField(RequiredField::AuthnContext));
    }
    Ok(context)
}

fn read_authz_decision_statement(
    element: Node<'_, '_>,
) -> Result<AuthzDecisionStatement, ReadError> {
    let resource = element
        .attribute("Resource")
        .ok_or(ReadError::MissingRequiredField(RequiredField::Resource))?
        .to_string();
    let raw_decision = element
        .attribute("Decision")
        .ok_or(ReadError::MissingRequiredField(RequiredField::Decision))?;
    let decision = Decision::parse(raw_decision).ok_or_else(|| {
        ReadError::malformed("Decision", ValueError::Enumeration(raw_decision.to_string()))
    })?;

    let mut actions = Vec::new();
    let mut has_evidence = false;
    for child in element.child_elements() {
        if child.is(SAML_NS, "Action") && !has_evidence {
            let value = child.text_content().trim().to_string();
            if value.is_empty() {
                return Err(ReadError::MissingRequiredField(RequiredField::Action));
            }
            actions.push(Action {
                namespace: optional_attribute(child, "Namespace"),
                value,
            });
        } else if child.is(SAML_NS, "Evidence") && !has_evidence {
            has_evidence = true;
        } else {
            return Err(unexpected(child, element));
        }
    }
    if actions.is_empty() {
        return Err(ReadError::MissingRequiredField(RequiredField::Action));
    }

    Ok(AuthzDecisionStatement {
        resource,
        decision,
        actions,
        has_evidence,
    })
}
