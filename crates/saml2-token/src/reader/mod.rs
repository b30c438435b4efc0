//! Structural reader.
//!
//! Turns an untrusted token string into an [`Assertion`]. Checks happen in
//! a fixed order so that a given defect always yields the same error:
//! arguments, size, well-formedness, root element, `Version`, `ID`,
//! `IssueInstant`, `Issuer`, then the children in schema order.

mod signature;
mod statements;

pub(crate) use statements::read_attribute;

use chrono::{DateTime, Utc};
use roxmltree::Node;
use tracing::debug;

use crate::error::{ArgumentError, ReadError, RequiredField, TokenError, ValueError};
use crate::types::{
    Assertion, AudienceRestriction, Conditions, Issuer, NameId, ProxyRestriction, Statement,
    Subject, SubjectConfirmation, SubjectConfirmationData, SAML_NS, SAML_VERSION, XMLDSIG_NS,
};
use crate::xml::{self, NodeExt};

/// Reads an assertion from `raw`, refusing tokens longer than
/// `maximum_size` bytes.
///
/// # Errors
///
/// Returns [`TokenError::Argument`] for empty input and
/// [`TokenError::Read`] for every structural defect.
pub fn read_assertion(raw: &str, maximum_size: usize) -> Result<Assertion, TokenError> {
    if raw.is_empty() {
        return Err(ArgumentError::NullOrEmpty("token").into());
    }
    check_size(raw, maximum_size)?;
    let document = xml::parse(raw).map_err(ReadError::from)?;
    let assertion = read_root(document.root_element(), raw)?;
    debug!(
        assertion_id = assertion.id(),
        statements = assertion.statements().len(),
        signed = assertion.is_signed(),
        "assertion read"
    );
    Ok(assertion)
}

/// Returns true if `raw` is within size, well-formed and rooted at a
/// SAML 2.0 `Assertion`.
#[must_use]
pub fn can_read(raw: &str, maximum_size: usize) -> bool {
    !raw.is_empty()
        && check_size(raw, maximum_size).is_ok()
        && xml::parse(raw).is_ok_and(|document| document.root_element().is(SAML_NS, "Assertion"))
}

fn check_size(raw: &str, maximum: usize) -> Result<(), ReadError> {
    if raw.len() > maximum {
        return Err(ReadError::SizeExceeded {
            size: raw.len(),
            maximum,
        });
    }
    Ok(())
}

/// Position of each assertion child in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Issuer,
    Signature,
    Subject,
    Conditions,
    Advice,
    Statement,
}

fn read_root(root: Node<'_, '_>, source: &str) -> Result<Assertion, ReadError> {
    if !root.is(SAML_NS, "Assertion") {
        return Err(ReadError::NotAnAssertion {
            found: expanded_name(root),
        });
    }

    let version = root
        .attribute("Version")
        .ok_or(ReadError::MissingRequiredField(RequiredField::Version))?;
    if version != SAML_VERSION {
        return Err(ReadError::UnsupportedVersion(version.to_string()));
    }
    let version = version.to_string();
    let id = required_attribute(root, "ID", RequiredField::Id)?.to_string();
    let issue_instant = parse_instant(
        root.attribute("IssueInstant")
            .ok_or(ReadError::MissingRequiredField(RequiredField::IssueInstant))?,
        "IssueInstant",
    )?;

    let mut children = root.child_elements();
    let issuer = children
        .next()
        .filter(|e| e.is(SAML_NS, "Issuer"))
        .ok_or(ReadError::MissingRequiredField(RequiredField::Issuer))
        .and_then(read_issuer)?;

    let mut last = Slot::Issuer;
    let mut signature = None;
    let mut subject = None;
    let mut conditions = None;
    let mut has_advice = false;
    let mut statements = Vec::new();

    for child in children {
        let slot = slot_of(child)?;
        if slot < last || (slot == last && slot != Slot::Statement) {
            return Err(unexpected(child, root));
        }
        last = slot;
        match slot {
            Slot::Issuer => return Err(unexpected(child, root)),
            Slot::Signature => signature = Some(signature::read_signature(child)?),
            Slot::Subject => subject = Some(read_subject(child)?),
            Slot::Conditions => conditions = Some(read_conditions(child)?),
            Slot::Advice => {
                read_advice(child)?;
                has_advice = true;
            }
            Slot::Statement => statements.push(statements::read_statement(child)?),
        }
    }

    if subject.is_none() && statements.is_empty() {
        return Err(ReadError::NoSubjectNoStatements);
    }
    if statements
        .iter()
        .any(|s| matches!(s, Statement::Attribute(a) if a.attributes.is_empty()))
    {
        return Err(ReadError::NoAttributesInStatement);
    }

    Ok(Assertion {
        id,
        version,
        issue_instant,
        issuer,
        subject,
        conditions,
        has_advice,
        statements,
        signature,
        source: source.to_string(),
    })
}

fn slot_of(element: Node<'_, '_>) -> Result<Slot, ReadError> {
    if element.is(XMLDSIG_NS, "Signature") {
        return Ok(Slot::Signature);
    }
    if element.tag_name().namespace() != Some(SAML_NS) {
        return Err(ReadError::UnexpectedElement {
            element: element.qualified_name(),
            parent: "Assertion".to_string(),
        });
    }
    match element.tag_name().name() {
        "Issuer" => Ok(Slot::Issuer),
        "Subject" => Ok(Slot::Subject),
        "Conditions" => Ok(Slot::Conditions),
        "Advice" => Ok(Slot::Advice),
        "Statement" | "AuthnStatement" | "AuthzDecisionStatement" | "AttributeStatement" => {
            Ok(Slot::Statement)
        }
        _ => Err(ReadError::UnexpectedElement {
            element: element.qualified_name(),
            parent: "Assertion".to_string(),
        }),
    }
}

fn read_issuer(element: Node<'_, '_>) -> Result<Issuer, ReadError> {
    let value = element.text_content().trim().to_string();
    if value.is_empty() {
        return Err(ReadError::MissingRequiredField(RequiredField::Issuer));
    }
    Ok(Issuer {
        value,
        format: optional_attribute(element, "Format"),
        name_qualifier: optional_attribute(element, "NameQualifier"),
        sp_name_qualifier: optional_attribute(element, "SPNameQualifier"),
    })
}

fn read_name_id(element: Node<'_, '_>) -> Result<NameId, ReadError> {
    let value = element.text_content().trim().to_string();
    if value.is_empty() {
        return Err(ReadError::MissingRequiredField(RequiredField::NameId));
    }
    Ok(NameId {
        value,
        format: optional_attribute(element, "Format"),
        name_qualifier: optional_attribute(element, "NameQualifier"),
        sp_name_qualifier: optional_attribute(element, "SPNameQualifier"),
        sp_provided_id: optional_attribute(element, "SPProvidedID"),
    })
}

/// Reads the identifier of a subject or confirmation. `BaseID` is accepted
/// but carries nothing this crate uses.
fn read_identifier(element: Node<'_, '_>) -> Result<Option<NameId>, ReadError> {
    match element.tag_name().name() {
        "NameID" => read_name_id(element).map(Some),
        "EncryptedID" => Err(ReadError::EncryptedContent("EncryptedID".to_string())),
        _ => Ok(None),
    }
}

fn read_subject(element: Node<'_, '_>) -> Result<Subject, ReadError> {
    let mut subject = Subject {
        name_id: None,
        subject_confirmations: Vec::new(),
    };
    let mut identified = false;

    for child in element.child_elements() {
        if child.tag_name().namespace() != Some(SAML_NS) {
            return Err(unexpected(child, element));
        }
        match child.tag_name().name() {
            "NameID" | "EncryptedID" | "BaseID"
                if !identified && subject.subject_confirmations.is_empty() =>
            {
                subject.name_id = read_identifier(child)?;
                identified = true;
            }
            "SubjectConfirmation" => subject
                .subject_confirmations
                .push(read_subject_confirmation(child)?),
            _ => return Err(unexpected(child, element)),
        }
    }
    Ok(subject)
}

fn read_subject_confirmation(
    element: Node<'_, '_>,
) -> Result<SubjectConfirmation, ReadError> {
    let method =
        required_attribute(element, "Method", RequiredField::SubjectConfirmationMethod)?.to_string();
    let mut confirmation = SubjectConfirmation {
        method,
        name_id: None,
        subject_confirmation_data: None,
    };

    for child in element.child_elements() {
        if child.tag_name().namespace() != Some(SAML_NS) {
            return Err(unexpected(child, element));
        }
        match child.tag_name().name() {
            "NameID" | "EncryptedID" | "BaseID"
                if confirmation.name_id.is_none()
                    && confirmation.subject_confirmation_data.is_none() =>
            {
                confirmation.name_id = read_identifier(child)?;
            }
            "SubjectConfirmationData" if confirmation.subject_confirmation_data.is_none() => {
                confirmation.subject_confirmation_data =
                    Some(read_subject_confirmation_data(child)?);
            }
            _ => return Err(unexpected(child, element)),
        }
    }
    Ok(confirmation)
}

fn read_subject_confirmation_data(
    element: Node<'_, '_>,
) -> Result<SubjectConfirmationData, ReadError> {
    Ok(SubjectConfirmationData {
        in_response_to: optional_attribute(element, "InResponseTo"),
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
        not_before: optional_instant(element, "NotBefore")?,
        recipient: optional_attribute(element, "Recipient"),
        address: optional_attribute(element, "Address"),
    })
}

fn read_conditions(element: Node<'_, '_>) -> Result<Conditions, ReadError> {
    let mut conditions = Conditions {
        not_before: optional_instant(element, "NotBefore")?,
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
        ..Conditions::default()
    };

    for child in element.child_elements() {
        if child.tag_name().namespace() != Some(SAML_NS) {
            return Err(unexpected(child, element));
        }
        match child.tag_name().name() {
            "AudienceRestriction" => conditions
                .audience_restrictions
                .push(read_audience_restriction(child)?),
            "OneTimeUse" => {
                if conditions.one_time_use {
                    return Err(ReadError::malformed(
                        "OneTimeUse",
                        ValueError::Duplicate("OneTimeUse".to_string()),
                    ));
                }
                conditions.one_time_use = true;
            }
            "ProxyRestriction" => {
                if conditions.proxy_restriction.is_some() {
                    return Err(ReadError::malformed(
                        "ProxyRestriction",
                        ValueError::Duplicate("ProxyRestriction".to_string()),
                    ));
                }
                conditions.proxy_restriction = Some(read_proxy_restriction(child)?);
            }
            _ => return Err(unexpected(child, element)),
        }
    }
    Ok(conditions)
}

fn read_audiences(element: Node<'_, '_>) -> Result<Vec<String>, ReadError> {
    element
        .child_elements()
        .map(|child| {
            if !child.is(SAML_NS, "Audience") {
                return Err(unexpected(child, element));
            }
            let audience = child.text_content().trim().to_string();
            if audience.is_empty() {
                return Err(ReadError::MissingRequiredField(RequiredField::Audience));
            }
            Ok(audience)
        })
        .collect()
}

fn read_audience_restriction(element: Node<'_, '_>) -> Result<AudienceRestriction, ReadError> {
    let audiences = read_audiences(element)?;
    if audiences.is_empty() {
        return Err(ReadError::MissingRequiredField(RequiredField::Audience));
    }
    Ok(AudienceRestriction { audiences })
}

fn read_proxy_restriction(element: Node<'_, '_>) -> Result<ProxyRestriction, ReadError> {
    let count = element
        .attribute("Count")
        .map(|count| count.trim().parse::<u32>())
        .transpose()
        .map_err(|e| ReadError::malformed("Count", e))?;
    Ok(ProxyRestriction {
        count,
        audiences: read_audiences(element)?,
    })
}

fn read_advice(element: Node<'_, '_>) -> Result<(), ReadError> {
    match element
        .child_elements()
        .find(|child| child.is(SAML_NS, "EncryptedAssertion"))
    {
        Some(_) => Err(ReadError::EncryptedContent("EncryptedAssertion".to_string())),
        None => Ok(()),
    }
}

pub(super) fn unexpected(element: Node<'_, '_>, parent: Node<'_, '_>) -> ReadError {
    ReadError::UnexpectedElement {
        element: element.qualified_name(),
        parent: parent.qualified_name(),
    }
}

pub(super) fn expanded_name(element: Node<'_, '_>) -> String {
    match element.tag_name().namespace() {
        Some(ns) => format!("{{{ns}}}{}", element.tag_name().name()),
        None => element.tag_name().name().to_string(),
    }
}

pub(super) fn optional_attribute(element: Node<'_, '_>, name: &str) -> Option<String> {
    element.attribute(name).map(str::to_string)
}

pub(super) fn required_attribute<'a>(
    element: Node<'a, '_>,
    name: &str,
    field: RequiredField,
) -> Result<&'a str, ReadError> {
    element
        .attribute(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ReadError::MissingRequiredField(field))
}

pub(super) fn parse_instant(value: &str, field: &'static str) -> Result<DateTime<Utc>, ReadError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| ReadError::malformed(field, e))
}

pub(super) fn optional_instant(
    element: Node<'_, '_>,
    name: &'static str,
) -> Result<Option<DateTime<Utc>>, ReadError> {
    element
        .attribute(name)
        .map(|value| parse_instant(value, name))
        .transpose()
}
