//! SAML Assertion types.
//!
//! Assertions contain statements about a subject made by an issuer. An
//! [`Assertion`] is only ever produced by the reader and cannot be changed
//! afterwards; its parts are exposed through accessors.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Attribute, Issuer, NameId, Statement};
use crate::signature::XmlSignature;

/// SAML Assertion.
///
/// A package of information that supplies one or more statements made
/// by a SAML authority (the issuer).
#[derive(Debug, Clone, Serialize)]
pub struct Assertion {
    pub(crate) id: String,
    pub(crate) version: String,
    pub(crate) issue_instant: DateTime<Utc>,
    pub(crate) issuer: Issuer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) conditions: Option<Conditions>,
    pub(crate) has_advice: bool,
    pub(crate) statements: Vec<Statement>,
    #[serde(skip)]
    pub(crate) signature: Option<XmlSignature>,
    #[serde(skip)]
    pub(crate) source: String,
}

impl Assertion {
    /// Returns the assertion `ID`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the version (always `2.0`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the issue instant.
    #[must_use]
    pub const fn issue_instant(&self) -> DateTime<Utc> {
        self.issue_instant
    }

    /// Returns the issuer.
    #[must_use]
    pub const fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    /// Returns the subject, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// Returns the conditions, if any.
    #[must_use]
    pub const fn conditions(&self) -> Option<&Conditions> {
        self.conditions.as_ref()
    }

    /// Returns true if the assertion carried an `Advice` element.
    #[must_use]
    pub const fn has_advice(&self) -> bool {
        self.has_advice
    }

    /// Returns the statements in document order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the enveloped signature, if any.
    #[must_use]
    pub const fn signature(&self) -> Option<&XmlSignature> {
        self.signature.as_ref()
    }

    /// Returns true if the assertion carries a signature.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Returns the text the assertion was read from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the `NotBefore` condition.
    #[must_use]
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.conditions.as_ref().and_then(|c| c.not_before)
    }

    /// Returns the `NotOnOrAfter` condition.
    #[must_use]
    pub fn not_on_or_after(&self) -> Option<DateTime<Utc>> {
        self.conditions.as_ref().and_then(|c| c.not_on_or_after)
    }

    /// Returns every audience of every audience restriction, in order.
    #[must_use]
    pub fn audiences(&self) -> Vec<String> {
        self.conditions
            .iter()
            .flat_map(|c| &c.audience_restrictions)
            .flat_map(|r| r.audiences.iter().cloned())
            .collect()
    }

    /// Iterates over the attributes of all attribute statements.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.statements.iter().flat_map(|statement| match statement {
            Statement::Attribute(s) => s.attributes.as_slice(),
            _ => &[][..],
        })
    }
}

/// Subject of an assertion.
///
/// Identifies the principal that is the subject of all statements in the assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    /// The name identifier for the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// Subject confirmation data.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subject_confirmations: Vec<SubjectConfirmation>,
}

/// Subject confirmation.
///
/// Information that allows the assertion consumer to confirm the subject.
/// Parsed but not evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectConfirmation {
    /// The confirmation method.
    pub method: String,

    /// Name identifier of the confirming entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// Additional confirmation data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_confirmation_data: Option<SubjectConfirmationData>,
}

impl SubjectConfirmation {
    /// Bearer confirmation method URI.
    pub const BEARER: &'static str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

    /// Holder of key confirmation method URI.
    pub const HOLDER_OF_KEY: &'static str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";

    /// Sender vouches confirmation method URI.
    pub const SENDER_VOUCHES: &'static str = "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches";
}

/// Subject confirmation data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubjectConfirmationData {
    /// The request ID that this assertion responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// Time after which the subject can no longer be confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Time before which the subject cannot be confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// The location to which the assertion can be presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// IP address of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Conditions for assertion validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Time at or after which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Audience restrictions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,

    /// One-time use condition.
    pub one_time_use: bool,

    /// Proxy restriction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_restriction: Option<ProxyRestriction>,
}

/// Audience restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudienceRestriction {
    /// List of valid audiences (never empty once read).
    pub audiences: Vec<String>,
}

/// Proxy restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyRestriction {
    /// Maximum number of proxies allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// List of allowed proxy audiences.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
}
