//! Assertion statements.
//!
//! The set of statements is closed: attribute, authentication and
//! authorization decision statements are modelled, and anything else
//! (a `saml:Statement` extension) is kept as [`UnrecognizedStatement`].

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A statement carried by an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// `saml:AttributeStatement`.
    Attribute(AttributeStatement),
    /// `saml:AuthnStatement`.
    Authentication(AuthnStatement),
    /// `saml:AuthzDecisionStatement`.
    AuthorizationDecision(AuthzDecisionStatement),
    /// A statement extension this crate does not interpret.
    Unrecognized(UnrecognizedStatement),
}

impl Statement {
    /// Returns the statement element name, or the extension type.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Attribute(_) => "AttributeStatement",
            Self::Authentication(_) => "AuthnStatement",
            Self::AuthorizationDecision(_) => "AuthzDecisionStatement",
            Self::Unrecognized(s) => &s.type_name,
        }
    }
}

/// Attribute statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeStatement {
    /// The attributes in document order (never empty once read).
    pub attributes: Vec<Attribute>,
}

/// SAML attribute.
///
/// Two attributes describe the same claim source when their name, name
/// format, friendly name, value type and original issuer are all equal;
/// see [`Attribute::same_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,

    /// The attribute name format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Expanded `xsi:type` of the values (`namespace#local`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// The issuer that originally asserted this attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_issuer: Option<String>,

    /// Attribute values in document order.
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates an attribute with the given name and no values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_format: None,
            friendly_name: None,
            value_type: None,
            original_issuer: None,
            values: Vec::new(),
        }
    }

    /// Appends a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Appends several values.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Sets the name format.
    #[must_use]
    pub fn with_name_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = Some(format.into());
        self
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the value type.
    #[must_use]
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Sets the original issuer.
    #[must_use]
    pub fn with_original_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.original_issuer = Some(issuer.into());
        self
    }

    /// Returns true if both attributes share name, name format, friendly
    /// name, value type and original issuer. Comparison is ordinal.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.name == other.name
            && self.name_format == other.name_format
            && self.friendly_name == other.friendly_name
            && self.value_type == other.value_type
            && self.original_issuer == other.original_issuer
    }
}

/// Authentication statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthnStatement {
    /// Time of authentication.
    pub authn_instant: DateTime<Utc>,

    /// Session index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,

    /// Session expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_not_on_or_after: Option<DateTime<Utc>>,

    /// Where the subject authenticated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_locality: Option<SubjectLocality>,

    /// Authentication context.
    pub authn_context: AuthnContext,
}

/// Subject locality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubjectLocality {
    /// Network address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// DNS name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
}

/// Authentication context.
///
/// At least one of the class reference or declaration reference is present
/// once read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthnContext {
    /// The authentication context class reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<String>,

    /// The authentication context declaration reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decl_ref: Option<String>,

    /// Authorities involved in authenticating the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authenticating_authorities: Vec<String>,
}

impl AuthnContext {
    /// Password-protected transport authentication context class.
    pub const PASSWORD_PROTECTED_TRANSPORT: &'static str =
        "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport";

    /// Password authentication context class.
    pub const PASSWORD: &'static str = "urn:oasis:names:tc:SAML:2.0:ac:classes:Password";

    /// Unspecified authentication context class.
    pub const UNSPECIFIED: &'static str = "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified";

    /// Returns the method used for the authentication method claim: the
    /// class reference, else the declaration reference.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.class_ref.as_deref().or(self.decl_ref.as_deref())
    }
}

/// Authorization decision statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthzDecisionStatement {
    /// The resource the decision applies to.
    pub resource: String,

    /// The decision.
    pub decision: Decision,

    /// Actions the decision covers (never empty once read).
    pub actions: Vec<Action>,

    /// Whether the statement carried `Evidence`.
    pub has_evidence: bool,
}

/// Authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    /// Access is permitted.
    Permit,
    /// Access is denied.
    Deny,
    /// No decision could be made.
    Indeterminate,
}

impl Decision {
    /// Parses the `Decision` attribute value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Permit" => Some(Self::Permit),
            "Deny" => Some(Self::Deny),
            "Indeterminate" => Some(Self::Indeterminate),
            _ => None,
        }
    }
}

/// An action in an authorization decision statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Namespace qualifying the action value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// The action.
    pub value: String,
}

/// A statement extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedStatement {
    /// The `xsi:type` of the statement, or its element name.
    pub type_name: String,
}
