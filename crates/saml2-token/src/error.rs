//! Error types for the token pipeline.
//!
//! Every failure carries the stage that produced it and a stable,
//! machine-readable code such as `read.size_exceeded` or
//! `signature.digest_tampered`. Display strings are for humans and may
//! change; codes do not.

use std::num::ParseIntError;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::xml::XmlError;

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Any failure of the validation pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The caller passed an unusable argument.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The token could not be read.
    #[error("token could not be read: {0}")]
    Read(#[from] ReadError),

    /// The signature did not verify.
    #[error("signature verification failed: {0}")]
    Signature(#[from] SignatureError),

    /// A semantic check failed.
    #[error("token validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Attribute consolidation failed.
    #[error("attribute consolidation failed: {0}")]
    Consolidation(#[from] ConsolidationError),

    /// The actor chain could not be processed.
    #[error("actor processing failed: {0}")]
    Actor(#[from] ActorError),

    /// Claims could not be built.
    #[error("claims could not be built: {0}")]
    Claims(#[from] ClaimsError),
}

impl TokenError {
    /// Returns the pipeline stage that failed.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::Read(_) => "read",
            Self::Signature(_) => "signature",
            Self::Validation(_) => "validation",
            Self::Consolidation(_) => "consolidation",
            Self::Actor(_) => "actor",
            Self::Claims(_) => "claims",
        }
    }

    /// Returns the stable error code, `stage.reason`.
    #[must_use]
    pub fn code(&self) -> String {
        let reason = match self {
            Self::Argument(e) => e.code(),
            Self::Read(e) => e.code(),
            Self::Signature(e) => e.code(),
            Self::Validation(e) => e.code(),
            Self::Consolidation(e) => e.code(),
            Self::Actor(e) => e.code(),
            Self::Claims(e) => e.code(),
        };
        format!("{}.{reason}", self.stage())
    }
}

/// Input contract violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// A required argument is empty.
    #[error("argument '{0}' must not be empty")]
    NullOrEmpty(&'static str),

    /// A numeric argument is outside its allowed range.
    #[error("argument '{name}' is out of range: {value}")]
    OutOfRange {
        /// Argument name.
        name: &'static str,
        /// Rejected value.
        value: usize,
    },
}

impl ArgumentError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NullOrEmpty(_) => "null_or_empty",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Fields whose absence is reported by [`ReadError::MissingRequiredField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Assertion `Version`.
    Version,
    /// Assertion `ID`.
    Id,
    /// Assertion `IssueInstant`.
    IssueInstant,
    /// `saml:Issuer`.
    Issuer,
    /// `NameID` value inside a subject.
    NameId,
    /// `SubjectConfirmation` `Method`.
    SubjectConfirmationMethod,
    /// `Audience` inside an `AudienceRestriction`.
    Audience,
    /// Attribute `Name`.
    AttributeName,
    /// `AuthnInstant` of an authentication statement.
    AuthnInstant,
    /// `AuthnContext` of an authentication statement.
    AuthnContext,
    /// `Resource` of an authorization decision statement.
    Resource,
    /// `Decision` of an authorization decision statement.
    Decision,
    /// `Action` of an authorization decision statement.
    Action,
    /// `ds:SignedInfo`.
    SignedInfo,
    /// `ds:CanonicalizationMethod`.
    CanonicalizationMethod,
    /// `ds:SignatureMethod`.
    SignatureMethod,
    /// `ds:Reference`.
    Reference,
    /// `ds:DigestMethod`.
    DigestMethod,
    /// `ds:DigestValue`.
    DigestValue,
    /// `ds:SignatureValue`.
    SignatureValue,
    /// `Algorithm` on a signature element.
    Algorithm,
}

impl RequiredField {
    /// Returns the error code for the missing field.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Version => "missing_required_field.version",
            Self::Id => "missing_required_field.id",
            Self::IssueInstant => "missing_required_field.issue_instant",
            Self::Issuer => "missing_required_field.issuer",
            Self::NameId => "missing_required_field.name_id",
            Self::SubjectConfirmationMethod => "missing_required_field.subject_confirmation_method",
            Self::Audience => "missing_required_field.audience",
            Self::AttributeName => "missing_required_field.attribute_name",
            Self::AuthnInstant => "missing_required_field.authn_instant",
            Self::AuthnContext => "missing_required_field.authn_context",
            Self::Resource => "missing_required_field.resource",
            Self::Decision => "missing_required_field.decision",
            Self::Action => "missing_required_field.action",
            Self::SignedInfo => "missing_required_field.signed_info",
            Self::CanonicalizationMethod => "missing_required_field.canonicalization_method",
            Self::SignatureMethod => "missing_required_field.signature_method",
            Self::Reference => "missing_required_field.reference",
            Self::DigestMethod => "missing_required_field.digest_method",
            Self::DigestValue => "missing_required_field.digest_value",
            Self::SignatureValue => "missing_required_field.signature_value",
            Self::Algorithm => "missing_required_field.algorithm",
        }
    }

    /// Returns the name of the field as it appears in XML.
    #[must_use]
    pub const fn xml_name(self) -> &'static str {
        match self {
            Self::Version => "Version",
            Self::Id => "ID",
            Self::IssueInstant => "IssueInstant",
            Self::Issuer => "Issuer",
            Self::NameId => "NameID",
            Self::SubjectConfirmationMethod => "Method",
            Self::Audience => "Audience",
            Self::AttributeName => "Name",
            Self::AuthnInstant => "AuthnInstant",
            Self::AuthnContext => "AuthnContext",
            Self::Resource => "Resource",
            Self::Decision => "Decision",
            Self::Action => "Action",
            Self::SignedInfo => "SignedInfo",
            Self::CanonicalizationMethod => "CanonicalizationMethod",
            Self::SignatureMethod => "SignatureMethod",
            Self::Reference => "Reference",
            Self::DigestMethod => "DigestMethod",
            Self::DigestValue => "DigestValue",
            Self::SignatureValue => "SignatureValue",
            Self::Algorithm => "Algorithm",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.xml_name())
    }
}

/// Why a typed value could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Not an RFC 3339 date-time with offset.
    #[error("invalid date-time: {0}")]
    DateTime(#[from] chrono::ParseError),

    /// Not an absolute URI.
    #[error("invalid URI: {0}")]
    Uri(#[from] url::ParseError),

    /// Not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Not a non-negative integer.
    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),

    /// Not `true`, `false`, `1` or `0`.
    #[error("invalid boolean '{0}'")]
    Boolean(String),

    /// Not a recognized enumeration value.
    #[error("unrecognized value '{0}'")]
    Enumeration(String),

    /// An element that may appear once appeared again.
    #[error("duplicate element '{0}'")]
    Duplicate(String),

    /// A `QName` in content uses an undeclared prefix.
    #[error("unbound prefix in '{0}'")]
    UnboundPrefix(String),
}

/// Structural read failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    /// The token is larger than the configured maximum.
    #[error("token is {size} bytes, maximum is {maximum}")]
    SizeExceeded {
        /// Token length in bytes.
        size: usize,
        /// Configured maximum.
        maximum: usize,
    },

    /// The token is not well-formed, namespace-valid XML.
    #[error("malformed XML: {0}")]
    MalformedXml(#[from] XmlError),

    /// The root element is not a SAML 2.0 assertion.
    #[error("root element {found} is not a SAML 2.0 Assertion")]
    NotAnAssertion {
        /// Expanded name of the root element.
        found: String,
    },

    /// A required field is absent or empty.
    #[error("missing required field {0}")]
    MissingRequiredField(RequiredField),

    /// The assertion version is not `2.0`.
    #[error("unsupported assertion version '{0}'")]
    UnsupportedVersion(String),

    /// A typed field could not be parsed.
    #[error("malformed value in {field}")]
    MalformedValue {
        /// The field that failed.
        field: &'static str,
        /// The parse failure.
        #[source]
        source: ValueError,
    },

    /// An element appeared where the schema does not allow it.
    #[error("unexpected element {element} in {parent}")]
    UnexpectedElement {
        /// Name of the offending element.
        element: String,
        /// Name of the containing element.
        parent: String,
    },

    /// The token carries encrypted content.
    #[error("encrypted content ({0}) is not supported")]
    EncryptedContent(String),

    /// The values of one attribute declare different `xsi:type`s.
    #[error("values of attribute '{attribute}' have inconsistent types")]
    InconsistentValueTypes {
        /// Attribute name.
        attribute: String,
    },

    /// The assertion has neither a subject nor statements.
    #[error("assertion has no subject and no statements")]
    NoSubjectNoStatements,

    /// An attribute statement has no attributes.
    #[error("attribute statement has no attributes")]
    NoAttributesInStatement,
}

impl ReadError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SizeExceeded { .. } => "size_exceeded",
            Self::MalformedXml(_) => "malformed_xml",
            Self::NotAnAssertion { .. } => "not_an_assertion",
            Self::MissingRequiredField(field) => field.code(),
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::MalformedValue { .. } => "malformed_value",
            Self::UnexpectedElement { .. } => "unexpected_element",
            Self::EncryptedContent(_) => "encrypted_content",
            Self::InconsistentValueTypes { .. } => "inconsistent_value_types",
            Self::NoSubjectNoStatements => "no_subject_no_statements",
            Self::NoAttributesInStatement => "no_attributes_in_statement",
        }
    }

    pub(crate) fn malformed(field: &'static str, source: impl Into<ValueError>) -> Self {
        Self::MalformedValue {
            field,
            source: source.into(),
        }
    }
}

/// Signature verification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// A signature is required but the assertion is unsigned.
    #[error("assertion is not signed")]
    Unsigned,

    /// The reference does not point at the assertion.
    #[error("reference '{uri}' does not identify the assertion")]
    ReferenceMismatch {
        /// The reference URI.
        uri: String,
    },

    /// An algorithm or transform is not supported or not allowed.
    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// The digest of the signed content does not match the reference.
    #[error("digest mismatch, signed content was modified")]
    DigestTampered,

    /// The signature value does not verify with the selected key.
    #[error("signature value does not verify")]
    SignatureTampered,

    /// No configured key can verify the signature.
    #[error("no signing key found for {algorithm}")]
    KeyNotFound {
        /// The declared signature algorithm URI.
        algorithm: String,
    },

    /// The signed content could not be canonicalized.
    #[error("cannot canonicalize signed content: {0}")]
    Canonicalization(#[from] XmlError),
}

impl SignatureError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::ReferenceMismatch { .. } => "reference_mismatch",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::DigestTampered => "digest_tampered",
            Self::SignatureTampered => "signature_tampered",
            Self::KeyNotFound { .. } => "key_not_found",
            Self::Canonicalization(_) => "canonicalization_failed",
        }
    }

    /// Returns true if the signed content or signature value was altered.
    #[must_use]
    pub const fn is_invalid_signature(&self) -> bool {
        matches!(self, Self::DigestTampered | Self::SignatureTampered)
    }
}

/// Semantic validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The issuer is empty or not trusted.
    #[error("issuer '{issuer}' is not accepted")]
    InvalidIssuer {
        /// The rejected issuer.
        issuer: String,
    },

    /// None of the audiences is accepted.
    #[error("none of the audiences {audiences:?} is accepted")]
    InvalidAudience {
        /// The rejected audiences.
        audiences: Vec<String>,
    },

    /// The token is expired.
    #[error("token expired at {not_on_or_after} (now {now})")]
    TokenExpired {
        /// End of the validity window.
        not_on_or_after: DateTime<Utc>,
        /// Time of the check.
        now: DateTime<Utc>,
    },

    /// The token is not valid yet.
    #[error("token not valid before {not_before} (now {now})")]
    TokenNotYetValid {
        /// Start of the validity window.
        not_before: DateTime<Utc>,
        /// Time of the check.
        now: DateTime<Utc>,
    },

    /// `NotBefore` is after `NotOnOrAfter`.
    #[error("NotBefore {not_before} is after NotOnOrAfter {not_on_or_after}")]
    InvalidLifetime {
        /// Start of the validity window.
        not_before: DateTime<Utc>,
        /// End of the validity window.
        not_on_or_after: DateTime<Utc>,
    },
}

impl ValidationError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidIssuer { .. } => "invalid_issuer",
            Self::InvalidAudience { .. } => "invalid_audience",
            Self::TokenExpired { .. } => "token_expired",
            Self::TokenNotYetValid { .. } => "token_not_yet_valid",
            Self::InvalidLifetime { .. } => "invalid_lifetime",
        }
    }
}

/// Attribute consolidation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsolidationError {
    /// No attribute collection was supplied.
    #[error("attribute collection is absent")]
    NullAttributes,
}

impl ConsolidationError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NullAttributes => "null_attributes",
        }
    }
}

/// Actor chain failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActorError {
    /// The actor string is not a valid actor document.
    #[error("malformed actor: {0}")]
    Malformed(String),

    /// More than one actor attribute was found for one identity.
    #[error("more than one actor attribute")]
    MultipleActors,

    /// The actor chain is nested deeper than allowed.
    #[error("actor chain deeper than {max_depth}")]
    DepthExceeded {
        /// Configured maximum depth.
        max_depth: usize,
    },
}

impl ActorError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::MultipleActors => "multiple_actors",
            Self::DepthExceeded { .. } => "depth_exceeded",
        }
    }
}

/// Claims construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    /// A statement type was found that the caller asked to reject.
    #[error("unrecognized statement '{type_name}'")]
    UnrecognizedStatement {
        /// The statement type.
        type_name: String,
    },
}

impl ClaimsError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedStatement { .. } => "unrecognized_statement",
        }
    }
}

/// Failures while producing an enveloped signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The input is not well-formed XML.
    #[error("cannot sign malformed XML: {0}")]
    Xml(#[from] XmlError),

    /// The root element is not a SAML 2.0 assertion.
    #[error("root element is not a SAML 2.0 Assertion")]
    NotAnAssertion,

    /// The assertion has no `ID` to reference.
    #[error("assertion has no ID")]
    MissingId,

    /// The assertion has no `saml:Issuer` to place the signature after.
    #[error("assertion has no Issuer")]
    MissingIssuer,

    /// The assertion already carries a signature.
    #[error("assertion is already signed")]
    AlreadySigned,

    /// The key failed to produce a signature.
    #[error(transparent)]
    Crypto(#[from] saml2_crypto::CryptoError),
}
