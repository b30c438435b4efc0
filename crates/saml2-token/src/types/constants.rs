//! SAML 2.0 constants and URIs.
//!
//! Contains namespace URIs, name ID formats, XML-DSig algorithm identifiers
//! and the claim type URIs produced by the claims builder.

/// SAML 2.0 assertion namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XSI namespace URI.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespace of the `OriginalIssuer` attribute extension.
pub const IDENTITY_CLAIMS_NS: &str = "http://schemas.xmlsoap.org/ws/2009/09/identity/claims";

/// The only assertion version accepted.
pub const SAML_VERSION: &str = "2.0";

// ============================================================================
// Name ID Formats
// ============================================================================

/// SAML Name ID formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameIdFormat {
    /// Unspecified name ID format.
    #[default]
    Unspecified,
    /// Email address format.
    Email,
    /// Entity identifier format.
    Entity,
    /// Persistent identifier format.
    Persistent,
    /// Transient identifier format.
    Transient,
}

impl NameIdFormat {
    /// Returns the URI for this name ID format.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Unspecified => "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified",
            Self::Email => "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
            Self::Entity => "urn:oasis:names:tc:SAML:2.0:nameid-format:entity",
            Self::Persistent => "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
            Self::Transient => "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
        }
    }

    /// Parses a name ID format from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified" => Some(Self::Unspecified),
            "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress" => Some(Self::Email),
            "urn:oasis:names:tc:SAML:2.0:nameid-format:entity" => Some(Self::Entity),
            "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent" => Some(Self::Persistent),
            "urn:oasis:names:tc:SAML:2.0:nameid-format:transient" => Some(Self::Transient),
            _ => None,
        }
    }
}

// ============================================================================
// XML-DSig algorithms
// ============================================================================

/// XML signature algorithms.
pub mod signature_algorithms {
    /// Legacy RSA-SHA1 signature algorithm (not recommended).
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";

    /// RSA-SHA256 signature algorithm.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// RSA-SHA384 signature algorithm.
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";

    /// RSA-SHA512 signature algorithm.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

    /// ECDSA-SHA256 signature algorithm.
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";

    /// ECDSA-SHA384 signature algorithm.
    pub const ECDSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384";

    /// ECDSA-SHA512 signature algorithm.
    pub const ECDSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512";

    /// Legacy HMAC-SHA1 signature algorithm.
    pub const HMAC_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#hmac-sha1";

    /// HMAC-SHA256 signature algorithm.
    pub const HMAC_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha256";

    /// HMAC-SHA384 signature algorithm.
    pub const HMAC_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha384";

    /// HMAC-SHA512 signature algorithm.
    pub const HMAC_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha512";
}

/// Digest algorithms.
pub mod digest_algorithms {
    /// Legacy SHA-1 digest algorithm (not recommended).
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

    /// SHA-256 digest algorithm.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

    /// SHA-384 digest algorithm.
    pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";

    /// SHA-512 digest algorithm.
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
}

/// Canonicalization algorithms.
pub mod canonicalization_algorithms {
    /// Exclusive C14N without comments.
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

    /// Exclusive C14N with comments.
    pub const EXCLUSIVE_C14N_WITH_COMMENTS: &str =
        "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

    /// C14N without comments.
    pub const C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";

    /// C14N with comments.
    pub const C14N_WITH_COMMENTS: &str =
        "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
}

/// Reference transforms other than canonicalization.
pub mod transform_algorithms {
    /// Enveloped signature transform.
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
}

// ============================================================================
// Claims
// ============================================================================

/// Claim type URIs.
pub mod claim_types {
    /// The subject's name identifier.
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

    /// The subject's name.
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";

    /// A role held by the subject.
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

    /// How the subject authenticated.
    pub const AUTHENTICATION_METHOD: &str =
        "http://schemas.microsoft.com/ws/2008/06/identity/claims/authenticationmethod";

    /// When the subject authenticated.
    pub const AUTHENTICATION_INSTANT: &str =
        "http://schemas.microsoft.com/ws/2008/06/identity/claims/authenticationinstant";

    /// A delegate acting on behalf of the subject.
    pub const ACTOR: &str = "http://schemas.xmlsoap.org/ws/2009/09/identity/claims/actor";
}

/// Claim value type URIs.
pub mod claim_value_types {
    /// `xs:string`.
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// `xs:dateTime`.
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// Keys of the properties attached to claims.
pub mod claim_properties {
    /// Name ID format.
    pub const NAME_ID_FORMAT: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/format";

    /// Name ID name qualifier.
    pub const NAME_ID_NAME_QUALIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/namequalifier";

    /// Name ID SP name qualifier.
    pub const NAME_ID_SP_NAME_QUALIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/spnamequalifier";

    /// Name ID SP provided ID.
    pub const NAME_ID_SP_PROVIDED_ID: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/spprovidedid";

    /// Attribute name format.
    pub const ATTRIBUTE_NAME_FORMAT: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/attributename";

    /// Attribute friendly name.
    pub const ATTRIBUTE_DISPLAY_NAME: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claimproperties/displayname";
}
