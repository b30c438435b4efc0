//! XML Signature support for SAML assertions.
//!
//! This module holds the parsed form of an enveloped `<ds:Signature>`, the
//! mapping between XML-DSig algorithm URIs and the algorithms implemented
//! by `saml2-crypto`, the configured [`SigningKey`]s, and the verifier and
//! signer built on top of them.
//!
//! # Signing Algorithms
//!
//! - RSA-SHA256 / RSA-SHA384 / RSA-SHA512
//! - ECDSA-SHA256 / ECDSA-SHA384 / ECDSA-SHA512 (P-256 / P-384 / P-521)
//! - HMAC-SHA256 / HMAC-SHA384 / HMAC-SHA512
//!
//! SHA-1 based algorithms (`rsa-sha1`, `hmac-sha1`, the `sha1` digest) are
//! understood but refused unless the caller opts in.

mod signer;
mod verifier;

pub use signer::{AssertionSigner, SignerOptions};
pub use verifier::{verify_signature, VerifyOptions};

use saml2_crypto::{CryptoError, HashAlgorithm, SignatureAlgorithm, VerificationKey};

use crate::types::{digest_algorithms, signature_algorithms, transform_algorithms};
use crate::xml::CanonicalizationMethod;

/// Returns the XML-DSig URI of a signature algorithm.
#[must_use]
pub const fn signature_algorithm_uri(algorithm: SignatureAlgorithm) -> &'static str {
    match algorithm {
        SignatureAlgorithm::RsaSha1 => signature_algorithms::RSA_SHA1,
        SignatureAlgorithm::RsaSha256 => signature_algorithms::RSA_SHA256,
        SignatureAlgorithm::RsaSha384 => signature_algorithms::RSA_SHA384,
        SignatureAlgorithm::RsaSha512 => signature_algorithms::RSA_SHA512,
        SignatureAlgorithm::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
        SignatureAlgorithm::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
        SignatureAlgorithm::EcdsaSha512 => signature_algorithms::ECDSA_SHA512,
        SignatureAlgorithm::HmacSha1 => signature_algorithms::HMAC_SHA1,
        SignatureAlgorithm::HmacSha256 => signature_algorithms::HMAC_SHA256,
        SignatureAlgorithm::HmacSha384 => signature_algorithms::HMAC_SHA384,
        SignatureAlgorithm::HmacSha512 => signature_algorithms::HMAC_SHA512,
    }
}

/// Parses a signature algorithm from its XML-DSig URI.
#[must_use]
pub fn signature_algorithm_from_uri(uri: &str) -> Option<SignatureAlgorithm> {
    match uri {
        signature_algorithms::RSA_SHA1 => Some(SignatureAlgorithm::RsaSha1),
        signature_algorithms::RSA_SHA256 => Some(SignatureAlgorithm::RsaSha256),
        signature_algorithms::RSA_SHA384 => Some(SignatureAlgorithm::RsaSha384),
        signature_algorithms::RSA_SHA512 => Some(SignatureAlgorithm::RsaSha512),
        signature_algorithms::ECDSA_SHA256 => Some(SignatureAlgorithm::EcdsaSha256),
        signature_algorithms::ECDSA_SHA384 => Some(SignatureAlgorithm::EcdsaSha384),
        signature_algorithms::ECDSA_SHA512 => Some(SignatureAlgorithm::EcdsaSha512),
        signature_algorithms::HMAC_SHA1 => Some(SignatureAlgorithm::HmacSha1),
        signature_algorithms::HMAC_SHA256 => Some(SignatureAlgorithm::HmacSha256),
        signature_algorithms::HMAC_SHA384 => Some(SignatureAlgorithm::HmacSha384),
        signature_algorithms::HMAC_SHA512 => Some(SignatureAlgorithm::HmacSha512),
        _ => None,
    }
}

/// Returns the XML-DSig URI of a digest algorithm.
#[must_use]
pub const fn digest_algorithm_uri(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha1 => digest_algorithms::SHA1,
        HashAlgorithm::Sha256 => digest_algorithms::SHA256,
        HashAlgorithm::Sha384 => digest_algorithms::SHA384,
        HashAlgorithm::Sha512 => digest_algorithms::SHA512,
    }
}

/// Parses a digest algorithm from its XML-DSig URI.
#[must_use]
pub fn digest_algorithm_from_uri(uri: &str) -> Option<HashAlgorithm> {
    match uri {
        digest_algorithms::SHA1 => Some(HashAlgorithm::Sha1),
        digest_algorithms::SHA256 => Some(HashAlgorithm::Sha256),
        digest_algorithms::SHA384 => Some(HashAlgorithm::Sha384),
        digest_algorithms::SHA512 => Some(HashAlgorithm::Sha512),
        _ => None,
    }
}

/// A reference transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Removes the enclosing `ds:Signature` from the signed content.
    Enveloped,
    /// Canonicalizes the signed content.
    Canonicalize {
        /// Canonicalization method.
        method: CanonicalizationMethod,
        /// `InclusiveNamespaces PrefixList` entries.
        inclusive_prefixes: Vec<String>,
    },
    /// Any other transform, kept by URI.
    Other(String),
}

impl Transform {
    /// Parses a transform from its `Algorithm` URI.
    #[must_use]
    pub fn from_uri(uri: &str, inclusive_prefixes: Vec<String>) -> Self {
        if uri == transform_algorithms::ENVELOPED_SIGNATURE {
            return Self::Enveloped;
        }
        match CanonicalizationMethod::from_uri(uri) {
            Some(method) => Self::Canonicalize {
                method,
                inclusive_prefixes,
            },
            None => Self::Other(uri.to_string()),
        }
    }
}

/// The single `ds:Reference` of an assertion signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureReference {
    /// The `URI` attribute (empty when absent).
    pub uri: String,
    /// Transforms in document order.
    pub transforms: Vec<Transform>,
    /// `DigestMethod` algorithm URI.
    pub digest_method: String,
    /// Decoded `DigestValue`.
    pub digest_value: Vec<u8>,
}

/// Key hints embedded in `ds:KeyInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// DER-encoded `X509Certificate`s.
    pub certificates: Vec<Vec<u8>>,
    /// `KeyName` values.
    pub key_names: Vec<String>,
}

impl KeyInfo {
    /// Returns true if no hint is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.key_names.is_empty()
    }
}

/// A parsed enveloped signature.
///
/// Algorithms are kept as URIs; the verifier decides what is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// `SignedInfo/CanonicalizationMethod` algorithm URI.
    pub canonicalization_method: String,
    /// `InclusiveNamespaces PrefixList` of the `SignedInfo` canonicalization.
    pub inclusive_prefixes: Vec<String>,
    /// `SignedInfo/SignatureMethod` algorithm URI.
    pub signature_method: String,
    /// The reference.
    pub reference: SignatureReference,
    /// Decoded `SignatureValue`.
    pub signature_value: Vec<u8>,
    /// Key hints.
    pub key_info: KeyInfo,
}

/// A key trusted to sign assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningKey {
    material: VerificationKey,
    key_id: Option<String>,
    certificate: Option<Vec<u8>>,
}

impl SigningKey {
    /// Wraps verification key material.
    #[must_use]
    pub const fn new(material: VerificationKey) -> Self {
        Self {
            material,
            key_id: None,
            certificate: None,
        }
    }

    /// Creates a key from a DER-encoded X.509 certificate.
    ///
    /// The certificate is kept for matching `ds:X509Certificate` hints.
    pub fn from_certificate_der(der: &[u8]) -> Result<Self, CryptoError> {
        let material = VerificationKey::from_certificate_der(der)?;
        Ok(Self {
            material,
            key_id: None,
            certificate: Some(der.to_vec()),
        })
    }

    /// Creates a key from a `CERTIFICATE` or `PUBLIC KEY` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        match saml2_crypto::pem_to_der(pem, "CERTIFICATE") {
            Some(der) => Self::from_certificate_der(&der),
            None => VerificationKey::from_pem(pem).map(Self::new),
        }
    }

    /// Creates a shared-secret key.
    #[must_use]
    pub fn symmetric(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(VerificationKey::symmetric(secret))
    }

    /// Sets the key id matched against `ds:KeyName`.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Returns the key material.
    #[must_use]
    pub const fn material(&self) -> &VerificationKey {
        &self.material
    }

    /// Returns the configured key id, or one derived from the material.
    #[must_use]
    pub fn key_id(&self) -> String {
        self.key_id
            .clone()
            .unwrap_or_else(|| self.material.key_id())
    }

    /// Returns the certificate the key was loaded from.
    #[must_use]
    pub fn certificate(&self) -> Option<&[u8]> {
        self.certificate.as_deref()
    }

    /// Returns true if this key can verify `algorithm`.
    #[must_use]
    pub fn supports(&self, algorithm: SignatureAlgorithm) -> bool {
        self.material.supports(algorithm)
    }

    /// Returns true if a key-info hint names this key.
    #[must_use]
    pub fn matches(&self, key_info: &KeyInfo) -> bool {
        let by_certificate = self
            .certificate
            .as_deref()
            .is_some_and(|own| key_info.certificates.iter().any(|c| c == own));
        by_certificate || {
            let id = self.key_id();
            key_info.key_names.iter().any(|name| *name == id)
        }
    }
}
