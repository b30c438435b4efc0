//! Cryptographic algorithm definitions.
//!
//! XML-DSig names algorithms by URI; the mapping from URIs lives in
//! `saml2-token`. This module only describes what each algorithm needs:
//! which digest it uses and which kind of key material can verify it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for algorithm operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgorithmError {
    /// The algorithm relies on SHA-1 and legacy algorithms are disabled.
    #[error("algorithm '{0}' relies on SHA-1 and is disabled")]
    LegacyDisabled(String),

    /// The backend cannot sign with the algorithm.
    #[error("signing with '{0}' is not supported")]
    SigningUnsupported(String),
}

/// Digest algorithms usable for XML-DSig references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-1 (legacy, only accepted when explicitly allowed).
    #[serde(rename = "SHA1")]
    Sha1,

    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,

    /// SHA-384.
    #[serde(rename = "SHA384")]
    Sha384,

    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl HashAlgorithm {
    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Returns the algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Returns true for digests kept only for interoperability.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Sha1)
    }
}

/// Named elliptic curves supported for ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EllipticCurve {
    /// NIST P-256.
    #[serde(rename = "P-256")]
    P256,

    /// NIST P-384.
    #[serde(rename = "P-384")]
    P384,

    /// NIST P-521.
    #[serde(rename = "P-521")]
    P521,
}

impl EllipticCurve {
    /// Returns the curve name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Returns the size of one coordinate in bytes.
    #[must_use]
    pub const fn coordinate_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Identifies the curve of an uncompressed SEC1 point by its length.
    #[must_use]
    pub fn from_point(point: &[u8]) -> Option<Self> {
        if point.first() != Some(&0x04) {
            return None;
        }
        [Self::P256, Self::P384, Self::P521]
            .into_iter()
            .find(|curve| point.len() == 1 + 2 * curve.coordinate_len())
    }
}

/// The kind of key material an algorithm is verified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFamily {
    /// RSA public key.
    Rsa,
    /// Elliptic curve public key on a specific curve.
    Ec(EllipticCurve),
    /// Shared secret.
    Symmetric,
}

/// Signature algorithms usable for XML-DSig `SignatureMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1 (legacy).
    RsaSha1,
    /// RSA PKCS#1 v1.5 with SHA-256.
    RsaSha256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    RsaSha384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RsaSha512,
    /// ECDSA on P-256 with SHA-256.
    EcdsaSha256,
    /// ECDSA on P-384 with SHA-384.
    EcdsaSha384,
    /// ECDSA on P-521 with SHA-512.
    EcdsaSha512,
    /// HMAC with SHA-1 (legacy).
    HmacSha1,
    /// HMAC with SHA-256.
    HmacSha256,
    /// HMAC with SHA-384.
    HmacSha384,
    /// HMAC with SHA-512.
    HmacSha512,
}

impl SignatureAlgorithm {
    /// Returns the digest algorithm this signature algorithm hashes with.
    #[must_use]
    pub const fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            Self::RsaSha1 | Self::HmacSha1 => HashAlgorithm::Sha1,
            Self::RsaSha256 | Self::EcdsaSha256 | Self::HmacSha256 => HashAlgorithm::Sha256,
            Self::RsaSha384 | Self::EcdsaSha384 | Self::HmacSha384 => HashAlgorithm::Sha384,
            Self::RsaSha512 | Self::EcdsaSha512 | Self::HmacSha512 => HashAlgorithm::Sha512,
        }
    }

    /// Returns the key family able to verify this algorithm.
    ///
    /// ECDSA is bound to the curve matching its digest size; a P-384 key
    /// cannot verify `ecdsa-sha256`.
    #[must_use]
    pub const fn key_family(self) -> KeyFamily {
        match self {
            Self::RsaSha1 | Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512 => KeyFamily::Rsa,
            Self::EcdsaSha256 => KeyFamily::Ec(EllipticCurve::P256),
            Self::EcdsaSha384 => KeyFamily::Ec(EllipticCurve::P384),
            Self::EcdsaSha512 => KeyFamily::Ec(EllipticCurve::P521),
            Self::HmacSha1 | Self::HmacSha256 | Self::HmacSha384 | Self::HmacSha512 => {
                KeyFamily::Symmetric
            }
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        self.hash_algorithm().is_legacy()
    }

    /// Checks whether the algorithm may be used under the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::LegacyDisabled`] for SHA-1 based algorithms
    /// when `allow_legacy` is false.
    pub fn ensure_allowed(self, allow_legacy: bool) -> Result<(), AlgorithmError> {
        if self.is_legacy() && !allow_legacy {
            return Err(AlgorithmError::LegacyDisabled(format!("{self:?}")));
        }
        Ok(())
    }
}
