//! Signature verification primitives and the crate error type.

use aws_lc_rs::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use thiserror::Error;

use crate::algorithm::{AlgorithmError, SignatureAlgorithm};
use crate::hash;

/// Error type for cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Verification failed.
    #[error("signature verification failed")]
    Verification,

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// The key cannot be used with the requested algorithm.
    #[error("key type {key} cannot be used with {algorithm:?}")]
    IncompatibleKey {
        /// Description of the key.
        key: String,
        /// The requested algorithm.
        algorithm: SignatureAlgorithm,
    },

    /// Algorithm not supported or not allowed.
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

fn rsa_verification(algorithm: SignatureAlgorithm) -> Option<&'static dyn VerificationAlgorithm> {
    let alg: &'static dyn VerificationAlgorithm = match algorithm {
        SignatureAlgorithm::RsaSha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
        SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
        SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
        SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
        _ => return None,
    };
    Some(alg)
}

fn ecdsa_verification(algorithm: SignatureAlgorithm) -> Option<&'static dyn VerificationAlgorithm> {
    // XML-DSig carries ECDSA signatures as raw r || s, not DER.
    let alg: &'static dyn VerificationAlgorithm = match algorithm {
        SignatureAlgorithm::EcdsaSha256 => &signature::ECDSA_P256_SHA256_FIXED,
        SignatureAlgorithm::EcdsaSha384 => &signature::ECDSA_P384_SHA384_FIXED,
        SignatureAlgorithm::EcdsaSha512 => &signature::ECDSA_P521_SHA512_FIXED,
        _ => return None,
    };
    Some(alg)
}

/// Verifies an RSA PKCS#1 v1.5 signature.
///
/// `public_key_der` is the PKCS#1 `RSAPublicKey` encoding.
///
/// # Errors
///
/// Returns [`CryptoError::IncompatibleKey`] for non-RSA algorithms and
/// [`CryptoError::Verification`] when the signature does not match.
pub fn rsa_verify(
    algorithm: SignatureAlgorithm,
    public_key_der: &[u8],
    data: &[u8],
    sig: &[u8],
) -> Result<(), CryptoError> {
    let alg = rsa_verification(algorithm).ok_or_else(|| CryptoError::IncompatibleKey {
        key: "RSA".to_string(),
        algorithm,
    })?;
    UnparsedPublicKey::new(alg, public_key_der)
        .verify(data, sig)
        .map_err(|_| CryptoError::Verification)
}

/// Verifies an ECDSA signature in fixed-width `r || s` form.
///
/// `point` is the uncompressed SEC1 public point.
///
/// # Errors
///
/// Returns [`CryptoError::IncompatibleKey`] for non-ECDSA algorithms and
/// [`CryptoError::Verification`] when the signature does not match.
pub fn ecdsa_verify(
    algorithm: SignatureAlgorithm,
    point: &[u8],
    data: &[u8],
    sig: &[u8],
) -> Result<(), CryptoError> {
    let alg = ecdsa_verification(algorithm).ok_or_else(|| CryptoError::IncompatibleKey {
        key: "EC".to_string(),
        algorithm,
    })?;
    UnparsedPublicKey::new(alg, point)
        .verify(data, sig)
        .map_err(|_| CryptoError::Verification)
}

/// Verifies an HMAC signature value.
///
/// # Errors
///
/// Returns [`CryptoError::IncompatibleKey`] for non-HMAC algorithms and
/// [`CryptoError::Verification`] when the tag does not match.
pub fn hmac_verify(
    algorithm: SignatureAlgorithm,
    secret: &[u8],
    data: &[u8],
    sig: &[u8],
) -> Result<(), CryptoError> {
    if !matches!(
        algorithm,
        SignatureAlgorithm::HmacSha1
            | SignatureAlgorithm::HmacSha256
            | SignatureAlgorithm::HmacSha384
            | SignatureAlgorithm::HmacSha512
    ) {
        return Err(CryptoError::IncompatibleKey {
            key: "symmetric".to_string(),
            algorithm,
        });
    }
    if hash::hmac_verify(algorithm.hash_algorithm(), secret, data, sig) {
        Ok(())
    } else {
        Err(CryptoError::Verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_error_is_generic() {
        let error = CryptoError::Verification;
        // Don't leak information about why verification failed
        assert_eq!(error.to_string(), "signature verification failed");
    }

    #[test]
    fn hmac_rejects_asymmetric_algorithm() {
        let result = hmac_verify(SignatureAlgorithm::RsaSha256, b"k", b"d", b"s");
        assert!(matches!(result, Err(CryptoError::IncompatibleKey { .. })));
    }

    #[test]
    fn rsa_rejects_ecdsa_algorithm() {
        let result = rsa_verify(SignatureAlgorithm::EcdsaSha256, &[], b"d", b"s");
        assert!(matches!(result, Err(CryptoError::IncompatibleKey { .. })));
    }

    #[test]
    fn garbage_rsa_key_fails_verification() {
        let result = rsa_verify(SignatureAlgorithm::RsaSha256, &[1, 2, 3], b"d", b"s");
        assert!(matches!(result, Err(CryptoError::Verification)));
    }

    #[test]
    fn hmac_detects_tampering() {
        let tag = hash::hmac(crate::HashAlgorithm::Sha256, b"secret", b"data");
        assert!(hmac_verify(SignatureAlgorithm::HmacSha256, b"secret", b"data", &tag).is_ok());
        assert!(matches!(
            hmac_verify(SignatureAlgorithm::HmacSha256, b"secret", b"date", &tag),
            Err(CryptoError::Verification)
        ));
    }
}
