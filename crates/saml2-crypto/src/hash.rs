//! Digest and HMAC functions.
//!
//! SHA-1 is exposed because SAML deployments still sign with it; callers
//! decide whether to accept it (see [`SignatureAlgorithm::ensure_allowed`]).
//!
//! [`SignatureAlgorithm::ensure_allowed`]: crate::algorithm::SignatureAlgorithm::ensure_allowed

use aws_lc_rs::{constant_time, digest, hmac};

use crate::algorithm::HashAlgorithm;

fn digest_algorithm(algorithm: HashAlgorithm) -> &'static digest::Algorithm {
    match algorithm {
        HashAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::Sha256 => &digest::SHA256,
        HashAlgorithm::Sha384 => &digest::SHA384,
        HashAlgorithm::Sha512 => &digest::SHA512,
    }
}

fn hmac_algorithm(algorithm: HashAlgorithm) -> hmac::Algorithm {
    match algorithm {
        HashAlgorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::Sha256 => hmac::HMAC_SHA256,
        HashAlgorithm::Sha384 => hmac::HMAC_SHA384,
        HashAlgorithm::Sha512 => hmac::HMAC_SHA512,
    }
}

/// Computes a hash of the input data.
#[must_use]
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    digest::digest(digest_algorithm(algorithm), data).as_ref().to_vec()
}

/// Computes a SHA-1 hash of the input data.
#[must_use]
pub fn sha1(data: &[u8]) -> Vec<u8> {
    hash(HashAlgorithm::Sha1, data)
}

/// Computes a SHA-256 hash of the input data.
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    hash(HashAlgorithm::Sha256, data)
}

/// Computes a SHA-384 hash of the input data.
#[must_use]
pub fn sha384(data: &[u8]) -> Vec<u8> {
    hash(HashAlgorithm::Sha384, data)
}

/// Computes a SHA-512 hash of the input data.
#[must_use]
pub fn sha512(data: &[u8]) -> Vec<u8> {
    hash(HashAlgorithm::Sha512, data)
}

/// Computes an HMAC tag over `data` with `secret`.
#[must_use]
pub fn hmac(algorithm: HashAlgorithm, secret: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac_algorithm(algorithm), secret);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Verifies an HMAC tag in constant time.
#[must_use]
pub fn hmac_verify(algorithm: HashAlgorithm, secret: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let key = hmac::Key::new(hmac_algorithm(algorithm), secret);
    hmac::verify(&key, data, tag).is_ok()
}

/// Compares two byte strings without leaking where they differ.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    constant_time::verify_slices_are_equal(a, b).is_ok()
}
