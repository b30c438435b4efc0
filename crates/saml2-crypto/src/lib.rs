//! # saml2-crypto
//!
//! Cryptographic operations for SAML 2.0 signature processing using aws-lc-rs.
//!
//! Covers the digest, RSA PKCS#1 v1.5, ECDSA (P-256, P-384, P-521) and HMAC
//! algorithms referenced by XML-DSig, plus loading verification keys from
//! X.509 certificates and `PUBLIC KEY` PEM blocks.
//!
//! SHA-1 based algorithms are implemented but callers must opt in to
//! accepting them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod keys;
pub mod random;
pub mod signature;

pub use algorithm::{AlgorithmError, EllipticCurve, HashAlgorithm, KeyFamily, SignatureAlgorithm};
pub use hash::{constant_time_eq, hash, hmac, sha1, sha256, sha384, sha512};
pub use keys::{pem_to_der, SigningKeyPair, VerificationKey};
pub use random::random_bytes;
pub use signature::CryptoError;
