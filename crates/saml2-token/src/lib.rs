//! SAML 2.0 assertion validation.
//!
//! This crate turns an untrusted SAML2 assertion into a verified set of
//! identity claims:
//!
//! - **Reading** - strict structural parsing with one error code per defect
//! - **XML signature** - canonicalization, digest and signature checks with
//!   key selection from key-info hints
//! - **Validation** - issuer, audience and lifetime checks, each optional
//!   and replaceable
//! - **Claims** - attribute consolidation, claims mapping and actor
//!   (delegation) chains
//!
//! # Architecture
//!
//! - [`xml`] - strict parsing and canonicalization
//! - [`types`] - the read-only assertion model
//! - [`reader`] - the structural reader
//! - [`signature`] - signature verification and signing
//! - [`validation`] - validation parameters and the semantic checks
//! - [`claims`] - consolidation, claims and actors
//! - [`handler`] - the pipeline tying it together
//! - [`error`] - error types with stable codes
//!
//! # Example
//!
//! ```rust,ignore
//! use saml2_token::{Saml2TokenHandler, SigningKey, ValidationParameters};
//!
//! let params = ValidationParameters::new()
//!     .with_signing_key(SigningKey::from_pem(&idp_certificate)?)
//!     .with_valid_issuer("https://idp.example.com")
//!     .with_valid_audience("https://sp.example.com");
//!
//! let validated = Saml2TokenHandler::new().validate_token(&raw, &params)?;
//! println!("{:?}", validated.identity().name());
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod error;
pub mod handler;
pub mod reader;
pub mod signature;
pub mod token;
pub mod types;
pub mod validation;
pub mod xml;

pub use claims::{Claim, ClaimsIdentity};
pub use error::{TokenError, TokenResult};
pub use handler::{HandlerConfig, Saml2TokenHandler};
pub use signature::{AssertionSigner, SignerOptions, SigningKey};
pub use token::{Saml2Token, ValidatedToken};
pub use types::*;
pub use validation::{Clock, FixedClock, SigningKeyResolver, SystemClock, ValidationParameters};
