//! End-to-end pipeline tests.
//!
//! Assertions are rendered from a template, signed with freshly generated
//! keys and driven through `Saml2TokenHandler`.

mod common;
mod claims;
mod reading;
mod signatures;
mod validation;
