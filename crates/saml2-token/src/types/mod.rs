//! SAML 2.0 assertion types and constants.
//!
//! The model is read-only: every value here is produced by the reader from
//! an untrusted token and handed to the verifier, validators and claims
//! builder.

mod assertion;
mod constants;
mod name_id;
mod statement;

pub use assertion::*;
pub use constants::*;
pub use name_id::*;
pub use statement::*;
