//! # saml2-cli
//!
//! Command-line access to the SAML 2.0 token pipeline:
//! - `read`: structural read and summary of an assertion
//! - `validate`: signature, issuer, audience and lifetime checks, then claims
//! - `actor`: decoding of serialized actor documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
