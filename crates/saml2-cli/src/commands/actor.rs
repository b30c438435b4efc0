//! `saml2 actor`: decode a serialized actor.

use std::path::Path;

use saml2_token::claims::deserialize_actor;
use saml2_token::ValidationParameters;

use crate::commands::validate::print_identity;
use crate::config::OutputFormat;
use crate::output;

/// Runs the actor command.
pub fn run_actor(file: &Path, issuer: &str, format: OutputFormat) -> crate::CliResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let max_depth = ValidationParameters::new().max_actor_depth;
    let identity = deserialize_actor(raw.trim(), issuer, max_depth)?;
    output::output(&identity, format, |identity| print_identity(identity, 1))
}
