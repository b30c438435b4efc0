//! `saml2 validate`: the full pipeline.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use tracing::debug;

use saml2_token::{ClaimsIdentity, Saml2TokenHandler, SigningKey, ValidationParameters};

use crate::cli::ValidateArgs;
use crate::config::{load_key_file, CliConfig, OutputFormat};
use crate::output::{self, fields, heading, success};

/// What `validate` reports for an accepted token.
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    /// Assertion `ID`.
    pub id: &'a str,
    /// Issuer value as read.
    pub issuer: &'a str,
    /// Id of the key that verified the signature.
    pub signing_key: Option<String>,
    /// The resulting identity.
    pub identity: &'a ClaimsIdentity,
}

/// Runs the validate command.
pub fn run_validate(
    args: &ValidateArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let raw = std::fs::read_to_string(&args.file)?;
    let params = parameters(args, config)?;
    debug!(
        keys = params.signing_keys.len(),
        issuers = params.valid_issuers.len(),
        audiences = params.valid_audiences.len(),
        "validating token"
    );

    let handler = Saml2TokenHandler::with_config(config.handler)?;
    let validated = handler.validate_token(&raw, &params)?;

    let report = ValidationReport {
        id: validated.token().id(),
        issuer: validated.token().issuer(),
        signing_key: validated.signing_key().map(SigningKey::key_id),
        identity: validated.identity(),
    };
    output::output(&report, format, print_report)
}

/// Merges the command line over the configuration.
fn parameters(args: &ValidateArgs, config: &CliConfig) -> crate::CliResult<ValidationParameters> {
    let mut params = config.validation_parameters()?;
    for path in &args.keys {
        params.signing_keys.push(load_key_file(path)?);
    }
    for secret in &args.secrets {
        let bytes = BASE64
            .decode(secret.trim())
            .map_err(|e| crate::CliError::Key(format!("secret is not base64: {e}")))?;
        params.signing_keys.push(SigningKey::symmetric(bytes));
    }
    params.valid_issuers.extend(args.issuers.iter().cloned());
    params.valid_audiences.extend(args.audiences.iter().cloned());
    params.validate_issuer &= !args.no_issuer;
    params.validate_audience &= !args.no_audience;
    params.validate_lifetime &= !args.no_lifetime;
    Ok(params)
}

fn print_report(report: &ValidationReport<'_>) {
    success(&format!("assertion {} is valid", report.id));
    fields(&[
        ("issuer", report.issuer.to_string()),
        ("signing key", crate::output::optional(report.signing_key.as_deref())),
    ]);
    print_identity(report.identity, 0);
}

/// Prints an identity and its actor chain.
pub fn print_identity(identity: &ClaimsIdentity, depth: usize) {
    let title = if depth == 0 {
        "Claims".to_string()
    } else {
        format!("Actor (depth {depth})")
    };
    heading(&title);
    let rows: Vec<(&str, String)> = identity
        .claims
        .iter()
        .map(|claim| (claim.claim_type.as_str(), claim.value.clone()))
        .collect();
    fields(&rows);
    if let Some(actor) = identity.actor() {
        print_identity(actor, depth + 1);
    }
}
