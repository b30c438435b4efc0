//! CLI configuration.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use saml2_token::handler::HandlerConfig;
use saml2_token::{SigningKey, ValidationParameters};

/// CLI configuration, read from TOML.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CliConfig {
    /// Token handler settings.
    pub handler: HandlerConfig,

    /// Allowed clock skew for lifetime checks, in seconds.
    pub clock_skew_seconds: i64,

    /// Accepted issuers.
    pub issuers: Vec<String>,

    /// Accepted audiences.
    pub audiences: Vec<String>,

    /// Check the issuer.
    pub validate_issuer: bool,

    /// Check audience restrictions.
    pub validate_audience: bool,

    /// Check `NotBefore` / `NotOnOrAfter`.
    pub validate_lifetime: bool,

    /// Refuse unsigned assertions.
    pub require_signed_tokens: bool,

    /// Accept SHA-1 digests and signatures.
    pub allow_sha1: bool,

    /// Trusted certificates or public keys (PEM files).
    pub key_files: Vec<PathBuf>,

    /// Output format.
    pub output_format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            handler: HandlerConfig::default(),
            clock_skew_seconds: 300,
            issuers: Vec::new(),
            audiences: Vec::new(),
            validate_issuer: true,
            validate_audience: true,
            validate_lifetime: true,
            require_signed_tokens: true,
            allow_sha1: false,
            key_files: Vec::new(),
            output_format: OutputFormat::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `path`, or returns the defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> crate::CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses and checks a TOML document.
    pub fn parse(content: &str) -> crate::CliResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))?;
        config.handler.validate()?;
        if config.clock_skew_seconds < 0 {
            return Err(crate::CliError::Config(
                "clock_skew_seconds must not be negative".to_string(),
            ));
        }
        config.clock_skew()?;
        Ok(config)
    }

    /// Builds validation parameters, loading every configured key file.
    pub fn validation_parameters(&self) -> crate::CliResult<ValidationParameters> {
        let mut params = ValidationParameters {
            valid_issuers: self.issuers.clone(),
            valid_audiences: self.audiences.clone(),
            validate_issuer: self.validate_issuer,
            validate_audience: self.validate_audience,
            validate_lifetime: self.validate_lifetime,
            require_signed_tokens: self.require_signed_tokens,
            allow_sha1: self.allow_sha1,
            clock_skew: self.clock_skew()?,
            ..ValidationParameters::new()
        };
        for path in &self.key_files {
            params.signing_keys.push(load_key_file(path)?);
        }
        Ok(params)
    }

    /// Returns the clock skew as a duration.
    pub fn clock_skew(&self) -> crate::CliResult<Duration> {
        Duration::try_seconds(self.clock_skew_seconds).ok_or_else(|| {
            crate::CliError::Config(format!(
                "clock_skew_seconds {} is out of range",
                self.clock_skew_seconds
            ))
        })
    }
}

/// Loads a trusted key from a PEM file.
///
/// The file name (without extension) becomes the key id, so `ds:KeyName`
/// hints can select it.
pub fn load_key_file(path: &Path) -> crate::CliResult<SigningKey> {
    let pem = std::fs::read_to_string(path)?;
    let key = SigningKey::from_pem(&pem)
        .map_err(|e| crate::CliError::Key(format!("{}: {e}", path.display())))?;
    Ok(match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => key.with_key_id(stem),
        None => key,
    })
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored key/value lines.
    #[default]
    Table,
    /// JSON.
    Json,
}
