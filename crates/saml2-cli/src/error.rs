//! CLI error types.

use thiserror::Error;

use saml2_token::error::{ActorError, ArgumentError};
use saml2_token::TokenError;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A trusted key could not be loaded.
    #[error("key error: {0}")]
    Key(String),

    /// The token pipeline refused the input.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// An actor document could not be decoded.
    #[error("actor could not be decoded: {0}")]
    Actor(#[from] ActorError),

    /// Invalid handler setting.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Returns the stable error code printed on failure.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Config(_) => "cli.config".to_string(),
            Self::Key(_) => "cli.key".to_string(),
            Self::Token(e) => e.code(),
            Self::Actor(e) => format!("actor.{}", e.code()),
            Self::Argument(e) => format!("argument.{}", e.code()),
            Self::Io(_) => "cli.io".to_string(),
            Self::Json(_) => "cli.json".to_string(),
        }
    }
}

impl From<saml2_crypto::CryptoError> for CliError {
    fn from(e: saml2_crypto::CryptoError) -> Self {
        Self::Key(e.to_string())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
