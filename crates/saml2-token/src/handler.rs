//! Token handler: the full validation pipeline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::claims::{build_identity, ClaimsIdentity};
use crate::error::{ArgumentError, TokenError, TokenResult};
use crate::reader;
use crate::signature::{verify_signature, VerifyOptions};
use crate::token::{Saml2Token, ValidatedToken};
use crate::validation::{self, ValidationParameters};

/// Handler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Largest accepted token, in bytes.
    pub maximum_token_size: usize,
}

impl HandlerConfig {
    /// Default maximum token size (256 KiB).
    pub const DEFAULT_MAXIMUM_TOKEN_SIZE: usize = 256 * 1024;

    /// Checks the configuration.
    pub const fn validate(&self) -> Result<(), ArgumentError> {
        if self.maximum_token_size == 0 {
            return Err(ArgumentError::OutOfRange {
                name: "maximum_token_size",
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            maximum_token_size: Self::DEFAULT_MAXIMUM_TOKEN_SIZE,
        }
    }
}

/// Reads and validates SAML2 assertions.
///
/// The handler only holds its configuration. Each call works on a copy of
/// it, so a shared handler can be reconfigured between calls.
#[derive(Debug, Clone, Default)]
pub struct Saml2TokenHandler {
    config: HandlerConfig,
}

impl Saml2TokenHandler {
    /// Creates a handler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handler with `config`.
    pub fn with_config(config: HandlerConfig) -> Result<Self, ArgumentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Returns the maximum token size in bytes.
    #[must_use]
    pub const fn maximum_token_size(&self) -> usize {
        self.config.maximum_token_size
    }

    /// Sets the maximum token size in bytes.
    pub fn set_maximum_token_size(&mut self, size: usize) -> Result<(), ArgumentError> {
        let config = HandlerConfig {
            maximum_token_size: size,
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// True if `raw` looks like a SAML2 assertion this handler would read.
    #[must_use]
    pub fn can_read_token(&self, raw: &str) -> bool {
        reader::can_read(raw, self.config.maximum_token_size)
    }

    /// Reads `raw` without verifying or validating it.
    pub fn read_token(&self, raw: &str) -> TokenResult<Saml2Token> {
        reader::read_assertion(raw, self.config.maximum_token_size).map(Saml2Token::new)
    }

    /// Runs the whole pipeline: read, signature, lifetime, audience, issuer,
    /// claims. Stops at the first failure.
    pub fn validate_token(
        &self,
        raw: &str,
        params: &ValidationParameters,
    ) -> TokenResult<ValidatedToken> {
        let config = self.config;
        let token = reader::read_assertion(raw, config.maximum_token_size)
            .map(Saml2Token::new)
            .map_err(|e| {
                debug!(code = %e.code(), "token could not be read");
                e
            })?;

        let signing_key = if token.assertion().is_signed() || params.require_signed_tokens {
            let keys = params.signing_keys_for(token.assertion());
            let options = VerifyOptions {
                allow_sha1: params.allow_sha1,
            };
            let key = verify_signature(token.assertion(), &keys, options)
                .map_err(|e| rejected(&token, e.into()))?;
            debug!(assertion_id = token.id(), key_id = %key.key_id(), "signature verified");
            Some(key)
        } else {
            debug!(assertion_id = token.id(), "accepting unsigned assertion");
            None
        };
        let token = token.with_signing_key(signing_key);

        let issuer = validate_semantics(&token, params).map_err(|e| rejected(&token, e))?;
        let identity = self.create_claims(&token, &issuer, params)?;
        debug!(
            assertion_id = token.id(),
            claims = identity.claims.len(),
            "token validated"
        );
        Ok(ValidatedToken::new(token, identity))
    }

    /// Builds the identity of a token whose issuer has been accepted.
    #[allow(clippy::unused_self)]
    pub fn create_claims(
        &self,
        token: &Saml2Token,
        issuer: &str,
        params: &ValidationParameters,
    ) -> TokenResult<ClaimsIdentity> {
        build_identity(token.assertion(), issuer, params).map_err(|e| rejected(token, e))
    }
}

fn validate_semantics(token: &Saml2Token, params: &ValidationParameters) -> TokenResult<String> {
    let assertion = token.assertion();
    validation::check_lifetime(assertion, params)?;
    validation::check_audience(assertion, params)?;
    Ok(validation::check_issuer(assertion, params)?)
}

fn rejected(token: &Saml2Token, error: TokenError) -> TokenError {
    warn!(
        assertion_id = token.id(),
        stage = error.stage(),
        code = %error.code(),
        "token rejected"
    );
    error
}
