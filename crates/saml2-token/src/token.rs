//! Token handles returned by the handler.

use chrono::{DateTime, Utc};

use crate::claims::ClaimsIdentity;
use crate::signature::SigningKey;
use crate::types::Assertion;

/// A read (not yet validated) SAML2 token.
#[derive(Debug, Clone)]
pub struct Saml2Token {
    assertion: Assertion,
    signing_key: Option<SigningKey>,
}

impl Saml2Token {
    pub(crate) const fn new(assertion: Assertion) -> Self {
        Self {
            assertion,
            signing_key: None,
        }
    }

    pub(crate) fn with_signing_key(mut self, key: Option<SigningKey>) -> Self {
        self.signing_key = key;
        self
    }

    /// Assertion `ID`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.assertion.id()
    }

    /// Issuer value as written in the token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.assertion.issuer().value
    }

    /// Start of the validity window, if constrained.
    #[must_use]
    pub fn valid_from(&self) -> Option<DateTime<Utc>> {
        self.assertion.not_before()
    }

    /// End of the validity window (exclusive), if constrained.
    #[must_use]
    pub fn valid_to(&self) -> Option<DateTime<Utc>> {
        self.assertion.not_on_or_after()
    }

    /// The underlying assertion.
    #[must_use]
    pub const fn assertion(&self) -> &Assertion {
        &self.assertion
    }

    /// Key that verified the signature; `None` until validated or when the
    /// token was accepted unsigned.
    #[must_use]
    pub const fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }
}

/// A token that passed every enabled check, with its identity.
#[derive(Debug, Clone)]
pub struct ValidatedToken {
    token: Saml2Token,
    identity: ClaimsIdentity,
}

impl ValidatedToken {
    pub(crate) const fn new(token: Saml2Token, identity: ClaimsIdentity) -> Self {
        Self { token, identity }
    }

    /// The validated token.
    #[must_use]
    pub const fn token(&self) -> &Saml2Token {
        &self.token
    }

    /// The identity built from the token.
    #[must_use]
    pub const fn identity(&self) -> &ClaimsIdentity {
        &self.identity
    }

    /// Key that verified the signature, if the token was signed.
    #[must_use]
    pub const fn signing_key(&self) -> Option<&SigningKey> {
        self.token.signing_key()
    }

    /// Splits into token and identity.
    #[must_use]
    pub fn into_parts(self) -> (Saml2Token, ClaimsIdentity) {
        (self.token, self.identity)
    }
}
