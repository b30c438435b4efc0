//! Validation parameters.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::ValidationError;
use crate::signature::SigningKey;
use crate::types::{claim_types, Assertion};

use super::{Clock, SigningKeyResolver, SystemClock};

/// Replaces the default issuer check. Returns the accepted issuer.
pub type IssuerValidator = Arc<
    dyn Fn(&str, &Assertion, &ValidationParameters) -> Result<String, ValidationError>
        + Send
        + Sync,
>;

/// Replaces the default audience check.
pub type AudienceValidator = Arc<
    dyn Fn(&[String], &Assertion, &ValidationParameters) -> Result<(), ValidationError>
        + Send
        + Sync,
>;

/// Replaces the default lifetime check.
pub type LifetimeValidator = Arc<
    dyn Fn(
            Option<DateTime<Utc>>,
            Option<DateTime<Utc>>,
            &Assertion,
            &ValidationParameters,
        ) -> Result<(), ValidationError>
        + Send
        + Sync,
>;

/// Compares a token audience with an accepted audience.
pub type AudienceComparer = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Everything the pipeline needs to decide whether a token is acceptable.
///
/// A parameter bundle is immutable during validation and may be shared
/// across threads.
#[derive(Clone)]
pub struct ValidationParameters {
    /// Keys trusted to sign assertions.
    pub signing_keys: Vec<SigningKey>,
    /// Supplies additional keys per assertion.
    pub key_resolver: Option<Arc<dyn SigningKeyResolver>>,
    /// Replaces [`validate_issuer`](super::validate_issuer).
    pub issuer_validator: Option<IssuerValidator>,
    /// Replaces [`validate_audience`](super::validate_audience).
    pub audience_validator: Option<AudienceValidator>,
    /// Replaces [`validate_lifetime`](super::validate_lifetime).
    pub lifetime_validator: Option<LifetimeValidator>,
    /// Replaces ordinal audience comparison.
    pub audience_comparer: Option<AudienceComparer>,
    /// Accepted issuers.
    pub valid_issuers: Vec<String>,
    /// Accepted audiences.
    pub valid_audiences: Vec<String>,
    /// Check the issuer.
    pub validate_issuer: bool,
    /// Check the audience restrictions.
    pub validate_audience: bool,
    /// Check `NotBefore` / `NotOnOrAfter`.
    pub validate_lifetime: bool,
    /// Reject unsigned assertions.
    pub require_signed_tokens: bool,
    /// Source of the current time.
    pub clock: Arc<dyn Clock>,
    /// Tolerance applied to both lifetime bounds.
    pub clock_skew: Duration,
    /// Accept SHA-1 based signatures.
    pub allow_sha1: bool,
    /// Fail on statement extensions instead of skipping them.
    pub reject_unrecognized_statements: bool,
    /// Authentication type of the produced identity.
    pub authentication_type: Option<String>,
    /// Claim type holding the identity name.
    pub name_claim_type: String,
    /// Claim type holding roles.
    pub role_claim_type: String,
    /// Deepest accepted actor chain.
    pub max_actor_depth: usize,
}

impl ValidationParameters {
    /// Default clock skew.
    pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;

    /// Default maximum actor chain depth.
    pub const DEFAULT_MAX_ACTOR_DEPTH: usize = 10;

    /// Creates parameters with every check enabled and nothing trusted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trusted signing key.
    #[must_use]
    pub fn with_signing_key(mut self, key: SigningKey) -> Self {
        self.signing_keys.push(key);
        self
    }

    /// Adds an accepted issuer.
    #[must_use]
    pub fn with_valid_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.valid_issuers.push(issuer.into());
        self
    }

    /// Adds an accepted audience.
    #[must_use]
    pub fn with_valid_audience(mut self, audience: impl Into<String>) -> Self {
        self.valid_audiences.push(audience.into());
        self
    }

    /// Sets the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the key resolver.
    #[must_use]
    pub fn with_key_resolver(mut self, resolver: impl SigningKeyResolver + 'static) -> Self {
        self.key_resolver = Some(Arc::new(resolver));
        self
    }

    /// Keys to try for `assertion`: the configured keys followed by the
    /// resolver's.
    #[must_use]
    pub fn signing_keys_for(&self, assertion: &Assertion) -> Vec<SigningKey> {
        let mut keys = self.signing_keys.clone();
        if let Some(resolver) = &self.key_resolver {
            keys.extend(resolver.resolve(assertion));
        }
        keys
    }
}

impl Default for ValidationParameters {
    fn default() -> Self {
        Self {
            signing_keys: Vec::new(),
            key_resolver: None,
            issuer_validator: None,
            audience_validator: None,
            lifetime_validator: None,
            audience_comparer: None,
            valid_issuers: Vec::new(),
            valid_audiences: Vec::new(),
            validate_issuer: true,
            validate_audience: true,
            validate_lifetime: true,
            require_signed_tokens: true,
            clock: Arc::new(SystemClock),
            clock_skew: Duration::seconds(Self::DEFAULT_CLOCK_SKEW_SECONDS),
            allow_sha1: false,
            reject_unrecognized_statements: false,
            authentication_type: Some("AuthenticationTypes.Federation".to_string()),
            name_claim_type: claim_types::NAME.to_string(),
            role_claim_type: claim_types::ROLE.to_string(),
            max_actor_depth: Self::DEFAULT_MAX_ACTOR_DEPTH,
        }
    }
}

impl fmt::Debug for ValidationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationParameters")
            .field("signing_keys", &self.signing_keys.len())
            .field("key_resolver", &self.key_resolver.is_some())
            .field("issuer_validator", &self.issuer_validator.is_some())
            .field("audience_validator", &self.audience_validator.is_some())
            .field("lifetime_validator", &self.lifetime_validator.is_some())
            .field("audience_comparer", &self.audience_comparer.is_some())
            .field("valid_issuers", &self.valid_issuers)
            .field("valid_audiences", &self.valid_audiences)
            .field("validate_issuer", &self.validate_issuer)
            .field("validate_audience", &self.validate_audience)
            .field("validate_lifetime", &self.validate_lifetime)
            .field("require_signed_tokens", &self.require_signed_tokens)
            .field("clock_skew", &self.clock_skew)
            .field("allow_sha1", &self.allow_sha1)
            .field(
                "reject_unrecognized_statements",
                &self.reject_unrecognized_statements,
            )
            .field("authentication_type", &self.authentication_type)
            .field("name_claim_type", &self.name_claim_type)
            .field("role_claim_type", &self.role_claim_type)
            .field("max_actor_depth", &self.max_actor_depth)
            .finish_non_exhaustive()
    }
}
