//! Semantic validation.
//!
//! The issuer, audience and lifetime checks are independent of each other
//! and of the signature. Each one can be disabled through
//! [`ValidationParameters`] or replaced entirely by a caller-supplied
//! closure.

mod parameters;

pub use parameters::{
    AudienceComparer, AudienceValidator, IssuerValidator, LifetimeValidator, ValidationParameters,
};

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::signature::SigningKey;
use crate::types::Assertion;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Supplies signing keys for an assertion, typically from its key-info
/// hints or issuer metadata.
pub trait SigningKeyResolver: Send + Sync {
    /// Returns candidate keys for `assertion`.
    fn resolve(&self, assertion: &Assertion) -> Vec<SigningKey>;
}

impl<F> SigningKeyResolver for F
where
    F: Fn(&Assertion) -> Vec<SigningKey> + Send + Sync,
{
    fn resolve(&self, assertion: &Assertion) -> Vec<SigningKey> {
        self(assertion)
    }
}

/// Default issuer check.
///
/// Disabled: the issuer is returned unchecked. Enabled: the issuer must be
/// non-empty and ordinally equal to one of the accepted issuers.
pub fn validate_issuer(issuer: &str, params: &ValidationParameters) -> Result<String, ValidationError> {
    if !params.validate_issuer {
        return Ok(issuer.to_string());
    }
    if !issuer.is_empty() && params.valid_issuers.iter().any(|valid| valid == issuer) {
        return Ok(issuer.to_string());
    }
    Err(ValidationError::InvalidIssuer {
        issuer: issuer.to_string(),
    })
}

/// Default audience check.
///
/// Enabled: succeeds if any token audience matches any accepted audience,
/// ordinally or with the configured comparer.
pub fn validate_audience(audiences: &[String], params: &ValidationParameters) -> Result<(), ValidationError> {
    if !params.validate_audience {
        return Ok(());
    }
    let matches = |audience: &str, valid: &str| match &params.audience_comparer {
        Some(compare) => compare(audience, valid),
        None => audience == valid,
    };
    let accepted = audiences.iter().any(|audience| {
        params
            .valid_audiences
            .iter()
            .any(|valid| matches(audience, valid))
    });
    if accepted {
        Ok(())
    } else {
        Err(ValidationError::InvalidAudience {
            audiences: audiences.to_vec(),
        })
    }
}

/// Default lifetime check.
///
/// Missing bounds are unconstrained. Both bounds are widened by the clock
/// skew; a window whose start lies after its end is always invalid. A skew
/// too large to apply to the current time leaves the bound unconstrained.
pub fn validate_lifetime(
    not_before: Option<DateTime<Utc>>,
    not_on_or_after: Option<DateTime<Utc>>,
    params: &ValidationParameters,
) -> Result<(), ValidationError> {
    if !params.validate_lifetime {
        return Ok(());
    }
    if let (Some(not_before), Some(not_on_or_after)) = (not_before, not_on_or_after) {
        if not_before > not_on_or_after {
            return Err(ValidationError::InvalidLifetime {
                not_before,
                not_on_or_after,
            });
        }
    }

    let now = params.clock.now();
    if let Some(not_before) = not_before {
        let latest = now.checked_add_signed(params.clock_skew);
        if latest.is_some_and(|latest| latest < not_before) {
            return Err(ValidationError::TokenNotYetValid { not_before, now });
        }
    }
    if let Some(not_on_or_after) = not_on_or_after {
        let earliest = now.checked_sub_signed(params.clock_skew);
        if earliest.is_some_and(|earliest| earliest >= not_on_or_after) {
            return Err(ValidationError::TokenExpired {
                not_on_or_after,
                now,
            });
        }
    }
    Ok(())
}

/// Runs the issuer check, honoring an override.
pub(crate) fn check_issuer(
    assertion: &Assertion,
    params: &ValidationParameters,
) -> Result<String, ValidationError> {
    let issuer = &assertion.issuer().value;
    match &params.issuer_validator {
        Some(validator) => validator(issuer, assertion, params),
        None => validate_issuer(issuer, params),
    }
}

/// Runs the audience check, honoring an override.
pub(crate) fn check_audience(
    assertion: &Assertion,
    params: &ValidationParameters,
) -> Result<(), ValidationError> {
    let audiences = assertion.audiences();
    match &params.audience_validator {
        Some(validator) => validator(&audiences, assertion, params),
        None => validate_audience(&audiences, params),
    }
}

/// Runs the lifetime check, honoring an override.
pub(crate) fn check_lifetime(
    assertion: &Assertion,
    params: &ValidationParameters,
) -> Result<(), ValidationError> {
    let (not_before, not_on_or_after) = (assertion.not_before(), assertion.not_on_or_after());
    match &params.lifetime_validator {
        Some(validator) => validator(not_before, not_on_or_after, assertion, params),
        None => validate_lifetime(not_before, not_on_or_after, params),
    }
}
