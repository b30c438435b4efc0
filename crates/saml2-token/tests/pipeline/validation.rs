//! Issuer, audience and lifetime checks through the handler.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use saml2_token::error::ValidationError;
use saml2_token::{Assertion, FixedClock, Saml2TokenHandler, TokenError, ValidationParameters};

use crate::common::{now, params, relaxed, AssertionTemplate, TestKey, AUDIENCE, ISSUER};

fn validation_error(result: Result<impl std::fmt::Debug, TokenError>) -> ValidationError {
    match result {
        Err(TokenError::Validation(e)) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

/// Tests that a signed token passes with all semantic checks disabled,
/// whatever its issuer, audience and lifetime say.
#[test]
fn test_all_checks_disabled_yields_identity() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let template = AssertionTemplate {
        issuer: "https://unknown.example.org".to_string(),
        audiences: vec!["https://elsewhere.example.org".to_string()],
        not_before: Some(now() + Duration::days(300)),
        not_on_or_after: Some(now() - Duration::days(300)),
        ..AssertionTemplate::default()
    };
    let signed = key.sign(&template.render())?;

    let validated = Saml2TokenHandler::new().validate_token(&signed, &relaxed(&key.trusted))?;
    assert!(!validated.identity().claims.is_empty());
    assert!(validated
        .identity()
        .claims
        .iter()
        .all(|c| c.issuer == "https://unknown.example.org"));
    Ok(())
}

/// Tests that the audience check needs one accepted audience.
#[test]
fn test_audience_restrictions() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let handler = Saml2TokenHandler::new();

    let several = AssertionTemplate {
        audiences: vec!["https://other.example.org".to_string(), AUDIENCE.to_string()],
        ..AssertionTemplate::default()
    };
    handler.validate_token(&key.sign(&several.render())?, &params(&key.trusted))?;

    let foreign = AssertionTemplate {
        audiences: vec!["https://other.example.org".to_string()],
        ..AssertionTemplate::default()
    };
    let err = validation_error(
        handler.validate_token(&key.sign(&foreign.render())?, &params(&key.trusted)),
    );
    assert_eq!(
        err,
        ValidationError::InvalidAudience {
            audiences: vec!["https://other.example.org".to_string()]
        }
    );

    let none = AssertionTemplate {
        audiences: Vec::new(),
        ..AssertionTemplate::default()
    };
    let err = validation_error(
        handler.validate_token(&key.sign(&none.render())?, &params(&key.trusted)),
    );
    assert!(matches!(err, ValidationError::InvalidAudience { .. }));
    Ok(())
}

/// Tests the lifetime window and clock skew.
#[test]
fn test_lifetime_window() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let handler = Saml2TokenHandler::new();

    // NotOnOrAfter is now + 1h; skew is 5 minutes
    let late = params(&key.trusted).with_clock(FixedClock(now() + Duration::minutes(64)));
    assert!(handler.validate_token(&signed, &late).is_ok());

    let expired = params(&key.trusted).with_clock(FixedClock(now() + Duration::minutes(65)));
    let err = validation_error(handler.validate_token(&signed, &expired));
    assert!(matches!(err, ValidationError::TokenExpired { .. }));
    assert_eq!(
        TokenError::from(err).code(),
        "validation.token_expired"
    );

    // NotBefore is now - 5m
    let early = params(&key.trusted).with_clock(FixedClock(now() - Duration::minutes(11)));
    let err = validation_error(handler.validate_token(&signed, &early));
    assert!(matches!(err, ValidationError::TokenNotYetValid { .. }));
    Ok(())
}

/// Tests that an inverted validity window is always invalid.
#[test]
fn test_inverted_lifetime_is_invalid() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let template = AssertionTemplate {
        not_before: Some(now() + Duration::minutes(1)),
        not_on_or_after: Some(now() - Duration::minutes(1)),
        ..AssertionTemplate::default()
    };
    let signed = key.sign(&template.render())?;
    let err = validation_error(
        Saml2TokenHandler::new().validate_token(&signed, &params(&key.trusted)),
    );
    assert!(matches!(err, ValidationError::InvalidLifetime { .. }));
    Ok(())
}

/// Tests issuer trust, including the case with no trusted issuers.
#[test]
fn test_issuer_trust() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let handler = Saml2TokenHandler::new();

    let no_policy = ValidationParameters {
        valid_issuers: Vec::new(),
        ..params(&key.trusted)
    };
    assert_eq!(
        validation_error(handler.validate_token(&signed, &no_policy)),
        ValidationError::InvalidIssuer {
            issuer: ISSUER.to_string()
        }
    );

    let other = ValidationParameters {
        valid_issuers: vec!["https://idp.example.com/".to_string()],
        ..params(&key.trusted)
    };
    assert!(handler.validate_token(&signed, &other).is_err());
    Ok(())
}

/// Tests that caller-supplied validators replace the defaults.
#[test]
fn test_validator_overrides() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let template = AssertionTemplate {
        audiences: vec!["https://SP.example.com".to_string()],
        ..AssertionTemplate::default()
    };
    let signed = key.sign(&template.render())?;

    let params = ValidationParameters {
        valid_issuers: Vec::new(),
        issuer_validator: Some(Arc::new(
            |issuer: &str,
             _: &Assertion,
             _: &ValidationParameters|
             -> Result<String, ValidationError> { Ok(format!("{issuer}#tenant-a")) },
        )),
        audience_comparer: Some(Arc::new(|a: &str, b: &str| a.eq_ignore_ascii_case(b))),
        ..params(&key.trusted)
    };
    let validated = Saml2TokenHandler::new().validate_token(&signed, &params)?;
    assert!(validated
        .identity()
        .claims
        .iter()
        .all(|c| c.issuer == "https://idp.example.com#tenant-a"));

    let params = ValidationParameters {
        lifetime_validator: Some(Arc::new(
            |_: Option<DateTime<Utc>>,
             _: Option<DateTime<Utc>>,
             _: &Assertion,
             _: &ValidationParameters|
             -> Result<(), ValidationError> {
                Err(ValidationError::InvalidLifetime {
                    not_before: now(),
                    not_on_or_after: now(),
                })
            },
        )),
        ..params
    };
    assert!(Saml2TokenHandler::new()
        .validate_token(&signed, &params)
        .is_err());
    Ok(())
}

/// Tests that lifetime is checked before audience and issuer.
#[test]
fn test_check_order() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let template = AssertionTemplate {
        issuer: "https://unknown.example.org".to_string(),
        audiences: vec!["https://elsewhere.example.org".to_string()],
        not_before: None,
        not_on_or_after: Some(now() - Duration::hours(1)),
        ..AssertionTemplate::default()
    };
    let signed = key.sign(&template.render())?;
    let handler = Saml2TokenHandler::new();

    let err = validation_error(handler.validate_token(&signed, &params(&key.trusted)));
    assert!(matches!(err, ValidationError::TokenExpired { .. }));

    let no_lifetime = ValidationParameters {
        validate_lifetime: false,
        ..params(&key.trusted)
    };
    let err = validation_error(handler.validate_token(&signed, &no_lifetime));
    assert!(matches!(err, ValidationError::InvalidAudience { .. }));
    Ok(())
}

/// Tests that one parameter bundle and handler serve several threads.
#[test]
fn test_shared_across_threads() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let handler = Saml2TokenHandler::new();
    let params = params(&key.trusted);

    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| handler.validate_token(&signed, &params).is_ok()))
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap());
        }
    });
    Ok(())
}
