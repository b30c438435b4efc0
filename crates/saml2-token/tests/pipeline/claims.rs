//! Claims produced by a validated token.

use saml2_token::claims::serialize_actor;
use saml2_token::error::ActorError;
use saml2_token::{
    claim_properties, claim_types, claim_value_types, Claim, ClaimsIdentity, Saml2TokenHandler,
    TokenError,
};

use crate::common::{params, AssertionTemplate, TestKey, ISSUER};

fn actor(name: &str, inner: Option<ClaimsIdentity>) -> ClaimsIdentity {
    let mut identity = ClaimsIdentity::new(None);
    identity.add_claim(Claim::new(claim_types::NAME, name, ISSUER));
    identity.actor = inner.map(Box::new);
    identity
}

/// Tests the claims of the default fixture.
#[test]
fn test_claims_from_signed_token() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let template = AssertionTemplate::default().with_attribute(claim_types::ROLE, &["auditor"]);
    let signed = key.sign(&template.render())?;

    let validated = Saml2TokenHandler::new().validate_token(&signed, &params(&key.trusted))?;
    let identity = validated.identity();

    let name_id = &identity.claims[0];
    assert_eq!(name_id.claim_type, claim_types::NAME_IDENTIFIER);
    assert_eq!(name_id.value, "alice@example.com");
    assert!(name_id
        .properties
        .contains_key(claim_properties::NAME_ID_FORMAT));

    let method = identity.find_first(claim_types::AUTHENTICATION_METHOD);
    assert_eq!(
        method.map(|c| c.value.as_str()),
        Some("urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport")
    );
    let instant = identity
        .find_first(claim_types::AUTHENTICATION_INSTANT)
        .map(|c| (c.value.as_str(), c.value_type.as_str()));
    assert_eq!(
        instant,
        Some(("2024-05-01T09:59:00.000Z", claim_value_types::DATE_TIME))
    );

    // consolidated: the second role attribute joins the first
    assert_eq!(identity.roles(), vec!["admin", "user", "auditor"]);
    assert!(identity.claims.iter().all(|c| c.original_issuer == ISSUER));
    assert!(identity.actor().is_none());
    Ok(())
}

/// Tests that an actor chain carried in a signed token is rebuilt with its
/// nesting.
#[test]
fn test_actor_chain_from_token() -> anyhow::Result<()> {
    let chain = actor("frontend", Some(actor("gateway", None)));
    let raw_actor = serialize_actor(&chain)?;

    let key = TestKey::ec(saml2_crypto::EllipticCurve::P256)?;
    let template = AssertionTemplate::default().with_attribute(claim_types::ACTOR, &[raw_actor.as_str()]);
    let signed = key.sign(&template.render())?;

    let validated = Saml2TokenHandler::new().validate_token(&signed, &params(&key.trusted))?;
    let identity = validated.identity();
    assert_eq!(identity.find_first(claim_types::ACTOR), None);
    assert_eq!(identity.actor_depth(), 2);
    assert_eq!(identity.actor(), Some(&chain));
    Ok(())
}

/// Tests that a second actor attribute fails the whole token.
#[test]
fn test_second_actor_fails() -> anyhow::Result<()> {
    let first = serialize_actor(&actor("a", None))?;
    let second = serialize_actor(&actor("b", None))?;

    let key = TestKey::hmac();
    let template = AssertionTemplate::default()
        .with_attribute(claim_types::ACTOR, &[first.as_str()])
        .with_attribute(claim_types::ACTOR, &[second.as_str()]);
    let signed = key.sign(&template.render())?;

    let err = Saml2TokenHandler::new()
        .validate_token(&signed, &params(&key.trusted))
        .unwrap_err();
    assert_eq!(err, TokenError::Actor(ActorError::MultipleActors));
    assert_eq!(err.code(), "actor.multiple_actors");
    Ok(())
}

/// Tests that the actor depth limit applies to tokens.
#[test]
fn test_actor_depth_limit() -> anyhow::Result<()> {
    let chain = actor("a", Some(actor("b", Some(actor("c", None)))));
    let key = TestKey::hmac();
    let template =
        AssertionTemplate::default().with_attribute(claim_types::ACTOR, &[serialize_actor(&chain)?.as_str()]);
    let signed = key.sign(&template.render())?;

    let shallow = saml2_token::ValidationParameters {
        max_actor_depth: 2,
        ..params(&key.trusted)
    };
    let err = Saml2TokenHandler::new()
        .validate_token(&signed, &shallow)
        .unwrap_err();
    assert_eq!(err, TokenError::Actor(ActorError::DepthExceeded { max_depth: 2 }));
    Ok(())
}

/// Tests that identity settings come from the parameters.
#[test]
fn test_identity_settings_follow_parameters() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let custom = saml2_token::ValidationParameters {
        authentication_type: Some("saml2".to_string()),
        name_claim_type: "email".to_string(),
        ..params(&key.trusted)
    };

    let validated = Saml2TokenHandler::new().validate_token(&signed, &custom)?;
    let identity = validated.identity();
    assert_eq!(identity.authentication_type.as_deref(), Some("saml2"));
    assert_eq!(identity.name(), Some("alice@example.com"));
    assert!(identity.is_authenticated());
    Ok(())
}
