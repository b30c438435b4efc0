//! Signature verification through the handler.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use saml2_crypto::{EllipticCurve, HashAlgorithm, SignatureAlgorithm};
use saml2_token::error::SignatureError;
use saml2_token::{Assertion, Saml2TokenHandler, SignerOptions, SigningKey, TokenError};

use crate::common::{flip_signature_value, params, relaxed, AssertionTemplate, TestKey};

fn signature_error(result: Result<impl std::fmt::Debug, TokenError>) -> SignatureError {
    match result {
        Err(TokenError::Signature(e)) => e,
        other => panic!("expected a signature error, got {other:?}"),
    }
}

/// Tests that assertions signed with every key family validate.
#[test]
fn test_every_key_family_validates() -> anyhow::Result<()> {
    let keys = [
        TestKey::hmac(),
        TestKey::ec(EllipticCurve::P256)?,
        TestKey::ec(EllipticCurve::P384)?,
        TestKey::ec(EllipticCurve::P521)?,
        TestKey::rsa()?,
    ];
    let xml = AssertionTemplate::default().render();
    let handler = Saml2TokenHandler::new();

    for key in &keys {
        let signed = key.sign(&xml)?;
        let validated = handler.validate_token(&signed, &params(&key.trusted))?;
        assert_eq!(validated.signing_key(), Some(&key.trusted));
        assert!(validated.token().assertion().is_signed());
    }
    Ok(())
}

/// Tests that altering one byte of an attribute value after signing is
/// detected as a digest mismatch.
#[test]
fn test_altered_content_is_digest_tampered() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let tampered = signed.replacen(">admin<", ">admim<", 1);
    assert_ne!(signed, tampered);

    let err = signature_error(
        Saml2TokenHandler::new().validate_token(&tampered, &relaxed(&key.trusted)),
    );
    assert_eq!(err, SignatureError::DigestTampered);
    assert!(err.is_invalid_signature());
    Ok(())
}

/// Tests that altering only the signature value is a signature mismatch,
/// not a digest mismatch.
#[test]
fn test_altered_signature_value_is_signature_tampered() -> anyhow::Result<()> {
    for key in [TestKey::hmac(), TestKey::ec(EllipticCurve::P256)?] {
        let signed = key.sign(&AssertionTemplate::default().render())?;
        let tampered = flip_signature_value(&signed);

        let err = signature_error(
            Saml2TokenHandler::new().validate_token(&tampered, &relaxed(&key.trusted)),
        );
        assert_eq!(err, SignatureError::SignatureTampered);
        assert!(err.is_invalid_signature());
    }
    Ok(())
}

/// Tests that whitespace between attributes does not matter while
/// whitespace text in the signed content does.
#[test]
fn test_whitespace_inside_tags_and_between_elements() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let signed = key.sign(&AssertionTemplate::default().render())?;
    let handler = Saml2TokenHandler::new();

    let spaced = signed.replacen(r#" Version="2.0""#, "\n    Version=\"2.0\"  ", 1);
    assert!(handler.validate_token(&spaced, &relaxed(&key.trusted)).is_ok());

    let text_added = signed.replacen("</saml:Subject>", "</saml:Subject>\n", 1);
    assert_eq!(
        signature_error(handler.validate_token(&text_added, &relaxed(&key.trusted))),
        SignatureError::DigestTampered
    );
    Ok(())
}

/// Tests that unsigned tokens are refused unless signatures are optional.
#[test]
fn test_unsigned_tokens() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let xml = AssertionTemplate::default().render();
    let handler = Saml2TokenHandler::new();

    let err = signature_error(handler.validate_token(&xml, &params(&key.trusted)));
    assert_eq!(err, SignatureError::Unsigned);

    let optional = saml2_token::ValidationParameters {
        require_signed_tokens: false,
        ..params(&key.trusted)
    };
    let validated = handler.validate_token(&xml, &optional)?;
    assert!(validated.signing_key().is_none());

    // a present signature is still checked
    let tampered = flip_signature_value(&key.sign(&xml)?);
    assert!(handler.validate_token(&tampered, &optional).is_err());
    Ok(())
}

/// Tests that a key-info hint matching no configured key yields
/// `KeyNotFound` when the configured keys fail.
#[test]
fn test_unmatched_key_hint_is_key_not_found() -> anyhow::Result<()> {
    let signer = TestKey::ec(EllipticCurve::P256)?;
    let other = TestKey::ec(EllipticCurve::P256)?;
    let xml = AssertionTemplate::default().render();
    let handler = Saml2TokenHandler::new();

    let hinted = signer.sign_with(
        &xml,
        SignerOptions {
            key_name: Some("rotated-2024".to_string()),
            ..SignerOptions::default()
        },
    )?;
    let err = signature_error(handler.validate_token(&hinted, &relaxed(&other.trusted)));
    assert!(matches!(err, SignatureError::KeyNotFound { .. }));
    assert!(!err.is_invalid_signature());

    // the right key verifies even when the hint names nothing configured
    assert!(handler
        .validate_token(&hinted, &relaxed(&signer.trusted))
        .is_ok());

    // a matching hint is preferred over other keys
    let named = signer.trusted.clone().with_key_id("rotated-2024");
    let both = relaxed(&other.trusted).with_signing_key(named.clone());
    let validated = handler.validate_token(&hinted, &both)?;
    assert_eq!(validated.signing_key(), Some(&named));
    Ok(())
}

/// Tests that keys of the wrong family are never candidates.
#[test]
fn test_incompatible_key_is_key_not_found() -> anyhow::Result<()> {
    let signer = TestKey::ec(EllipticCurve::P384)?;
    let signed = signer.sign(&AssertionTemplate::default().render())?;

    let err = signature_error(
        Saml2TokenHandler::new().validate_token(&signed, &relaxed(&SigningKey::symmetric(*b"secret-secret-secret"))),
    );
    assert!(matches!(err, SignatureError::KeyNotFound { .. }));

    let p256 = TestKey::ec(EllipticCurve::P256)?;
    let err = signature_error(
        Saml2TokenHandler::new().validate_token(&signed, &relaxed(&p256.trusted)),
    );
    assert!(matches!(err, SignatureError::KeyNotFound { .. }));
    Ok(())
}

/// Tests that SHA-1 digests and signatures require an explicit opt-in.
#[test]
fn test_sha1_requires_opt_in() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let xml = AssertionTemplate::default().render();
    let handler = Saml2TokenHandler::new();

    for options in [
        SignerOptions {
            digest: HashAlgorithm::Sha1,
            ..SignerOptions::default()
        },
        SignerOptions {
            algorithm: Some(SignatureAlgorithm::HmacSha1),
            ..SignerOptions::default()
        },
    ] {
        let signed = key.sign_with(&xml, options)?;
        let err = signature_error(handler.validate_token(&signed, &relaxed(&key.trusted)));
        assert!(matches!(err, SignatureError::UnsupportedAlgorithm(_)));

        let legacy = saml2_token::ValidationParameters {
            allow_sha1: true,
            ..relaxed(&key.trusted)
        };
        assert!(handler.validate_token(&signed, &legacy).is_ok());
    }
    Ok(())
}

/// Tests that keys from a resolver are used.
#[test]
fn test_key_resolver_supplies_keys() -> anyhow::Result<()> {
    let key = TestKey::ec(EllipticCurve::P521)?;
    let signed = key.sign(&AssertionTemplate::default().render())?;

    let trusted = key.trusted.clone();
    let params = saml2_token::ValidationParameters {
        validate_issuer: false,
        validate_audience: false,
        validate_lifetime: false,
        ..saml2_token::ValidationParameters::new()
    }
    .with_key_resolver(move |assertion: &Assertion| {
        if assertion.issuer().value == crate::common::ISSUER {
            vec![trusted.clone()]
        } else {
            Vec::new()
        }
    });

    let validated = Saml2TokenHandler::new().validate_token(&signed, &params)?;
    assert_eq!(validated.signing_key(), Some(&key.trusted));
    Ok(())
}

const KAT_SECRET: &[u8] = b"known-answer-secret-0123456789abcdef";

/// The assertion below, written out in exclusive canonical form with the
/// signature removed.
const KAT_ASSERTION_C14N: &str = concat!(
    r#"<Assertion xmlns="urn:oasis:names:tc:SAML:2.0:assertion" ID="_kat" IssueInstant="2024-05-01T10:00:00Z" Version="2.0">"#,
    "<Issuer>https://idp.example.com</Issuer>",
    "<Subject><NameID>alice@example.com</NameID></Subject>",
    "</Assertion>"
);

/// `SignedInfo` in exclusive canonical form; `{digest}` is filled in.
const KAT_SIGNED_INFO_C14N: &str = concat!(
    r#"<SignedInfo xmlns="http://www.w3.org/2000/09/xmldsig#">"#,
    r#"<CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"></CanonicalizationMethod>"#,
    r#"<SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#hmac-sha256"></SignatureMethod>"#,
    r##"<Reference URI="#_kat"><Transforms>"##,
    r#"<Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"></Transform>"#,
    r#"<Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"></Transform>"#,
    "</Transforms>",
    r#"<DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"></DigestMethod>"#,
    "<DigestValue>{digest}</DigestValue></Reference></SignedInfo>"
);

/// Renders the default-namespace signature layout used by Azure AD and
/// ADFS, with digest and signature value computed over the hand-written
/// canonical forms above.
fn known_answer_assertion() -> String {
    let digest = STANDARD.encode(saml2_crypto::sha256(KAT_ASSERTION_C14N.as_bytes()));
    let signed_info = KAT_SIGNED_INFO_C14N.replace("{digest}", &digest);
    let value = STANDARD.encode(saml2_crypto::hmac(
        HashAlgorithm::Sha256,
        KAT_SECRET,
        signed_info.as_bytes(),
    ));
    format!(
        concat!(
            r#"<Assertion Version="2.0" IssueInstant="2024-05-01T10:00:00Z" ID="_kat" "#,
            r#"xmlns="urn:oasis:names:tc:SAML:2.0:assertion">"#,
            "<Issuer>https://idp.example.com</Issuer>",
            r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo>"#,
            r#"<CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
            r#"<SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#hmac-sha256"/>"#,
            r##"<Reference URI="#_kat"><Transforms>"##,
            r#"<Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/>"#,
            r#"<Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
            "</Transforms>",
            r#"<DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>"#,
            "<DigestValue>{digest}</DigestValue></Reference></SignedInfo>",
            "<SignatureValue>{value}</SignatureValue>",
            "<KeyInfo><KeyName>kat</KeyName></KeyInfo></Signature>",
            "<Subject><NameID>alice@example.com</NameID></Subject>",
            "</Assertion>"
        ),
        digest = digest,
        value = value,
    )
}

/// Tests that a default-namespace `Signature` verifies against digests and
/// signature values computed over independently written canonical forms.
#[test]
fn test_default_namespace_signature_known_answer() -> anyhow::Result<()> {
    let xml = known_answer_assertion();
    let key = SigningKey::symmetric(KAT_SECRET).with_key_id("kat");
    let validated = Saml2TokenHandler::new().validate_token(&xml, &relaxed(&key))?;
    assert_eq!(validated.signing_key(), Some(&key));
    Ok(())
}

/// Tests that the known-answer assertion is still checked: one altered
/// character fails the digest.
#[test]
fn test_default_namespace_signature_detects_tampering() {
    let tampered = known_answer_assertion().replacen(
        "<NameID>alice@example.com</NameID>",
        "<NameID>alice@example.org</NameID>",
        1,
    );
    let key = SigningKey::symmetric(KAT_SECRET);
    let err = signature_error(Saml2TokenHandler::new().validate_token(&tampered, &relaxed(&key)));
    assert_eq!(err, SignatureError::DigestTampered);
}
