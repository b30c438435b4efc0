//! Structural reading through the handler.

use std::error::Error as _;

use saml2_token::error::{ArgumentError, ReadError, RequiredField, ValueError};
use saml2_token::{Saml2TokenHandler, TokenError};

use crate::common::{AssertionTemplate, TestKey, ISSUER};

/// Tests that an oversize token fails before any parsing is attempted.
#[test]
fn test_oversize_token_fails_before_parsing() -> anyhow::Result<()> {
    let mut handler = Saml2TokenHandler::new();
    handler.set_maximum_token_size(64)?;

    let garbage = "<".repeat(66);
    let err = handler.read_token(&garbage).unwrap_err();
    assert_eq!(
        err,
        TokenError::Read(ReadError::SizeExceeded {
            size: 66,
            maximum: 64
        })
    );
    assert_eq!(err.code(), "read.size_exceeded");
    Ok(())
}

/// Tests that a token exactly at the size limit is read.
#[test]
fn test_token_at_size_limit_is_read() -> anyhow::Result<()> {
    let xml = AssertionTemplate::default().render();
    let mut handler = Saml2TokenHandler::new();
    handler.set_maximum_token_size(xml.len())?;
    assert!(handler.read_token(&xml).is_ok());

    handler.set_maximum_token_size(xml.len() - 1)?;
    assert!(handler.read_token(&xml).is_err());
    Ok(())
}

/// Tests that each missing root field has its own code.
#[test]
fn test_missing_root_fields() -> anyhow::Result<()> {
    let xml = AssertionTemplate::default().render();
    let handler = Saml2TokenHandler::new();

    let cases = [
        (xml.replace(r#" Version="2.0""#, ""), RequiredField::Version),
        (
            xml.replace(r#" ID="_a75adf55-01d7-40cc-929f-dbd8372ebdfc""#, ""),
            RequiredField::Id,
        ),
        (
            xml.replace(r#" IssueInstant="2024-05-01T09:59:00Z""#, ""),
            RequiredField::IssueInstant,
        ),
        (
            xml.replace(&format!("<saml:Issuer>{ISSUER}</saml:Issuer>"), ""),
            RequiredField::Issuer,
        ),
    ];
    for (raw, field) in cases {
        let err = handler.read_token(&raw).unwrap_err();
        assert_eq!(err, TokenError::Read(ReadError::MissingRequiredField(field)));
        assert!(err.code().starts_with("read.missing_required_field."));
    }
    Ok(())
}

/// Tests that an unparsable issue instant is a malformed value, not a
/// missing field, and keeps the parse error as its source.
#[test]
fn test_malformed_issue_instant_keeps_cause() -> anyhow::Result<()> {
    let raw = AssertionTemplate::default()
        .render()
        .replace("2024-05-01T09:59:00Z", "yesterday");
    let err = Saml2TokenHandler::new().read_token(&raw).unwrap_err();

    let TokenError::Read(read) = &err else {
        anyhow::bail!("unexpected error {err:?}");
    };
    assert!(matches!(
        read,
        ReadError::MalformedValue {
            field: "IssueInstant",
            source: ValueError::DateTime(_)
        }
    ));
    assert!(read.source().is_some());
    Ok(())
}

/// Tests that an assertion with neither subject nor statements is refused.
#[test]
fn test_no_subject_no_statements() -> anyhow::Result<()> {
    let key = TestKey::hmac();
    let raw = key.sign(&AssertionTemplate::empty().render())?;
    let err = Saml2TokenHandler::new()
        .validate_token(&raw, &crate::common::relaxed(&key.trusted))
        .unwrap_err();
    assert_eq!(err, TokenError::Read(ReadError::NoSubjectNoStatements));
    Ok(())
}

/// Tests that `can_read_token` only accepts SAML 2.0 assertions.
#[test]
fn test_can_read_token() -> anyhow::Result<()> {
    let mut handler = Saml2TokenHandler::new();
    let xml = AssertionTemplate::default().render();
    assert!(handler.can_read_token(&xml));

    assert!(!handler.can_read_token(""));
    assert!(!handler.can_read_token("definitely not xml"));
    assert!(!handler.can_read_token(
        r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion" MajorVersion="1" MinorVersion="1"/>"#
    ));

    handler.set_maximum_token_size(xml.len() - 1)?;
    assert!(!handler.can_read_token(&xml));
    Ok(())
}

/// Tests that empty input violates the argument contract.
#[test]
fn test_empty_token_is_an_argument_error() -> anyhow::Result<()> {
    let err = Saml2TokenHandler::new().read_token("").unwrap_err();
    assert_eq!(err, TokenError::Argument(ArgumentError::NullOrEmpty("token")));
    assert_eq!(err.stage(), "argument");
    Ok(())
}

/// Tests that the read model exposes the rendered content.
#[test]
fn test_read_token_exposes_assertion() -> anyhow::Result<()> {
    let token = Saml2TokenHandler::new().read_token(&AssertionTemplate::default().render())?;
    assert_eq!(token.id(), "_a75adf55-01d7-40cc-929f-dbd8372ebdfc");
    assert_eq!(token.issuer(), ISSUER);
    assert!(token.valid_from().is_some());
    assert!(token.valid_to() > token.valid_from());
    assert!(token.signing_key().is_none());
    assert_eq!(token.assertion().statements().len(), 2);
    assert!(!token.assertion().is_signed());
    Ok(())
}
