//! Common test utilities and fixtures.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use quick_xml::escape::escape;

use saml2_crypto::{EllipticCurve, SigningKeyPair};
use saml2_token::{
    claim_types, AssertionSigner, FixedClock, SignerOptions, SigningKey, ValidationParameters,
};

/// Issuer used by the fixtures.
pub const ISSUER: &str = "https://idp.example.com";

/// Audience used by the fixtures.
pub const AUDIENCE: &str = "https://sp.example.com";

/// The instant every fixture clock is frozen at.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

fn instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Describes an assertion to render.
#[derive(Debug, Clone)]
pub struct AssertionTemplate {
    pub id: String,
    pub issuer: String,
    pub name_id: Option<String>,
    pub audiences: Vec<String>,
    pub not_before: Option<DateTime<Utc>>,
    pub not_on_or_after: Option<DateTime<Utc>>,
    pub authn_instant: Option<DateTime<Utc>>,
    pub attributes: Vec<(String, Vec<String>)>,
}

impl Default for AssertionTemplate {
    fn default() -> Self {
        Self {
            id: "_a75adf55-01d7-40cc-929f-dbd8372ebdfc".to_string(),
            issuer: ISSUER.to_string(),
            name_id: Some("alice@example.com".to_string()),
            audiences: vec![AUDIENCE.to_string()],
            not_before: Some(now() - Duration::minutes(5)),
            not_on_or_after: Some(now() + Duration::hours(1)),
            authn_instant: Some(now() - Duration::minutes(1)),
            attributes: vec![
                (
                    claim_types::ROLE.to_string(),
                    vec!["admin".to_string(), "user".to_string()],
                ),
                ("email".to_string(), vec!["alice@example.com".to_string()]),
            ],
        }
    }
}

impl AssertionTemplate {
    /// A template with neither subject nor statements.
    pub fn empty() -> Self {
        Self {
            name_id: None,
            authn_instant: None,
            attributes: Vec::new(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, name: &str, values: &[&str]) -> Self {
        self.attributes.push((
            name.to_string(),
            values.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    /// Renders the assertion XML.
    pub fn render(&self) -> String {
        let mut xml = format!(
            r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{}" Version="2.0" IssueInstant="{}"><saml:Issuer>{}</saml:Issuer>"#,
            self.id,
            instant(now() - Duration::minutes(1)),
            escape(&self.issuer)
        );

        if let Some(name_id) = &self.name_id {
            xml.push_str(&format!(
                concat!(
                    "<saml:Subject>",
                    r#"<saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">{}</saml:NameID>"#,
                    r#"<saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer"/>"#,
                    "</saml:Subject>"
                ),
                escape(name_id)
            ));
        }

        xml.push_str("<saml:Conditions");
        if let Some(not_before) = self.not_before {
            xml.push_str(&format!(r#" NotBefore="{}""#, instant(not_before)));
        }
        if let Some(not_on_or_after) = self.not_on_or_after {
            xml.push_str(&format!(r#" NotOnOrAfter="{}""#, instant(not_on_or_after)));
        }
        xml.push('>');
        if !self.audiences.is_empty() {
            xml.push_str("<saml:AudienceRestriction>");
            for audience in &self.audiences {
                xml.push_str(&format!("<saml:Audience>{}</saml:Audience>", escape(audience)));
            }
            xml.push_str("</saml:AudienceRestriction>");
        }
        xml.push_str("</saml:Conditions>");

        if let Some(authn_instant) = self.authn_instant {
            xml.push_str(&format!(
                concat!(
                    r#"<saml:AuthnStatement AuthnInstant="{}" SessionIndex="_s1">"#,
                    "<saml:AuthnContext><saml:AuthnContextClassRef>",
                    "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport",
                    "</saml:AuthnContextClassRef></saml:AuthnContext>",
                    "</saml:AuthnStatement>"
                ),
                instant(authn_instant)
            ));
        }

        if !self.attributes.is_empty() {
            xml.push_str("<saml:AttributeStatement>");
            for (name, values) in &self.attributes {
                xml.push_str(&format!(r#"<saml:Attribute Name="{}">"#, escape(name)));
                for value in values {
                    xml.push_str(&format!(
                        "<saml:AttributeValue>{}</saml:AttributeValue>",
                        escape(value)
                    ));
                }
                xml.push_str("</saml:Attribute>");
            }
            xml.push_str("</saml:AttributeStatement>");
        }

        xml.push_str("</saml:Assertion>");
        xml
    }
}

/// A private key together with its trusted public counterpart.
pub struct TestKey {
    pub pair: SigningKeyPair,
    pub trusted: SigningKey,
}

impl TestKey {
    fn from_pair(pair: SigningKeyPair) -> Self {
        let trusted = SigningKey::new(pair.verification_key());
        Self { pair, trusted }
    }

    /// A fresh HMAC secret.
    pub fn hmac() -> Self {
        Self::from_pair(SigningKeyPair::generate_symmetric())
    }

    /// A fresh ECDSA key on `curve`.
    pub fn ec(curve: EllipticCurve) -> anyhow::Result<Self> {
        Ok(Self::from_pair(SigningKeyPair::generate_ec(curve)?))
    }

    /// A fresh RSA key.
    pub fn rsa() -> anyhow::Result<Self> {
        Ok(Self::from_pair(SigningKeyPair::generate_rsa()?))
    }

    /// Signs `xml` with default options.
    pub fn sign(&self, xml: &str) -> anyhow::Result<String> {
        self.sign_with(xml, SignerOptions::default())
    }

    /// Signs `xml` with `options`.
    pub fn sign_with(&self, xml: &str, options: SignerOptions) -> anyhow::Result<String> {
        Ok(AssertionSigner::new(options).sign(xml, &self.pair)?)
    }
}

/// Parameters trusting `key`, the fixture issuer and audience, with the
/// clock frozen at [`now`].
pub fn params(key: &SigningKey) -> ValidationParameters {
    ValidationParameters::new()
        .with_signing_key(key.clone())
        .with_valid_issuer(ISSUER)
        .with_valid_audience(AUDIENCE)
        .with_clock(FixedClock(now()))
}

/// Parameters trusting `key` with every semantic check disabled.
pub fn relaxed(key: &SigningKey) -> ValidationParameters {
    ValidationParameters {
        validate_issuer: false,
        validate_audience: false,
        validate_lifetime: false,
        ..ValidationParameters::new().with_signing_key(key.clone())
    }
}

/// Replaces the first character of the signature value with another valid
/// base64 character.
pub fn flip_signature_value(signed: &str) -> String {
    const OPEN: &str = "<ds:SignatureValue>";
    let start = signed.find(OPEN).map(|i| i + OPEN.len()).unwrap();
    let replacement = if &signed[start..=start] == "A" { "B" } else { "A" };
    format!("{}{replacement}{}", &signed[..start], &signed[start + 1..])
}
