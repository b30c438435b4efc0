//! Actor strings.
//!
//! An actor travels inside an assertion as the single value of an
//! attribute named [`claim_types::ACTOR`]. The value is a small XML
//! document:
//!
//! ```xml
//! <Actor xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ...>
//!   <saml:Attribute Name="...">
//!     <saml:AttributeValue>...</saml:AttributeValue>
//!   </saml:Attribute>
//! </Actor>
//! ```
//!
//! A nested actor is itself an actor attribute whose value is the escaped
//! nested document.

use quick_xml::escape::escape;

use crate::error::ActorError;
use crate::reader::read_attribute;
use crate::types::{
    claim_properties, claim_types, claim_value_types, Attribute, IDENTITY_CLAIMS_NS, SAML_NS,
    XSI_NS,
};
use crate::xml::{self, NodeExt};

use super::consolidate::consolidate;
use super::{attribute_claims, Claim, ClaimsIdentity};

/// Serializes the claims and actor chain of `identity` into an actor string.
///
/// Claims sharing a type and metadata are written as one attribute.
///
/// # Errors
///
/// Returns [`ActorError::MultipleActors`] if the identity holds more than
/// one actor, counting both its nested actor and actor-typed claims.
pub fn serialize_actor(identity: &ClaimsIdentity) -> Result<String, ActorError> {
    let actor_claims = identity.find_all(claim_types::ACTOR).count();
    if actor_claims + usize::from(identity.actor.is_some()) > 1 {
        return Err(ActorError::MultipleActors);
    }

    let mut attributes: Vec<Attribute> = identity.claims.iter().map(claim_attribute).collect();
    if let Some(actor) = identity.actor() {
        attributes.push(Attribute::new(claim_types::ACTOR).with_value(serialize_actor(actor)?));
    }

    let mut xml = format!(
        r#"<Actor xmlns:saml="{SAML_NS}" xmlns:xsi="{XSI_NS}" xmlns:ic="{IDENTITY_CLAIMS_NS}">"#
    );
    for attribute in consolidate(&attributes) {
        write_attribute(&mut xml, &attribute);
    }
    xml.push_str("</Actor>");
    Ok(xml)
}

/// Parses an actor string.
///
/// Claims get `issuer` as their issuer and, unless the attribute names
/// another one, as their original issuer. `raw` itself counts as depth one.
///
/// # Errors
///
/// - [`ActorError::Malformed`] if `raw` is not an actor document
/// - [`ActorError::MultipleActors`] if a level holds more than one actor
/// - [`ActorError::DepthExceeded`] if the chain is deeper than `max_depth`
pub fn deserialize_actor(
    raw: &str,
    issuer: &str,
    max_depth: usize,
) -> Result<ClaimsIdentity, ActorError> {
    read_actor(raw, issuer, 1, max_depth)
}

/// Builds the actor held by an actor-typed attribute found at `depth`.
pub(crate) fn actor_from_attribute(
    attribute: &Attribute,
    issuer: &str,
    depth: usize,
    max_depth: usize,
) -> Result<ClaimsIdentity, ActorError> {
    match attribute.values.as_slice() {
        [value] => read_actor(value, issuer, depth, max_depth),
        [] => Err(ActorError::Malformed(
            "actor attribute has no value".to_string(),
        )),
        _ => Err(ActorError::MultipleActors),
    }
}

fn read_actor(
    raw: &str,
    issuer: &str,
    depth: usize,
    max_depth: usize,
) -> Result<ClaimsIdentity, ActorError> {
    if depth > max_depth {
        return Err(ActorError::DepthExceeded { max_depth });
    }
    let document = xml::parse(raw).map_err(|e| ActorError::Malformed(e.to_string()))?;
    let root = document.root_element();
    if root.tag_name().name() != "Actor" || root.tag_name().namespace().is_some() {
        return Err(ActorError::Malformed(format!(
            "expected <Actor>, found <{}>",
            root.qualified_name()
        )));
    }

    let mut identity = ClaimsIdentity::new(None);
    for child in root.child_elements() {
        if !child.is(SAML_NS, "Attribute") {
            return Err(ActorError::Malformed(format!(
                "unexpected <{}> in actor",
                child.qualified_name()
            )));
        }
        let attribute = read_attribute(child).map_err(|e| ActorError::Malformed(e.to_string()))?;
        if attribute.name == claim_types::ACTOR {
            if identity.actor.is_some() {
                return Err(ActorError::MultipleActors);
            }
            let actor = actor_from_attribute(&attribute, issuer, depth + 1, max_depth)?;
            identity.actor = Some(Box::new(actor));
        } else {
            identity.claims.extend(attribute_claims(&attribute, issuer));
        }
    }
    Ok(identity)
}

fn claim_attribute(claim: &Claim) -> Attribute {
    Attribute {
        name: claim.claim_type.clone(),
        name_format: claim
            .properties
            .get(claim_properties::ATTRIBUTE_NAME_FORMAT)
            .cloned(),
        friendly_name: claim
            .properties
            .get(claim_properties::ATTRIBUTE_DISPLAY_NAME)
            .cloned(),
        value_type: (claim.value_type != claim_value_types::STRING)
            .then(|| claim.value_type.clone()),
        original_issuer: (claim.original_issuer != claim.issuer)
            .then(|| claim.original_issuer.clone()),
        values: vec![claim.value.clone()],
    }
}

fn write_attribute(xml: &mut String, attribute: &Attribute) {
    xml.push_str(&format!(r#"<saml:Attribute Name="{}""#, escape_attribute(&attribute.name)));
    if let Some(format) = &attribute.name_format {
        xml.push_str(&format!(r#" NameFormat="{}""#, escape_attribute(format)));
    }
    if let Some(friendly_name) = &attribute.friendly_name {
        xml.push_str(&format!(r#" FriendlyName="{}""#, escape_attribute(friendly_name)));
    }
    if let Some(original_issuer) = &attribute.original_issuer {
        xml.push_str(&format!(
            r#" ic:OriginalIssuer="{}""#,
            escape_attribute(original_issuer)
        ));
    }
    xml.push('>');

    let type_declaration = attribute.value_type.as_deref().map(|value_type| {
        match value_type.rsplit_once('#') {
            Some((namespace, local)) => format!(
                r#" xmlns:tn="{}" xsi:type="tn:{}""#,
                escape_attribute(namespace),
                escape_attribute(local)
            ),
            None => format!(r#" xsi:type="{}""#, escape_attribute(value_type)),
        }
    });
    for value in &attribute.values {
        xml.push_str(&format!(
            "<saml:AttributeValue{}>{}</saml:AttributeValue>",
            type_declaration.as_deref().unwrap_or_default(),
            escape_text(value)
        ));
    }
    xml.push_str("</saml:Attribute>");
}

/// Escapes element content. A literal carriage return would be read back
/// as a line feed, so it is written as a character reference.
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#xD;")
}

/// Escapes an attribute value. Tab, line feed and carriage return would be
/// normalized to spaces when read back.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#x9;")
        .replace('\n', "&#xA;")
        .replace('\r', "&#xD;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "https://idp.example.com";

    fn identity(name: &str) -> ClaimsIdentity {
        let mut identity = ClaimsIdentity::new(None);
        identity.add_claim(Claim::new(claim_types::NAME, name, ISSUER));
        identity
    }

    #[test]
    fn round_trips_claims_and_metadata() {
        let mut original = identity("service-a");
        original.add_claim(Claim::new(claim_types::ROLE, "reader", ISSUER));
        original.add_claim(Claim::new(claim_types::ROLE, "writer <&>", ISSUER));
        original.add_claim(
            Claim::new("urn:example:level", "3", ISSUER)
                .with_value_type("http://www.w3.org/2001/XMLSchema#int")
                .with_original_issuer("https://hr.example.com")
                .with_property(
                    claim_properties::ATTRIBUTE_NAME_FORMAT,
                    "urn:oasis:names:tc:SAML:2.0:attrname-format:uri",
                )
                .with_property(claim_properties::ATTRIBUTE_DISPLAY_NAME, "Level"),
        );

        let raw = serialize_actor(&original).unwrap();
        let parsed = deserialize_actor(&raw, ISSUER, 10).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn round_trips_nested_chain() {
        let mut innermost = identity("gateway");
        innermost.add_claim(Claim::new(claim_types::ROLE, "proxy", ISSUER));
        let mut middle = identity("service-b");
        middle.actor = Some(Box::new(innermost));
        let mut outer = identity("service-a");
        outer.actor = Some(Box::new(middle));

        let raw = serialize_actor(&outer).unwrap();
        let parsed = deserialize_actor(&raw, ISSUER, 10).unwrap();
        assert_eq!(parsed.actor_depth(), 2);
        assert_eq!(parsed, outer);
        assert_eq!(
            parsed.actor().and_then(ClaimsIdentity::actor).and_then(ClaimsIdentity::name),
            Some("gateway")
        );
    }

    #[test]
    fn depth_is_bounded() {
        let mut outer = identity("a");
        let mut middle = identity("b");
        middle.actor = Some(Box::new(identity("c")));
        outer.actor = Some(Box::new(middle));
        let raw = serialize_actor(&outer).unwrap();

        assert!(deserialize_actor(&raw, ISSUER, 3).is_ok());
        assert_eq!(
            deserialize_actor(&raw, ISSUER, 2),
            Err(ActorError::DepthExceeded { max_depth: 2 })
        );
        assert_eq!(
            deserialize_actor(&raw, ISSUER, 0),
            Err(ActorError::DepthExceeded { max_depth: 0 })
        );
    }

    #[test]
    fn two_actors_are_rejected() {
        let mut doubled = identity("a");
        doubled.add_claim(Claim::new(claim_types::ACTOR, "<Actor/>", ISSUER));
        doubled.actor = Some(Box::new(identity("b")));
        assert_eq!(serialize_actor(&doubled), Err(ActorError::MultipleActors));

        let raw = format!(
            r#"<Actor xmlns:saml="{SAML_NS}"><saml:Attribute Name="{actor}"><saml:AttributeValue>&lt;Actor/&gt;</saml:AttributeValue></saml:Attribute><saml:Attribute Name="{actor}" FriendlyName="x"><saml:AttributeValue>&lt;Actor/&gt;</saml:AttributeValue></saml:Attribute></Actor>"#,
            actor = claim_types::ACTOR
        );
        assert_eq!(
            deserialize_actor(&raw, ISSUER, 10),
            Err(ActorError::MultipleActors)
        );
    }

    #[test]
    fn malformed_actor_strings() {
        for raw in [
            "",
            "not xml",
            "<Other/>",
            r#"<a:Actor xmlns:a="urn:x"/>"#,
            "<Actor><Attribute Name=\"x\"/></Actor>",
        ] {
            assert!(
                matches!(deserialize_actor(raw, ISSUER, 10), Err(ActorError::Malformed(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn round_trips_line_breaks_and_tabs() {
        let mut original = identity("line1\r\nline2");
        original.add_claim(
            Claim::new("urn:example:tab\tname", "a\tb\rc\n", ISSUER)
                .with_original_issuer("https://hr.example.com/\r\n\tunit")
                .with_property(claim_properties::ATTRIBUTE_DISPLAY_NAME, "two\nlines"),
        );

        let raw = serialize_actor(&original).unwrap();
        assert!(raw.contains("line1&#xD;\nline2"));
        let parsed = deserialize_actor(&raw, ISSUER, 10).unwrap();
        assert_eq!(parsed.name(), Some("line1\r\nline2"));
        assert_eq!(parsed, original);
    }

    #[test]
    fn empty_actor_has_no_claims() {
        let parsed = deserialize_actor("<Actor/>", ISSUER, 1).unwrap();
        assert!(parsed.claims.is_empty());
        assert!(parsed.actor().is_none());
    }
}
