//! Claims produced from a validated assertion.
//!
//! A [`ClaimsIdentity`] is an ordered list of [`Claim`]s plus an optional
//! acting-on-behalf-of identity (the actor), which may itself carry an
//! actor.

mod actor;
mod builder;
mod consolidate;

pub use actor::{deserialize_actor, serialize_actor};
pub use builder::build_identity;
pub use consolidate::consolidate_attributes;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{claim_properties, claim_types, claim_value_types, Attribute};

/// A single statement about the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    /// Claim type URI.
    pub claim_type: String,
    /// Claim value.
    pub value: String,
    /// Value type URI.
    pub value_type: String,
    /// Issuer of the assertion the claim came from.
    pub issuer: String,
    /// Authority that originally asserted the claim.
    pub original_issuer: String,
    /// Additional properties such as the name identifier format.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Claim {
    /// Creates a string-typed claim whose original issuer is `issuer`.
    pub fn new(
        claim_type: impl Into<String>,
        value: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        let issuer = issuer.into();
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: claim_value_types::STRING.to_string(),
            original_issuer: issuer.clone(),
            issuer,
            properties: BTreeMap::new(),
        }
    }

    /// Sets the value type.
    #[must_use]
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }

    /// Sets the original issuer.
    #[must_use]
    pub fn with_original_issuer(mut self, original_issuer: impl Into<String>) -> Self {
        self.original_issuer = original_issuer.into();
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// An identity made of claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimsIdentity {
    /// How the identity was authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    /// Claim type whose value is the identity name.
    pub name_claim_type: String,
    /// Claim type whose values are roles.
    pub role_claim_type: String,
    /// Claims in production order.
    pub claims: Vec<Claim>,
    /// The identity acting on behalf of this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Box<ClaimsIdentity>>,
}

impl Default for ClaimsIdentity {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ClaimsIdentity {
    /// Creates an empty identity with the standard name and role claim types.
    #[must_use]
    pub fn new(authentication_type: Option<String>) -> Self {
        Self {
            authentication_type,
            name_claim_type: claim_types::NAME.to_string(),
            role_claim_type: claim_types::ROLE.to_string(),
            claims: Vec::new(),
            actor: None,
        }
    }

    /// Appends a claim.
    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// Returns the first claim of `claim_type`.
    #[must_use]
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claim_type == claim_type)
    }

    /// Iterates over every claim of `claim_type`.
    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> {
        self.claims.iter().filter(move |c| c.claim_type == claim_type)
    }

    /// Returns the identity name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.find_first(&self.name_claim_type).map(|c| c.value.as_str())
    }

    /// Returns the role values.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.find_all(&self.role_claim_type)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// Returns the actor, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&Self> {
        self.actor.as_deref()
    }

    /// Number of identities in the actor chain below this one.
    #[must_use]
    pub fn actor_depth(&self) -> usize {
        std::iter::successors(self.actor(), |a| a.actor()).count()
    }

    /// True if a non-empty authentication type is set.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

/// One claim per attribute value.
pub(crate) fn attribute_claims<'a>(
    attribute: &'a Attribute,
    issuer: &'a str,
) -> impl Iterator<Item = Claim> + 'a {
    attribute.values.iter().map(move |value| {
        let mut claim = Claim::new(&attribute.name, value, issuer)
            .with_value_type(
                attribute
                    .value_type
                    .as_deref()
                    .unwrap_or(claim_value_types::STRING),
            )
            .with_original_issuer(attribute.original_issuer.as_deref().unwrap_or(issuer));
        if let Some(format) = &attribute.name_format {
            claim = claim.with_property(claim_properties::ATTRIBUTE_NAME_FORMAT, format);
        }
        if let Some(friendly_name) = &attribute.friendly_name {
            claim = claim.with_property(claim_properties::ATTRIBUTE_DISPLAY_NAME, friendly_name);
        }
        claim
    })
}
