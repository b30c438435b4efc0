//! Claims construction from a read assertion.

use chrono::SecondsFormat;
use tracing::debug;

use crate::error::{ActorError, ClaimsError, TokenError};
use crate::types::{
    claim_properties, claim_types, claim_value_types, Assertion, AttributeStatement,
    AuthnStatement, NameId, Statement,
};
use crate::validation::ValidationParameters;

use super::actor::actor_from_attribute;
use super::{attribute_claims, consolidate_attributes, Claim, ClaimsIdentity};

/// Builds the identity described by `assertion`.
///
/// `issuer` is the issuer accepted by issuer validation; it is stamped on
/// every claim. Claims are produced in document order: the subject name
/// identifier first, then each statement.
///
/// # Errors
///
/// Fails on actor problems (malformed string, more than one actor, chain
/// too deep) and, when `reject_unrecognized_statements` is set, on
/// statement types this crate does not know.
pub fn build_identity(
    assertion: &Assertion,
    issuer: &str,
    params: &ValidationParameters,
) -> Result<ClaimsIdentity, TokenError> {
    let mut identity = ClaimsIdentity {
        name_claim_type: params.name_claim_type.clone(),
        role_claim_type: params.role_claim_type.clone(),
        ..ClaimsIdentity::new(params.authentication_type.clone())
    };

    if let Some(name_id) = assertion.subject().and_then(|s| s.name_id.as_ref()) {
        identity.add_claim(name_identifier_claim(name_id, issuer));
    }

    for statement in assertion.statements() {
        match statement {
            Statement::Attribute(statement) => {
                add_attribute_claims(&mut identity, statement, issuer, params)?;
            }
            Statement::Authentication(statement) => {
                add_authentication_claims(&mut identity, statement, issuer);
            }
            Statement::AuthorizationDecision(_) => {}
            Statement::Unrecognized(statement) => {
                if params.reject_unrecognized_statements {
                    return Err(ClaimsError::UnrecognizedStatement {
                        type_name: statement.type_name.clone(),
                    }
                    .into());
                }
                debug!(type_name = %statement.type_name, "skipping unrecognized statement");
            }
        }
    }

    debug!(
        claims = identity.claims.len(),
        actor_depth = identity.actor_depth(),
        "built claims identity"
    );
    Ok(identity)
}

fn name_identifier_claim(name_id: &NameId, issuer: &str) -> Claim {
    let properties = [
        (claim_properties::NAME_ID_FORMAT, &name_id.format),
        (claim_properties::NAME_ID_NAME_QUALIFIER, &name_id.name_qualifier),
        (claim_properties::NAME_ID_SP_NAME_QUALIFIER, &name_id.sp_name_qualifier),
        (claim_properties::NAME_ID_SP_PROVIDED_ID, &name_id.sp_provided_id),
    ];
    properties.into_iter().fold(
        Claim::new(claim_types::NAME_IDENTIFIER, &name_id.value, issuer),
        |claim, (key, value)| match value {
            Some(value) => claim.with_property(key, value),
            None => claim,
        },
    )
}

fn add_attribute_claims(
    identity: &mut ClaimsIdentity,
    statement: &AttributeStatement,
    issuer: &str,
    params: &ValidationParameters,
) -> Result<(), TokenError> {
    for attribute in consolidate_attributes(Some(&statement.attributes))? {
        if attribute.name != claim_types::ACTOR {
            identity.claims.extend(attribute_claims(&attribute, issuer));
            continue;
        }
        if identity.actor.is_some() {
            return Err(ActorError::MultipleActors.into());
        }
        let actor = actor_from_attribute(&attribute, issuer, 1, params.max_actor_depth)?;
        identity.actor = Some(Box::new(actor));
    }
    Ok(())
}

fn add_authentication_claims(identity: &mut ClaimsIdentity, statement: &AuthnStatement, issuer: &str) {
    if let Some(method) = statement.authn_context.method() {
        identity.add_claim(Claim::new(claim_types::AUTHENTICATION_METHOD, method, issuer));
    }
    identity.add_claim(
        Claim::new(
            claim_types::AUTHENTICATION_INSTANT,
            statement
                .authn_instant
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            issuer,
        )
        .with_value_type(claim_value_types::DATE_TIME),
    );
}
