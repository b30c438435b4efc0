//! Enveloped signature verification.
//!
//! Verifies the single reference of an assertion signature (canonicalize,
//! digest, compare) and then the signature value over the canonical
//! `SignedInfo`, choosing among the configured keys with the help of the
//! key-info hints.

use roxmltree::Node;
use saml2_crypto::{HashAlgorithm, SignatureAlgorithm};
use tracing::debug;

use crate::error::SignatureError;
use crate::types::{Assertion, XMLDSIG_NS};
use crate::xml::{self, CanonicalizationMethod, NodeExt};

use super::{
    digest_algorithm_from_uri, signature_algorithm_from_uri, SigningKey, Transform, XmlSignature,
};

/// Verification policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Accept SHA-1 based signature and digest algorithms.
    pub allow_sha1: bool,
}

/// How the referenced content is prepared before digesting.
struct ReferencePlan<'a> {
    digest: HashAlgorithm,
    enveloped: bool,
    method: CanonicalizationMethod,
    inclusive_prefixes: &'a [String],
}

/// Verifies the enveloped signature of `assertion` with one of `keys`.
///
/// Returns the key that verified the signature. The assertion is never
/// modified.
///
/// # Errors
///
/// - [`SignatureError::Unsigned`] when there is no signature.
/// - [`SignatureError::ReferenceMismatch`] when the reference does not
///   point at the assertion.
/// - [`SignatureError::UnsupportedAlgorithm`] for unknown or disallowed
///   algorithms and transforms.
/// - [`SignatureError::DigestTampered`] when the signed content changed.
/// - [`SignatureError::KeyNotFound`] when no configured key applies.
/// - [`SignatureError::SignatureTampered`] when the signature value does
///   not verify.
/// - [`SignatureError::Canonicalization`] when the signed content cannot be
///   canonicalized.
pub fn verify_signature(
    assertion: &Assertion,
    keys: &[SigningKey],
    options: VerifyOptions,
) -> Result<SigningKey, SignatureError> {
    let signature = assertion.signature().ok_or(SignatureError::Unsigned)?;

    check_reference_uri(&signature.reference.uri, assertion.id())?;

    let algorithm = signature_algorithm(signature, options)?;
    let signed_info_method = CanonicalizationMethod::from_uri(&signature.canonicalization_method)
        .ok_or_else(|| {
            SignatureError::UnsupportedAlgorithm(signature.canonicalization_method.clone())
        })?;
    let plan = reference_plan(signature, options)?;

    let document = xml::parse(assertion.source())?;
    let signature_element = document
        .root_element()
        .find_child(XMLDSIG_NS, "Signature")
        .ok_or(SignatureError::Unsigned)?;

    let canonical = canonical_reference(assertion.source(), signature_element, &plan)?;
    let digest = saml2_crypto::hash(plan.digest, &canonical);
    if !saml2_crypto::constant_time_eq(&digest, &signature.reference.digest_value) {
        debug!(assertion_id = assertion.id(), "reference digest mismatch");
        return Err(SignatureError::DigestTampered);
    }

    let signed_info = signature_element
        .find_child(XMLDSIG_NS, "SignedInfo")
        .ok_or(SignatureError::Unsigned)?;
    let signed_bytes =
        xml::canonicalize(signed_info, signed_info_method, &signature.inclusive_prefixes)?;

    verify_with_keys(signature, algorithm, keys, &signed_bytes)
}

/// Canonical form of the referenced assertion.
///
/// The enveloped transform is applied by cutting the `ds:Signature` element
/// out of the source text and parsing the remainder.
fn canonical_reference(
    source: &str,
    signature_element: Node<'_, '_>,
    plan: &ReferencePlan<'_>,
) -> Result<Vec<u8>, SignatureError> {
    let method = plan.method.without_comments();
    if !plan.enveloped {
        let root = signature_element.document().root_element();
        return Ok(xml::canonicalize(root, method, plan.inclusive_prefixes)?);
    }

    let range = signature_element.range();
    let mut stripped = String::with_capacity(source.len() - range.len());
    stripped.push_str(&source[..range.start]);
    stripped.push_str(&source[range.end..]);
    let document = xml::parse(&stripped)?;
    Ok(xml::canonicalize(
        document.root_element(),
        method,
        plan.inclusive_prefixes,
    )?)
}

fn check_reference_uri(uri: &str, id: &str) -> Result<(), SignatureError> {
    let matches = uri.is_empty() || uri.strip_prefix('#').is_some_and(|fragment| fragment == id);
    if matches {
        Ok(())
    } else {
        Err(SignatureError::ReferenceMismatch {
            uri: uri.to_string(),
        })
    }
}

fn signature_algorithm(
    signature: &XmlSignature,
    options: VerifyOptions,
) -> Result<SignatureAlgorithm, SignatureError> {
    let unsupported = || SignatureError::UnsupportedAlgorithm(signature.signature_method.clone());
    let algorithm = signature_algorithm_from_uri(&signature.signature_method).ok_or_else(unsupported)?;
    algorithm
        .ensure_allowed(options.allow_sha1)
        .map_err(|_| unsupported())?;
    Ok(algorithm)
}

fn reference_plan(
    signature: &XmlSignature,
    options: VerifyOptions,
) -> Result<ReferencePlan<'_>, SignatureError> {
    let reference = &signature.reference;
    let digest = digest_algorithm_from_uri(&reference.digest_method)
        .filter(|digest| options.allow_sha1 || !digest.is_legacy())
        .ok_or_else(|| SignatureError::UnsupportedAlgorithm(reference.digest_method.clone()))?;

    let mut plan = ReferencePlan {
        digest,
        enveloped: false,
        method: CanonicalizationMethod::C14N,
        inclusive_prefixes: &[],
    };
    for transform in &reference.transforms {
        match transform {
            Transform::Enveloped => plan.enveloped = true,
            Transform::Canonicalize {
                method,
                inclusive_prefixes,
            } => {
                plan.method = *method;
                plan.inclusive_prefixes = inclusive_prefixes.as_slice();
            }
            Transform::Other(uri) => return Err(SignatureError::UnsupportedAlgorithm(uri.clone())),
        }
    }
    Ok(plan)
}

fn verify_with_keys(
    signature: &XmlSignature,
    algorithm: SignatureAlgorithm,
    keys: &[SigningKey],
    signed_bytes: &[u8],
) -> Result<SigningKey, SignatureError> {
    let key_not_found = || SignatureError::KeyNotFound {
        algorithm: signature.signature_method.clone(),
    };

    let candidates: Vec<&SigningKey> = keys.iter().filter(|k| k.supports(algorithm)).collect();
    if candidates.is_empty() {
        return Err(key_not_found());
    }

    let (hinted, others): (Vec<&SigningKey>, Vec<&SigningKey>) = candidates
        .into_iter()
        .partition(|key| key.matches(&signature.key_info));

    for key in hinted.iter().chain(others.iter()) {
        if key
            .material()
            .verify(algorithm, signed_bytes, &signature.signature_value)
            .is_ok()
        {
            debug!(key_id = %key.key_id(), "signature verified");
            return Ok((*key).clone());
        }
    }

    if hinted.is_empty() && !signature.key_info.is_empty() {
        // the token names a key we were not given
        Err(key_not_found())
    } else {
        Err(SignatureError::SignatureTampered)
    }
}
