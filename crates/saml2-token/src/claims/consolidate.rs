//! Attribute consolidation.

use crate::error::ConsolidationError;
use crate::types::Attribute;

/// Merges attributes that share the same key (name, name format, friendly
/// name, value type, original issuer).
///
/// The first occurrence of a key keeps its position and collects the values
/// of every later occurrence, in order. Attributes with distinct keys keep
/// their relative order.
///
/// # Errors
///
/// Returns [`ConsolidationError::NullAttributes`] when no collection is
/// supplied.
pub fn consolidate_attributes(
    attributes: Option<&[Attribute]>,
) -> Result<Vec<Attribute>, ConsolidationError> {
    attributes
        .map(consolidate)
        .ok_or(ConsolidationError::NullAttributes)
}

pub(crate) fn consolidate(attributes: &[Attribute]) -> Vec<Attribute> {
    let mut merged: Vec<Attribute> = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        match merged.iter_mut().find(|m| m.same_key(attribute)) {
            Some(existing) => existing.values.extend(attribute.values.iter().cloned()),
            None => merged.push(attribute.clone()),
        }
    }
    merged
}
