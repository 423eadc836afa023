//! Schema-wide entity binding
//!
//! Orchestrates one binding pass over every parameter of an action
//! instance: a cross-entity resolution-propagation pass first, then
//! per-parameter matching and coercion. Binding is best-effort; a
//! parameter that cannot be bound lowers the aggregate success flag
//! and the pass moves on.

use serde_json::Value;

use crate::coerce::coerce;
use crate::core::types::BindingResult;
use crate::nlu::{is_builtin_type, EntityRecommendation};
use crate::schema::{ActionInstance, ParameterSchema};

use super::matcher::{match_entities, DisambiguationFn};

/// Bind every schema parameter of `action` from the recognized entities
///
/// Each parameter is visited exactly once; the first successful
/// assignment wins and is never overwritten later in the same pass.
/// The returned flag is true only when every schema parameter holds a
/// value after the pass. An empty entity set fails immediately.
pub fn bind(
    action: &mut ActionInstance,
    entities: &[EntityRecommendation],
    disambiguate: Option<&DisambiguationFn>,
) -> BindingResult {
    if entities.is_empty() {
        tracing::debug!(
            intent = %action.schema.intent_name,
            "binding with empty entity set, nothing to satisfy"
        );
        return BindingResult { success: false };
    }

    let entities = propagate_resolutions(entities);

    let mut success = true;
    let schema = action.schema.clone();
    for parameter in &schema.parameters {
        let bound = bind_parameter(action, parameter, &entities, disambiguate);
        if !bound && !action.is_set(&parameter.name) {
            success = false;
        }
    }

    BindingResult { success }
}

/// Bind one parameter from the entity set; true if a value was assigned
pub fn bind_parameter(
    action: &mut ActionInstance,
    parameter: &ParameterSchema,
    entities: &[EntityRecommendation],
    disambiguate: Option<&DisambiguationFn>,
) -> bool {
    let outcome = match_entities(parameter, entities, disambiguate);

    let raw = match outcome.selected {
        Some(entity) => derive_raw_value(&entity),
        None => match merge_list_candidates(parameter, &outcome.candidates) {
            Some(merged) => merged,
            None => return false,
        },
    };

    match coerce(&parameter.value_type, &raw) {
        Ok(Some(value)) => {
            action.fields.insert(parameter.name.clone(), value);
            true
        }
        Ok(None) => false,
        Err(err) => {
            tracing::debug!(
                parameter = %parameter.name,
                %err,
                "coercion failed, parameter stays unbound"
            );
            false
        }
    }
}

/// Fuse sibling entities for the same mention before per-field binding
///
/// The NLU service sometimes emits a raw domain mention and a
/// separately-resolved builtin value as sibling entities for the same
/// recognized text. A custom-typed member with no resolution inherits
/// the resolution values of a sibling that carries some.
pub(crate) fn propagate_resolutions(entities: &[EntityRecommendation]) -> Vec<EntityRecommendation> {
    let mut fused: Vec<EntityRecommendation> = entities.to_vec();

    for i in 0..fused.len() {
        if !fused[i].resolution.is_empty() || is_builtin_type(&fused[i].entity_type) {
            continue;
        }
        let text = fused[i].text.clone();
        let donor = fused
            .iter()
            .position(|e| e.text == text && !e.resolution.is_empty());
        if let Some(donor) = donor {
            tracing::debug!(
                entity_type = %fused[i].entity_type,
                donor_type = %fused[donor].entity_type,
                %text,
                "propagating resolution onto custom entity"
            );
            let donated = fused[donor].resolution.clone();
            fused[i].resolution = donated;
        }
    }

    fused
}

/// Derive the raw value to coerce from a matched entity
///
/// Priority: the "value" sub-fields of a multi-value resolution
/// container (as with date/time-range resolutions), then the first
/// resolution value, then the entity's raw text.
fn derive_raw_value(entity: &EntityRecommendation) -> Value {
    match entity.first_resolution() {
        Some(Value::Array(alternatives)) => {
            Value::Array(alternatives.iter().map(extract_value_field).collect())
        }
        Some(Value::Object(container)) => container
            .get("value")
            .cloned()
            .unwrap_or_else(|| Value::Object(container.clone())),
        Some(value) => value.clone(),
        None => Value::String(entity.text.clone()),
    }
}

/// Multi-candidate fallback: merge all candidates' list resolutions
///
/// Applies only when no single entity matched, every candidate's first
/// resolution value is a structured list, and the parameter itself is
/// array-declared. Scalar-declared parameters never take this path and
/// stay unbound instead.
fn merge_list_candidates(
    parameter: &ParameterSchema,
    candidates: &[EntityRecommendation],
) -> Option<Value> {
    if candidates.is_empty() || !parameter.is_array() {
        return None;
    }

    let mut merged = Vec::new();
    for candidate in candidates {
        match candidate.first_resolution() {
            Some(Value::Array(items)) => {
                merged.extend(items.iter().map(extract_value_field));
            }
            _ => return None,
        }
    }
    Some(Value::Array(merged))
}

/// Pull the designated "value" sub-field out of a resolution element
fn extract_value_field(element: &Value) -> Value {
    match element {
        Value::Object(map) => map.get("value").cloned().unwrap_or_else(|| element.clone()),
        other => other.clone(),
    }
}
