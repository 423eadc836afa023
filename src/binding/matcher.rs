//! Per-parameter entity selection
//!
//! For one target parameter, selects the best-matching entity from the
//! full recognized set using a three-tier strategy; ties go to the
//! caller's disambiguation callback when one is supplied.

use crate::nlu::EntityRecommendation;
use crate::schema::ParameterSchema;

/// Caller-supplied tie-breaker over equally-good candidates
pub type DisambiguationFn =
    dyn Fn(&ParameterSchema, &[EntityRecommendation]) -> EntityRecommendation;

/// Result of matching one parameter against the entity set
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// The single selected entity, when selection was unambiguous or
    /// disambiguated
    pub selected: Option<EntityRecommendation>,
    /// The full candidate set of the winning tier; the binder's
    /// array-merge fallback inspects it when nothing was selected
    pub candidates: Vec<EntityRecommendation>,
}

/// Select the best-matching entity for a parameter
///
/// Tiers, first non-empty wins:
/// 1. entity type equals the parameter's custom entity type
/// 2. entity type equals the parameter name
/// 3. entity type equals the parameter's builtin entity type
pub fn match_entities(
    parameter: &ParameterSchema,
    entities: &[EntityRecommendation],
    disambiguate: Option<&DisambiguationFn>,
) -> MatchOutcome {
    let candidates = first_matching_tier(parameter, entities);

    let selected = match candidates.len() {
        0 => None,
        1 => Some(candidates[0].clone()),
        _ => match disambiguate {
            Some(callback) => Some(callback(parameter, &candidates)),
            None => {
                tracing::debug!(
                    parameter = %parameter.name,
                    candidates = candidates.len(),
                    "ambiguous entity match with no disambiguation callback"
                );
                None
            }
        },
    };

    MatchOutcome {
        selected,
        candidates,
    }
}

fn first_matching_tier(
    parameter: &ParameterSchema,
    entities: &[EntityRecommendation],
) -> Vec<EntityRecommendation> {
    if let Some(custom) = &parameter.custom_entity_type {
        let tier = by_type(entities, custom);
        if !tier.is_empty() {
            return tier;
        }
    }

    let tier = by_type(entities, &parameter.name);
    if !tier.is_empty() {
        return tier;
    }

    if let Some(builtin) = &parameter.builtin_entity_type {
        let tier = by_type(entities, builtin);
        if !tier.is_empty() {
            return tier;
        }
    }

    Vec::new()
}

fn by_type(entities: &[EntityRecommendation], entity_type: &str) -> Vec<EntityRecommendation> {
    entities
        .iter()
        .filter(|e| e.entity_type == entity_type)
        .cloned()
        .collect()
}
