//! NLU result types and the service seam
//!
//! The crate never turns raw text into intents itself; it consumes the
//! recognition result of an external NLU service. The service is a
//! trait so tests and alternative backends plug in without touching
//! the resolver.

pub mod client;

pub use client::NluClient;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::Result;

/// Name of the provider's fallback intent
///
/// A re-query that lands on this intent is never treated as a context
/// switch.
pub const NONE_INTENT: &str = "None";

/// Prefix marking provider-builtin entity types
const BUILTIN_PREFIX: &str = "builtin.";

/// True if an entity type is a recognized provider-builtin type
/// rather than a custom domain entity
pub fn is_builtin_type(entity_type: &str) -> bool {
    entity_type.starts_with(BUILTIN_PREFIX)
}

/// One entity extracted by the NLU service
///
/// `resolution` carries the service's loosely-typed resolution payload
/// as ordered key/value pairs; values range over scalars, lists and
/// objects (date ranges resolve to a list of alternatives, for
/// example). The binder may overwrite `resolution` during its
/// cross-entity propagation pass; everything else is immutable once
/// received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecommendation {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
    #[serde(default)]
    pub resolution: Vec<(String, Value)>,
    #[serde(default)]
    pub score: Option<f32>,
}

impl EntityRecommendation {
    pub fn new(entity_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            text: text.into(),
            resolution: Vec::new(),
            score: None,
        }
    }

    pub fn with_resolution(mut self, key: impl Into<String>, value: Value) -> Self {
        self.resolution.push((key.into(), value));
        self
    }

    /// First resolution value, if any
    pub fn first_resolution(&self) -> Option<&Value> {
        self.resolution.first().map(|(_, v)| v)
    }
}

/// A recognized intent with its confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: String,
    #[serde(default)]
    pub score: Option<f32>,
}

/// Full recognition result for one utterance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NluResult {
    #[serde(default)]
    pub top_intent: Option<IntentScore>,
    #[serde(default)]
    pub intents: Vec<IntentScore>,
    #[serde(default)]
    pub entities: Vec<EntityRecommendation>,
}

impl NluResult {
    /// Pick the usable top intent name
    ///
    /// The explicit top-scoring field wins; otherwise the maximum-score
    /// entry among reported intents.
    pub fn best_intent(&self) -> Option<&str> {
        if let Some(top) = &self.top_intent {
            return Some(&top.intent);
        }
        self.intents
            .iter()
            .max_by(|a, b| {
                let a = a.score.unwrap_or(0.0);
                let b = b.score.unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|i| i.intent.as_str())
    }
}

/// The external NLU service seam
///
/// `query` is a cancel-safe future: a caller aborting the round trip
/// (dropping the future, losing a `tokio::select!` race) leaves no
/// partial state behind in this crate.
pub trait NluService {
    fn query(&self, text: &str) -> impl std::future::Future<Output = Result<NluResult>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_detection() {
        assert!(is_builtin_type("builtin.datetimeV2.date"));
        assert!(!is_builtin_type("City.Destination"));
    }

    #[test]
    fn test_best_intent_prefers_explicit_top() {
        let result = NluResult {
            top_intent: Some(IntentScore {
                intent: "BookFlight".into(),
                score: Some(0.4),
            }),
            intents: vec![IntentScore {
                intent: "CancelFlight".into(),
                score: Some(0.9),
            }],
            entities: vec![],
        };
        assert_eq!(result.best_intent(), Some("BookFlight"));
    }

    #[test]
    fn test_best_intent_falls_back_to_max_score() {
        let result = NluResult {
            top_intent: None,
            intents: vec![
                IntentScore {
                    intent: "CancelFlight".into(),
                    score: Some(0.3),
                },
                IntentScore {
                    intent: "BookFlight".into(),
                    score: Some(0.8),
                },
            ],
            entities: vec![],
        };
        assert_eq!(result.best_intent(), Some("BookFlight"));
    }

    #[test]
    fn test_best_intent_empty() {
        assert_eq!(NluResult::default().best_intent(), None);
    }
}
