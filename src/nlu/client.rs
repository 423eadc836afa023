//! HTTP client for the NLU prediction endpoint
//!
//! Speaks the provider's JSON recognition format and maps it onto the
//! crate's `NluResult`. The request timeout from `NluConfig` is
//! enforced at the HTTP client level, so a stalled backend surfaces as
//! an NLU error instead of hanging a dialog turn.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::core::config::NluConfig;
use crate::core::error::{BindError, Result};

use super::{EntityRecommendation, IntentScore, NluResult, NluService};

/// Async client for making NLU prediction calls
pub struct NluClient {
    client: Client,
    config: NluConfig,
}

impl NluClient {
    pub fn new(config: NluConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Create a client from environment variables
    ///
    /// Required: NLU_ENDPOINT, NLU_API_KEY
    /// Optional: NLU_TIMEOUT_SECS
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(NluConfig::from_env()?))
    }

    async fn query_inner(&self, text: &str) -> Result<NluResult> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("subscription-key", self.config.api_key.as_str()), ("q", text)])
            .send()
            .await
            .map_err(|e| BindError::Nlu(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BindError::Nlu(format!("API error {}: {}", status, body)));
        }

        let recognition: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| BindError::Nlu(e.to_string()))?;

        Ok(recognition.into_result())
    }
}

impl NluService for NluClient {
    async fn query(&self, text: &str) -> Result<NluResult> {
        tracing::debug!(text, "querying NLU service");
        self.query_inner(text).await
    }
}

/// Wire format of the provider's recognition response
#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(rename = "topScoringIntent")]
    top_scoring_intent: Option<WireIntent>,
    #[serde(default)]
    intents: Vec<WireIntent>,
    #[serde(default)]
    entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
struct WireIntent {
    intent: String,
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(rename = "entity")]
    text: String,
    score: Option<f32>,
    /// Loosely-typed resolution payload; an object whose entries become
    /// the ordered resolution pairs
    resolution: Option<Value>,
}

impl RecognitionResponse {
    fn into_result(self) -> NluResult {
        NluResult {
            top_intent: self.top_scoring_intent.map(WireIntent::into_score),
            intents: self.intents.into_iter().map(WireIntent::into_score).collect(),
            entities: self.entities.into_iter().map(WireEntity::into_entity).collect(),
        }
    }
}

impl WireIntent {
    fn into_score(self) -> IntentScore {
        IntentScore {
            intent: self.intent,
            score: self.score,
        }
    }
}

impl WireEntity {
    fn into_entity(self) -> EntityRecommendation {
        let resolution = match self.resolution {
            Some(Value::Object(map)) => map.into_iter().collect(),
            Some(other) => vec![("value".to_string(), other)],
            None => Vec::new(),
        };
        EntityRecommendation {
            entity_type: self.entity_type,
            text: self.text,
            resolution,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_response_mapping() {
        let body = json!({
            "query": "book a flight to paris on may first",
            "topScoringIntent": { "intent": "BookFlight", "score": 0.97 },
            "intents": [
                { "intent": "BookFlight", "score": 0.97 },
                { "intent": "None", "score": 0.02 }
            ],
            "entities": [
                {
                    "entity": "paris",
                    "type": "City.Destination",
                    "score": 0.91
                },
                {
                    "entity": "may first",
                    "type": "builtin.datetimeV2.date",
                    "resolution": { "values": [ { "value": "2024-05-01" } ] }
                }
            ]
        });

        let wire: RecognitionResponse = serde_json::from_value(body).unwrap();
        let result = wire.into_result();

        assert_eq!(result.best_intent(), Some("BookFlight"));
        assert_eq!(result.entities.len(), 2);

        let date = &result.entities[1];
        assert_eq!(date.entity_type, "builtin.datetimeV2.date");
        let (key, value) = &date.resolution[0];
        assert_eq!(key, "values");
        assert!(value.is_array());
    }

    #[test]
    fn test_wire_entity_without_resolution() {
        let wire = WireEntity {
            entity_type: "City.Destination".into(),
            text: "paris".into(),
            score: None,
            resolution: None,
        };
        let entity = wire.into_entity();
        assert!(entity.resolution.is_empty());
        assert!(entity.first_resolution().is_none());
    }
}
