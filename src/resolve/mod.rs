//! Top-level action resolution
//!
//! Turns an NLU recognition result into a bound action instance:
//! Idle -> ResolvingIntent -> Binding -> (Bound | ContextSwitchDetected
//! | Unresolved). The resolver owns no state between calls; the caller
//! threads the evolving instance through successive turns and the
//! shared registry is read-only.

use serde_json::Value;

use crate::binding::binder::propagate_resolutions;
use crate::binding::{bind, bind_parameter, DisambiguationFn};
use crate::core::error::{BindError, Result};
use crate::core::types::ResolutionOutcome;
use crate::nlu::{NluResult, NluService, NONE_INTENT};
use crate::schema::{ActionFactory, ActionInstance, SchemaRegistry};

/// Resolves NLU results to bound action instances
pub struct ActionResolver<'a> {
    registry: &'a SchemaRegistry,
    factory: &'a dyn ActionFactory,
}

impl<'a> ActionResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, factory: &'a dyn ActionFactory) -> Self {
        Self { registry, factory }
    }

    /// Resolve a recognition result to an action instance
    ///
    /// Picks the top-scoring intent, looks up its schema, instantiates
    /// via the factory and binds the full entity set. Returns the
    /// instance whether binding was full or partial; partial binding is
    /// the expected shape of a multi-turn form-fill. Returns `None`
    /// when no usable intent was recognized or no schema is registered
    /// for it.
    pub fn resolve_from_intent(
        &self,
        result: &NluResult,
        disambiguate: Option<&DisambiguationFn>,
    ) -> Option<ActionInstance> {
        let intent = result.best_intent()?;
        tracing::debug!(intent, "resolving intent");

        let schema = match self.registry.lookup(intent) {
            Some(schema) => schema,
            None => {
                tracing::debug!(intent, "no schema registered for intent");
                return None;
            }
        };

        let mut action = self.factory.create(&schema);
        let binding = bind(&mut action, &result.entities, disambiguate);
        tracing::debug!(
            intent,
            instance = ?action.id,
            success = binding.success,
            "binding pass complete"
        );
        Some(action)
    }

    /// Re-validate a single parameter through the NLU service
    ///
    /// The stringified raw value is re-queried as fresh input text, so
    /// a user's free-text answer to one slot-filling prompt can turn
    /// out to be a new top-level intent. When the re-query lands on a
    /// different, non-fallback intent, a context switch is reported and
    /// the original parameter is left untouched; the caller decides
    /// whether to abandon the in-progress action. Otherwise only the
    /// named parameter is bound from the re-query's entities.
    ///
    /// Cancellation: the future performs no mutation before the NLU
    /// round trip resolves, so dropping it mid-flight leaves `action`
    /// untouched.
    pub async fn query_value_from_service<S: NluService>(
        &self,
        service: &S,
        action: &mut ActionInstance,
        param_name: &str,
        raw: &Value,
    ) -> Result<ResolutionOutcome> {
        if param_name.is_empty() {
            return Err(BindError::InvalidArgument("empty parameter name".into()));
        }
        let parameter = action
            .schema
            .parameter(param_name)
            .ok_or_else(|| {
                BindError::InvalidArgument(format!(
                    "No parameter '{}' on intent '{}'",
                    param_name, action.schema.intent_name
                ))
            })?
            .clone();

        let text = stringify(raw);
        if text.is_empty() {
            return Err(BindError::InvalidArgument("empty input value".into()));
        }

        let new_result = service.query(&text).await?;

        if let Some(new_intent) = new_result.best_intent() {
            if new_intent != action.schema.intent_name && new_intent != NONE_INTENT {
                tracing::debug!(
                    from = %action.schema.intent_name,
                    to = new_intent,
                    "context switch detected"
                );
                return Ok(ResolutionOutcome {
                    bound: false,
                    new_schema: self.registry.lookup(new_intent),
                    new_intent: Some(new_intent.to_string()),
                });
            }
        }

        let entities = propagate_resolutions(&new_result.entities);
        let bound = bind_parameter(action, &parameter, &entities, None);
        tracing::debug!(
            parameter = param_name,
            bound,
            "single-parameter re-bind complete"
        );
        Ok(ResolutionOutcome {
            bound,
            new_schema: None,
            new_intent: None,
        })
    }
}

/// Render a raw value as fresh NLU input text
fn stringify(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
