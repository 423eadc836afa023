//! Action schemas and schema-typed action instances
//!
//! Schemas are plain data, declared once and registered at process
//! start; instances are created per resolution call and mutated
//! field-by-field by the entity binder.

pub mod catalog;
pub mod factory;
pub mod registry;

pub use catalog::SchemaCatalog;
pub use factory::{ActionFactory, DefaultActionFactory};
pub use registry::SchemaRegistry;

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{FieldValue, InstanceId, ValueType};

/// Declared metadata for one action parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Field name on the action instance
    pub name: String,
    /// Declared type, drives coercion
    pub value_type: ValueType,
    /// Custom (domain) entity type preferred during matching
    pub custom_entity_type: Option<String>,
    /// Builtin NLU entity type matched as a last resort
    pub builtin_entity_type: Option<String>,
}

impl ParameterSchema {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            custom_entity_type: None,
            builtin_entity_type: None,
        }
    }

    pub fn with_custom_type(mut self, entity_type: impl Into<String>) -> Self {
        self.custom_entity_type = Some(entity_type.into());
        self
    }

    pub fn with_builtin_type(mut self, entity_type: impl Into<String>) -> Self {
        self.builtin_entity_type = Some(entity_type.into());
        self
    }

    /// True if the declared type (after unwrapping Optional) is an array
    pub fn is_array(&self) -> bool {
        self.value_type.is_array()
    }
}

/// Static description of one action, keyed by intent name
///
/// A schema is *contextual* when it declares a parent schema: such an
/// action can only execute chained onto a still-open instance of the
/// parent, unless `can_execute_without_context` allows standalone use.
#[derive(Debug)]
pub struct ActionSchema {
    pub intent_name: String,
    pub parameters: Vec<ParameterSchema>,
    /// Declared parent schema for contextual actions
    pub parent: Option<Arc<ActionSchema>>,
    /// Name of the field that receives the parent instance
    pub context_parameter: Option<String>,
    /// Whether a contextual action may start with no live parent
    pub can_execute_without_context: bool,
}

impl ActionSchema {
    pub fn new(intent_name: impl Into<String>, parameters: Vec<ParameterSchema>) -> Self {
        Self {
            intent_name: intent_name.into(),
            parameters,
            parent: None,
            context_parameter: None,
            can_execute_without_context: false,
        }
    }

    pub fn with_parent(
        mut self,
        parent: Arc<ActionSchema>,
        context_parameter: impl Into<String>,
    ) -> Self {
        self.parent = Some(parent);
        self.context_parameter = Some(context_parameter.into());
        self
    }

    pub fn allow_without_context(mut self) -> Self {
        self.can_execute_without_context = true;
        self
    }

    pub fn is_contextual(&self) -> bool {
        self.parent.is_some()
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A schema-typed record holding current field values
///
/// Fields absent from the map are unset. One instance is threaded by
/// the caller through successive binding passes during multi-turn
/// form-fill; this crate keeps no state between calls.
#[derive(Debug, Clone)]
pub struct ActionInstance {
    pub id: InstanceId,
    pub schema: Arc<ActionSchema>,
    pub fields: AHashMap<String, FieldValue>,
    /// Parent instance for contextual actions, attached by pairing
    /// validation and never replaced afterwards
    pub context: Option<Box<ActionInstance>>,
}

impl ActionInstance {
    pub fn new(schema: Arc<ActionSchema>) -> Self {
        Self {
            id: InstanceId::new(),
            schema,
            fields: AHashMap::new(),
            context: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of schema parameters with no bound value yet
    pub fn unset_parameters(&self) -> Vec<&str> {
        self.schema
            .parameters
            .iter()
            .filter(|p| !self.fields.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect()
    }
}
