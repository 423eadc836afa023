//! Intent-name to action-schema lookup
//!
//! Built once at startup by an external discovery step, read-only
//! afterwards. Concurrent resolution calls share it behind `Arc`
//! without locking.

use std::sync::Arc;

use ahash::AHashMap;

use super::ActionSchema;

/// Registry of action schemas keyed by intent name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    by_intent: AHashMap<String, Arc<ActionSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its intent name
    ///
    /// A later registration for the same intent name replaces the
    /// earlier one; registration happens only during startup.
    pub fn register(&mut self, schema: Arc<ActionSchema>) {
        self.by_intent.insert(schema.intent_name.clone(), schema);
    }

    pub fn lookup(&self, intent_name: &str) -> Option<Arc<ActionSchema>> {
        self.by_intent.get(intent_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_intent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_intent.is_empty()
    }

    /// Build a registry from a parsed schema catalog
    pub fn from_catalog(schemas: Vec<Arc<ActionSchema>>) -> Self {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema);
        }
        registry
    }
}
