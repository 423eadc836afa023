//! Action instance construction
//!
//! Instantiation is behind a trait so callers can attach their own
//! allocation or default-field policy per schema; the default factory
//! produces an instance with every field unset.

use std::sync::Arc;

use super::{ActionInstance, ActionSchema};

/// Creates action instances for a schema
pub trait ActionFactory {
    fn create(&self, schema: &Arc<ActionSchema>) -> ActionInstance;
}

/// Factory producing all-fields-unset instances
#[derive(Debug, Default)]
pub struct DefaultActionFactory;

impl ActionFactory for DefaultActionFactory {
    fn create(&self, schema: &Arc<ActionSchema>) -> ActionInstance {
        ActionInstance::new(Arc::clone(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ScalarKind, ValueType};
    use crate::schema::ParameterSchema;

    #[test]
    fn test_default_factory_creates_unset_instance() {
        let schema = Arc::new(ActionSchema::new(
            "BookFlight",
            vec![ParameterSchema::new(
                "Destination",
                ValueType::Scalar(ScalarKind::Text),
            )],
        ));

        let factory = DefaultActionFactory;
        let action = factory.create(&schema);

        assert!(action.fields.is_empty());
        assert!(action.context.is_none());
        assert_eq!(action.schema.intent_name, "BookFlight");
    }
}
