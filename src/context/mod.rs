//! Contextual action resolution
//!
//! A contextual action depends on a still-open parent action: "add a
//! meal" only makes sense chained onto an in-progress flight booking.
//! This module validates parent/child pairings and can synthesize a
//! missing parent chain bottom-up.

use crate::core::error::{BindError, Result};
use crate::schema::{ActionFactory, ActionInstance, ActionSchema};

/// True if the schema declares a required parent action
pub fn is_contextual(schema: &ActionSchema) -> bool {
    schema.is_contextual()
}

/// Whether an action of this schema may start with no live parent
pub fn can_start_without_context(schema: &ActionSchema) -> bool {
    if !schema.is_contextual() {
        return true;
    }
    schema.can_execute_without_context
}

/// Validate a child/parent pairing and attach the parent on success
///
/// The pairing is valid only when the child's declared parent schema
/// matches the parent instance's schema exactly; there is no
/// polymorphic acceptance of other schemas. A parent reference already
/// attached by an earlier validation is never replaced.
pub fn is_valid_contextual_pairing(child: &mut ActionInstance, parent: &ActionInstance) -> bool {
    let declared = match &child.schema.parent {
        Some(declared) => declared,
        None => return false,
    };

    if declared.intent_name != parent.schema.intent_name {
        return false;
    }

    if child.context.is_none() {
        tracing::debug!(
            child = %child.schema.intent_name,
            parent = %parent.schema.intent_name,
            "attaching parent context"
        );
        child.context = Some(Box::new(parent.clone()));
    }
    true
}

/// Synthesize the missing parent chain for a contextual child
///
/// Instantiates a default instance of the declared parent schema,
/// attaches it to the child, and recurses bottom-up while the parent
/// schema is itself contextual. Returns the (chain-complete) parent
/// instance and its intent name so the caller can run its own binding
/// pass over it.
pub fn build_synthetic_parent(
    child: &mut ActionInstance,
    factory: &dyn ActionFactory,
) -> Result<(ActionInstance, String)> {
    let declared = child.schema.parent.clone().ok_or_else(|| {
        BindError::InvalidArgument(format!(
            "Action '{}' is not contextual",
            child.schema.intent_name
        ))
    })?;

    let mut parent = factory.create(&declared);
    if parent.schema.is_contextual() {
        build_synthetic_parent(&mut parent, factory)?;
    }

    let intent_name = parent.schema.intent_name.clone();
    if !is_valid_contextual_pairing(child, &parent) {
        // The factory returned an instance of a different schema
        return Err(BindError::InvalidArgument(format!(
            "Factory produced '{}' where '{}' was declared",
            parent.schema.intent_name, declared.intent_name
        )));
    }

    tracing::debug!(
        child = %child.schema.intent_name,
        parent = %intent_name,
        "synthesized parent context"
    );
    Ok((parent, intent_name))
}

/// Decide whether a child can chain onto an in-progress action
///
/// Returns `(accepted, parent_is_contextual)`. A non-contextual
/// in-progress action accepts the child trivially; an in-progress
/// action that is itself contextual validates the child one level up,
/// against its own attached parent.
pub fn update_if_valid_contextual_action(
    child: &mut ActionInstance,
    existing_parent: &ActionInstance,
) -> (bool, bool) {
    if !existing_parent.schema.is_contextual() {
        return (true, false);
    }

    match &existing_parent.context {
        Some(grandparent) => {
            let accepted = is_valid_contextual_pairing(child, grandparent);
            (accepted, true)
        }
        None => (false, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DefaultActionFactory, ParameterSchema};
    use crate::core::types::{ScalarKind, ValueType};
    use std::sync::Arc;

    fn book_flight() -> Arc<ActionSchema> {
        Arc::new(ActionSchema::new(
            "BookFlight",
            vec![ParameterSchema::new(
                "Destination",
                ValueType::Scalar(ScalarKind::Text),
            )],
        ))
    }

    fn add_meal(parent: Arc<ActionSchema>) -> Arc<ActionSchema> {
        Arc::new(ActionSchema::new("AddMeal", vec![]).with_parent(parent, "flight"))
    }

    #[test]
    fn test_contextual_flags() {
        let flight = book_flight();
        let meal = add_meal(flight.clone());

        assert!(!is_contextual(&flight));
        assert!(is_contextual(&meal));
        assert!(can_start_without_context(&flight));
        assert!(!can_start_without_context(&meal));

        let standalone = Arc::new(
            ActionSchema::new("AddMeal", vec![])
                .with_parent(book_flight(), "flight")
                .allow_without_context(),
        );
        assert!(can_start_without_context(&standalone));
    }

    #[test]
    fn test_pairing_requires_exact_schema() {
        let flight = book_flight();
        let other = Arc::new(ActionSchema::new("RentCar", vec![]));
        let mut meal = ActionInstance::new(add_meal(flight.clone()));

        let wrong_parent = ActionInstance::new(other);
        assert!(!is_valid_contextual_pairing(&mut meal, &wrong_parent));
        assert!(meal.context.is_none());

        let right_parent = ActionInstance::new(flight);
        assert!(is_valid_contextual_pairing(&mut meal, &right_parent));
        assert_eq!(
            meal.context.as_ref().unwrap().schema.intent_name,
            "BookFlight"
        );
    }

    #[test]
    fn test_validated_parent_never_replaced() {
        let flight = book_flight();
        let mut meal = ActionInstance::new(add_meal(flight.clone()));

        let first = ActionInstance::new(flight.clone());
        let first_id = first.id;
        assert!(is_valid_contextual_pairing(&mut meal, &first));

        let second = ActionInstance::new(flight);
        assert!(is_valid_contextual_pairing(&mut meal, &second));
        assert_eq!(meal.context.as_ref().unwrap().id, first_id);
    }

    #[test]
    fn test_build_synthetic_parent() {
        let mut meal = ActionInstance::new(add_meal(book_flight()));
        let factory = DefaultActionFactory;

        let (parent, intent) = build_synthetic_parent(&mut meal, &factory).unwrap();
        assert_eq!(intent, "BookFlight");
        assert!(parent.fields.is_empty());
        assert!(meal.context.is_some());
    }

    #[test]
    fn test_build_synthetic_parent_chain() {
        // AddDrink -> AddMeal -> BookFlight, two levels synthesized
        let flight = book_flight();
        let meal = add_meal(flight);
        let drink = Arc::new(ActionSchema::new("AddDrink", vec![]).with_parent(meal, "meal"));

        let mut action = ActionInstance::new(drink);
        let factory = DefaultActionFactory;
        let (parent, intent) = build_synthetic_parent(&mut action, &factory).unwrap();

        assert_eq!(intent, "AddMeal");
        assert_eq!(
            parent.context.as_ref().unwrap().schema.intent_name,
            "BookFlight"
        );
    }

    #[test]
    fn test_build_synthetic_parent_rejects_root_action() {
        let mut flight = ActionInstance::new(book_flight());
        let factory = DefaultActionFactory;
        assert!(build_synthetic_parent(&mut flight, &factory).is_err());
    }

    #[test]
    fn test_update_with_non_contextual_parent_is_trivial() {
        let flight = book_flight();
        let mut meal = ActionInstance::new(add_meal(flight.clone()));
        let in_progress = ActionInstance::new(flight);

        let (accepted, parent_contextual) =
            update_if_valid_contextual_action(&mut meal, &in_progress);
        assert!(accepted);
        assert!(!parent_contextual);
    }

    #[test]
    fn test_update_recurses_one_level_up() {
        // In-progress AddMeal (itself contextual, parented to a
        // BookFlight); a new AddMeal chains onto the same grandparent.
        let flight = book_flight();
        let meal_schema = add_meal(flight.clone());

        let mut in_progress = ActionInstance::new(meal_schema.clone());
        let live_flight = ActionInstance::new(flight);
        assert!(is_valid_contextual_pairing(&mut in_progress, &live_flight));

        let mut incoming = ActionInstance::new(meal_schema);
        let (accepted, parent_contextual) =
            update_if_valid_contextual_action(&mut incoming, &in_progress);
        assert!(accepted);
        assert!(parent_contextual);
        assert_eq!(
            incoming.context.as_ref().unwrap().schema.intent_name,
            "BookFlight"
        );
    }

    #[test]
    fn test_update_rejects_detached_contextual_parent() {
        let flight = book_flight();
        let meal_schema = add_meal(flight);

        let in_progress = ActionInstance::new(meal_schema.clone());
        let mut incoming = ActionInstance::new(meal_schema);

        let (accepted, parent_contextual) =
            update_if_valid_contextual_action(&mut incoming, &in_progress);
        assert!(!accepted);
        assert!(parent_contextual);
    }
}
