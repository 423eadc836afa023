//! Entity binding pipeline
//!
//! Binds recognized entities onto an action instance's typed
//! parameters: EntityRecommendation set -> matcher -> coercer -> field
//! assignment, with a cross-entity propagation pass up front.

pub mod binder;
pub mod matcher;

pub use binder::{bind, bind_parameter};
pub use matcher::{match_entities, DisambiguationFn, MatchOutcome};
