//! Actionbind - intent-to-action resolution and entity binding
//!
//! Given an NLU recognition result (intent plus loosely-typed
//! entities), this crate selects the registered action schema for the
//! intent, binds entities onto the schema's typed parameters with
//! coercion and disambiguation, and resolves contextual actions that
//! chain onto a still-open parent action. It is the binding core of a
//! dialog system; the NLU service, schema discovery and dialog
//! management live outside it.

pub mod binding;
pub mod coerce;
pub mod context;
pub mod core;
pub mod nlu;
pub mod resolve;
pub mod schema;

pub use crate::core::{
    BindError, BindingResult, FieldValue, NluConfig, ResolutionOutcome, Result, ScalarKind,
    ValueType,
};
pub use binding::{bind, DisambiguationFn};
pub use nlu::{EntityRecommendation, IntentScore, NluClient, NluResult, NluService};
pub use resolve::ActionResolver;
pub use schema::{
    ActionFactory, ActionInstance, ActionSchema, DefaultActionFactory, ParameterSchema,
    SchemaCatalog, SchemaRegistry,
};
