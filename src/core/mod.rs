pub mod config;
pub mod error;
pub mod types;

pub use config::NluConfig;
pub use error::{BindError, Result};
pub use types::{BindingResult, FieldValue, InstanceId, ResolutionOutcome, ScalarKind, ValueType};
