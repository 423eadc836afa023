//! TOML schema catalog
//!
//! Registry population is the caller's responsibility; this loader is
//! the canonical way to do it from a declarative catalog file:
//!
//! ```toml
//! [[action]]
//! intent = "BookFlight"
//!
//! [[action.param]]
//! name = "Destination"
//! type = "string"
//! custom_entity = "City.Destination"
//!
//! [[action.param]]
//! name = "Date"
//! type = "date"
//! builtin_entity = "builtin.datetimeV2.date"
//! ```
//!
//! Type strings: `string`, `integer`, `number`, `boolean`, `date`,
//! `enum(A|B|C)`; suffix `[]` for arrays and `?` for nullable, e.g.
//! `string[]`, `date?`. Contextual actions name their parent intent via
//! `parent` plus the receiving field via `context_parameter`.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use serde::Deserialize;

use crate::core::error::{BindError, Result};
use crate::core::types::{ScalarKind, ValueType};

use super::{ActionSchema, ParameterSchema};

/// Parsed schema catalog
#[derive(Debug)]
pub struct SchemaCatalog {
    pub schemas: Vec<Arc<ActionSchema>>,
}

impl SchemaCatalog {
    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let catalog: TomlCatalog =
            toml::from_str(content).map_err(|e| BindError::Catalog(e.to_string()))?;

        // Parents are linked by intent name, so children must resolve
        // after their parents. Iterate until no progress is made.
        let mut built: AHashMap<String, Arc<ActionSchema>> = AHashMap::new();
        let mut pending: Vec<&TomlAction> = catalog.action.iter().collect();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|&action| {
                let parent = match &action.parent {
                    Some(name) => match built.get(name) {
                        Some(schema) => Some(Arc::clone(schema)),
                        None => return true, // parent not built yet
                    },
                    None => None,
                };
                match build_schema(action, parent) {
                    Ok(schema) => {
                        built.insert(schema.intent_name.clone(), Arc::clone(&schema));
                        ordered.push(schema);
                        false
                    }
                    Err(_) => true,
                }
            });
            if pending.len() == before {
                // Re-run one stuck entry to surface its actual error
                let stuck = pending[0];
                let parent = match &stuck.parent {
                    Some(name) => Some(built.get(name).cloned().ok_or_else(|| {
                        BindError::Catalog(format!(
                            "Unknown or cyclic parent intent '{}' for '{}'",
                            name, stuck.intent
                        ))
                    })?),
                    None => None,
                };
                build_schema(stuck, parent)?;
                return Err(BindError::Catalog(format!(
                    "Catalog made no progress at intent '{}'",
                    stuck.intent
                )));
            }
        }

        Ok(Self { schemas: ordered })
    }
}

fn build_schema(
    action: &TomlAction,
    parent: Option<Arc<ActionSchema>>,
) -> Result<Arc<ActionSchema>> {
    let mut parameters = Vec::with_capacity(action.param.len());
    for param in &action.param {
        let value_type = parse_value_type(&param.value_type)?;
        parameters.push(ParameterSchema {
            name: param.name.clone(),
            value_type,
            custom_entity_type: param.custom_entity.clone(),
            builtin_entity_type: param.builtin_entity.clone(),
        });
    }

    let mut schema = ActionSchema::new(action.intent.clone(), parameters);
    if let Some(parent) = parent {
        let context_parameter = action.context_parameter.clone().ok_or_else(|| {
            BindError::Catalog(format!(
                "Action '{}' declares a parent but no context_parameter",
                action.intent
            ))
        })?;
        schema = schema.with_parent(parent, context_parameter);
    }
    if action.can_execute_without_context {
        schema = schema.allow_without_context();
    }
    Ok(Arc::new(schema))
}

/// Parse a catalog type string into a `ValueType`
fn parse_value_type(spec: &str) -> Result<ValueType> {
    let spec = spec.trim();
    if let Some(inner) = spec.strip_suffix('?') {
        return Ok(ValueType::Optional(Box::new(parse_value_type(inner)?)));
    }
    if let Some(inner) = spec.strip_suffix("[]") {
        return Ok(ValueType::Array(Box::new(parse_value_type(inner)?)));
    }
    if let Some(rest) = spec.strip_prefix("enum(") {
        let members = rest
            .strip_suffix(')')
            .ok_or_else(|| BindError::Catalog(format!("Unterminated enum type: {}", spec)))?;
        let members: Vec<String> = members
            .split('|')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if members.is_empty() {
            return Err(BindError::Catalog(format!("Empty enum type: {}", spec)));
        }
        return Ok(ValueType::Enum {
            name: spec.to_string(),
            members,
        });
    }

    let kind = match spec {
        "string" => ScalarKind::Text,
        "integer" => ScalarKind::Integer,
        "number" => ScalarKind::Float,
        "boolean" => ScalarKind::Boolean,
        "date" => ScalarKind::Date,
        other => {
            return Err(BindError::Catalog(format!("Unknown value type: {}", other)));
        }
    };
    Ok(ValueType::Scalar(kind))
}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    action: Vec<TomlAction>,
}

/// TOML representation of a single action schema
#[derive(Debug, Deserialize)]
struct TomlAction {
    intent: String,
    #[serde(default)]
    param: Vec<TomlParam>,
    parent: Option<String>,
    context_parameter: Option<String>,
    #[serde(default)]
    can_execute_without_context: bool,
}

#[derive(Debug, Deserialize)]
struct TomlParam {
    name: String,
    #[serde(rename = "type")]
    value_type: String,
    custom_entity: Option<String>,
    builtin_entity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_type_scalars() {
        assert_eq!(
            parse_value_type("string").unwrap(),
            ValueType::Scalar(ScalarKind::Text)
        );
        assert_eq!(
            parse_value_type("date").unwrap(),
            ValueType::Scalar(ScalarKind::Date)
        );
        assert!(parse_value_type("complex").is_err());
    }

    #[test]
    fn test_parse_value_type_compound() {
        assert_eq!(
            parse_value_type("integer[]").unwrap(),
            ValueType::Array(Box::new(ValueType::Scalar(ScalarKind::Integer)))
        );
        assert_eq!(
            parse_value_type("string?").unwrap(),
            ValueType::Optional(Box::new(ValueType::Scalar(ScalarKind::Text)))
        );
        let parsed = parse_value_type("enum(Morning|Evening)").unwrap();
        match parsed {
            ValueType::Enum { members, .. } => {
                assert_eq!(members, vec!["Morning".to_string(), "Evening".to_string()]);
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_catalog_with_parent() {
        let toml = r#"
            [[action]]
            intent = "BookFlight"

            [[action.param]]
            name = "Destination"
            type = "string"
            custom_entity = "City.Destination"

            [[action]]
            intent = "AddLuggage"
            parent = "BookFlight"
            context_parameter = "flight"

            [[action.param]]
            name = "Pieces"
            type = "integer"
        "#;

        let catalog = SchemaCatalog::parse_toml(toml).unwrap();
        assert_eq!(catalog.schemas.len(), 2);

        let luggage = catalog
            .schemas
            .iter()
            .find(|s| s.intent_name == "AddLuggage")
            .unwrap();
        assert!(luggage.is_contextual());
        assert_eq!(
            luggage.parent.as_ref().unwrap().intent_name,
            "BookFlight"
        );
    }

    #[test]
    fn test_parse_catalog_unknown_parent() {
        let toml = r#"
            [[action]]
            intent = "AddLuggage"
            parent = "BookFlight"
            context_parameter = "flight"
        "#;

        let result = SchemaCatalog::parse_toml(toml);
        assert!(result.is_err());
    }
}
