//! Instance validation against published schemas
//!
//! Registration documents (agent cards, organizational metadata) are
//! validated against the JSON Schema resolved from the registry. Violations
//! are data, not errors; only a schema that fails to compile is an error.

use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;

use crate::error::{RegistryError, Result};

/// Validate an instance document against a schema document
///
/// Returns one human-readable message per violation; an empty list means the
/// instance is valid.
pub fn validate_instance(schema: &Value, instance: &Value) -> Result<Vec<String>> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|e| RegistryError::InvalidFormat(e.to_string()))?;

    let violations = match compiled.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    format!("(root): {}", e)
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect(),
    };
    Ok(violations)
}

/// Validate a JSON file on disk against a schema document
pub fn validate_file(schema: &Value, path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let instance: Value = serde_json::from_str(&content)?;
    validate_instance(schema, &instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_schema() -> Value {
        serde_json::json!({
            "title": "Agent",
            "type": "object",
            "required": ["name", "endpoint"],
            "properties": {
                "name": { "type": "string" },
                "endpoint": { "type": "string" }
            }
        })
    }

    #[test]
    fn test_valid_instance() {
        let instance = serde_json::json!({
            "name": "indexer",
            "endpoint": "https://agents.example/indexer"
        });
        let violations = validate_instance(&agent_schema(), &instance).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_invalid_instance_reports_violations() {
        let instance = serde_json::json!({ "name": 42 });
        let violations = validate_instance(&agent_schema(), &instance).unwrap();
        assert!(!violations.is_empty());
        assert!(violations.iter().any(|v| v.contains("endpoint")));
    }

    #[test]
    fn test_uncompilable_schema_is_error() {
        let schema = serde_json::json!({ "type": 5 });
        let err = validate_instance(&schema, &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)));
    }
}
