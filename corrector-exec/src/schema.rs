//! JSON Schema gates on request payloads and transformed responses.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaViolation {
    /// JSON pointer into the checked value; empty for the root.
    #[serde(rename = "instancePath")]
    pub instance_path: String,
    pub message: String,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid JSON Schema: {0}")]
pub struct SchemaError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<SchemaViolation>,
}

pub struct SchemaValidator {
    inner: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn compile(schema: &JsonValue) -> Result<Self, SchemaError> {
        let inner = jsonschema::validator_for(schema).map_err(|e| SchemaError(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn validate(&self, value: &JsonValue) -> SchemaReport {
        let errors: Vec<SchemaViolation> = self
            .inner
            .iter_errors(value)
            .map(|e| SchemaViolation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        SchemaReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Compile and validate in one go.
pub fn check(schema: &JsonValue, value: &JsonValue) -> Result<SchemaReport, SchemaError> {
    Ok(SchemaValidator::compile(schema)?.validate(value))
}
