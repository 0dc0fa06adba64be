// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for value construction and projection.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MichelsonError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type MichelsonResult<T> = Result<T, MichelsonError>;

impl MichelsonError {
    /// Input matched none of the shapes a variant accepts.
    pub(crate) fn mismatch(variant: &str, expected: &str, actual: &Value) -> Self {
        MichelsonError::InvalidValue(format!(
            "{variant}: expected {expected}, got {}",
            json_kind(actual)
        ))
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mismatch_names_variant_and_kind() {
        let err = MichelsonError::mismatch("int", "{int} or number", &json!([1, 2]));
        assert_eq!(
            err.to_string(),
            "invalid value: int: expected {int} or number, got array"
        );
    }

    #[test]
    fn unsupported_display() {
        let err = MichelsonError::Unsupported("packing bool values".into());
        assert_eq!(err.to_string(), "unsupported: packing bool values");
    }
}
