// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Leaf variants: int, string, bytes, bool, unit, address.

use num_bigint::BigInt;
use serde_json::Value;

use super::{source, wire_leaf, wire_prim, Address, Input, Source, TypedValue, ValueKind};
use crate::error::{MichelsonError, MichelsonResult};

const ADDRESS_PREFIXES: &[&str] = &["tz1", "tz2", "tz3", "tz4", "KT1", "sr1", "txr1"];

/// Binary addresses are a tag byte plus a 21-byte payload.
const RAW_ADDRESS_LEN: usize = 22;

impl TypedValue {
    pub fn int(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "int", |k| matches!(k, ValueKind::Int(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        if let Some(int) = wire_leaf(&value, "int") {
            return Ok(TypedValue::new(ValueKind::Int(parse_int(int)?)));
        }
        let n = match &value {
            Value::Number(n) => n
                .as_i64()
                .map(BigInt::from)
                .or_else(|| n.as_u64().map(BigInt::from)),
            Value::String(s) => Some(parse_int(s)?),
            _ => None,
        };
        n.map(|n| TypedValue::new(ValueKind::Int(n)))
            .ok_or_else(|| MichelsonError::mismatch("int", "{int}, integer or decimal string", &value))
    }

    pub fn string(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "string", |k| matches!(k, ValueKind::String(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        if let Some(s) = wire_leaf(&value, "string") {
            return Ok(TypedValue::new(ValueKind::String(s.to_string())));
        }
        match value {
            Value::String(s) => Ok(TypedValue::new(ValueKind::String(s))),
            other => Err(MichelsonError::mismatch("string", "{string} or string", &other)),
        }
    }

    pub fn bytes(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "bytes", |k| matches!(k, ValueKind::Bytes(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        if let Some(hex) = wire_leaf(&value, "bytes") {
            return Ok(TypedValue::new(ValueKind::Bytes(parse_hex(hex)?)));
        }
        let bytes = match &value {
            Value::String(s) => Some(parse_hex(s)?),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>(),
            _ => None,
        };
        bytes
            .map(|b| TypedValue::new(ValueKind::Bytes(b)))
            .ok_or_else(|| MichelsonError::mismatch("bytes", "{bytes}, hex string or byte array", &value))
    }

    pub fn bool(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "bool", |k| matches!(k, ValueKind::Bool(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        let b = match (wire_prim(&value), &value) {
            (Some(("True", [])), _) => Some(true),
            (Some(("False", [])), _) => Some(false),
            (None, Value::Bool(b)) => Some(*b),
            (None, Value::String(s)) if s == "true" => Some(true),
            (None, Value::String(s)) if s == "false" => Some(false),
            _ => None,
        };
        b.map(|b| TypedValue::new(ValueKind::Bool(b)))
            .ok_or_else(|| MichelsonError::mismatch("bool", "True/False or boolean", &value))
    }

    pub fn unit(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "unit", |k| matches!(k, ValueKind::Unit))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        match (wire_prim(&value), &value) {
            (Some(("Unit", [])), _) | (None, Value::Null) => Ok(TypedValue::new(ValueKind::Unit)),
            _ => Err(MichelsonError::mismatch("unit", "Unit or null", &value)),
        }
    }

    pub fn address(input: impl Into<Input>) -> MichelsonResult<Self> {
        let value = match source(input.into(), "address", |k| matches!(k, ValueKind::Address(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        if let Some(s) = wire_leaf(&value, "string") {
            return Ok(TypedValue::new(ValueKind::Address(Address::Encoded(s.to_string()))));
        }
        if let Some(hex) = wire_leaf(&value, "bytes") {
            return Ok(TypedValue::new(ValueKind::Address(Address::Raw(parse_hex(hex)?))));
        }
        if let Value::String(s) = &value {
            if ADDRESS_PREFIXES.iter().any(|prefix| s.starts_with(prefix)) {
                return Ok(TypedValue::new(ValueKind::Address(Address::Encoded(s.clone()))));
            }
            if let Ok(bytes) = parse_hex(s) {
                if bytes.len() == RAW_ADDRESS_LEN {
                    return Ok(TypedValue::new(ValueKind::Address(Address::Raw(bytes))));
                }
            }
        }
        Err(MichelsonError::mismatch(
            "address",
            "{string}, {bytes}, tz/KT address or 22-byte hex",
            &value,
        ))
    }

    /// `key` and `signature`: kept in whichever form the node or caller used.
    pub fn string_or_bytes(input: impl Into<Input>) -> MichelsonResult<Self> {
        let input = input.into();
        match &input {
            Input::Json(value) if wire_leaf(value, "bytes").is_some() => Self::bytes(input),
            Input::Typed(value) if matches!(value.kind, ValueKind::Bytes(_)) => Ok(value.clone()),
            _ => Self::string(input),
        }
    }

    /// `timestamp`: seconds since epoch as an int, or an RFC 3339 string.
    pub fn timestamp(input: impl Into<Input>) -> MichelsonResult<Self> {
        let input = input.into();
        let numeric = match &input {
            Input::Typed(value) => matches!(value.kind, ValueKind::Int(_)),
            Input::Json(value) => {
                wire_leaf(value, "int").is_some()
                    || value.is_number()
                    || value.as_str().is_some_and(|s| parse_int(s).is_ok())
            }
        };
        if numeric {
            Self::int(input)
        } else {
            Self::string(input)
        }
    }
}

pub(crate) fn parse_int(s: &str) -> MichelsonResult<BigInt> {
    s.trim()
        .parse::<BigInt>()
        .map_err(|_| MichelsonError::InvalidValue(format!("int: `{s}` is not a decimal integer")))
}

pub(crate) fn parse_hex(s: &str) -> MichelsonResult<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .map_err(|e| MichelsonError::InvalidValue(format!("bytes: `{s}` is not hex ({e})")))
}
