// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Native projection of a typed value.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use serde_json::{json, Value};

/// What application code sees after [`TypedValue::as_raw_value`](super::TypedValue::as_raw_value).
///
/// | Michelson | Raw |
/// |---|---|
/// | int / nat / mutez | `Int` |
/// | string, address, bytes (hex) | `String` |
/// | unit, `None` | `Unit` |
/// | pair | 2-element `List`, or a merged `Object` when both sides are named |
/// | list / set | `List` |
/// | map | `Map` |
/// | anything named | `Object { name: … }` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Unit,
    Int(BigInt),
    String(String),
    Bool(bool),
    List(Vec<RawValue>),
    Object(BTreeMap<String, RawValue>),
    Map(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    pub fn named(name: impl Into<String>, value: RawValue) -> Self {
        let mut object = BTreeMap::new();
        object.insert(name.into(), value);
        RawValue::Object(object)
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        match self {
            RawValue::Object(object) => object.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            RawValue::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, RawValue>> {
        match self {
            RawValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, RawValue::Unit)
    }

    /// JSON rendering for UI layers. Integers become decimal strings so
    /// no precision is lost; maps become `[key, value]` pairs.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Unit => Value::Null,
            RawValue::Int(n) => Value::String(n.to_string()),
            RawValue::String(s) => Value::String(s.clone()),
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::List(items) => Value::Array(items.iter().map(RawValue::to_json).collect()),
            RawValue::Object(object) => Value::Object(
                object
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            RawValue::Map(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                    .collect(),
            ),
        }
    }
}
