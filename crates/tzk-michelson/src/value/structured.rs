// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Structured variants: pair, or, option, list/set, map.

use regex::Regex;
use serde_json::{json, Value};

use super::{deferred, source, wire_prim, Input, Mapper, OrValue, Source, TypedValue, ValueKind};
use crate::error::{MichelsonError, MichelsonResult};

static OPTION_NOTATION: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(?:Some\s+\(?(?P<value>.+?)\)?|None)$").expect("option notation regex")
});

static OR_NOTATION: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(?P<side>Left|Right)\s+\(?(?P<value>.+?)\)?$").expect("or notation regex")
});

impl TypedValue {
    /// `{prim: "Pair", args}` (n-ary args fold right), `[first, second, …]`,
    /// or a record object handed whole to both slots so each can pick its
    /// own annotated field.
    pub fn pair(input: impl Into<Input>, first: &Mapper, second: &Mapper) -> MichelsonResult<Self> {
        let value = match source(input.into(), "pair", |k| matches!(k, ValueKind::Pair(..)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };

        let (a, b) = match (wire_prim(&value), &value) {
            (Some(("Pair", args)), _) if args.len() >= 2 => {
                let rest = match &args[1..] {
                    [only] => only.clone(),
                    rest => json!({ "prim": "Pair", "args": rest }),
                };
                (args[0].clone(), rest)
            }
            (None, Value::Array(items)) if items.len() >= 2 => {
                let rest = match &items[1..] {
                    [only] => only.clone(),
                    rest => Value::Array(rest.to_vec()),
                };
                (items[0].clone(), rest)
            }
            (None, Value::Object(_)) => (value.clone(), value.clone()),
            _ => {
                return Err(MichelsonError::mismatch(
                    "pair",
                    "Pair node, array of at least 2 items or record object",
                    &value,
                ))
            }
        };

        Ok(TypedValue::new(ValueKind::Pair(
            deferred(first, Input::Json(a)),
            deferred(second, Input::Json(b)),
        )))
    }

    /// `Left`/`Right` nodes, `"Left (…)"` notation, `{"Left": v}` objects
    /// or `["Left", v]` tuples.
    pub fn or(input: impl Into<Input>, left: &Mapper, right: &Mapper) -> MichelsonResult<Self> {
        let value = match source(input.into(), "or", |k| matches!(k, ValueKind::Or(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };

        let branch = match (wire_prim(&value), &value) {
            (Some((side @ ("Left" | "Right"), [inner])), _) => Some((side, inner.clone())),
            (None, Value::String(text)) => OR_NOTATION.captures(text).and_then(|caps| {
                let side = match caps.name("side")?.as_str() {
                    "Left" => "Left",
                    _ => "Right",
                };
                Some((side, Value::String(caps.name("value")?.as_str().to_string())))
            }),
            (None, Value::Object(object)) if object.len() == 1 => object
                .iter()
                .find(|(k, _)| k.as_str() == "Left" || k.as_str() == "Right")
                .map(|(k, v)| (if k == "Left" { "Left" } else { "Right" }, v.clone())),
            (None, Value::Array(items)) => match items.as_slice() {
                [Value::String(side), inner] if side == "Left" || side == "Right" => {
                    Some((if side == "Left" { "Left" } else { "Right" }, inner.clone()))
                }
                _ => None,
            },
            _ => None,
        };

        match branch {
            Some(("Left", inner)) => Ok(TypedValue::new(ValueKind::Or(OrValue::Left(deferred(
                left,
                Input::Json(inner),
            ))))),
            Some((_, inner)) => Ok(TypedValue::new(ValueKind::Or(OrValue::Right(deferred(
                right,
                Input::Json(inner),
            ))))),
            None => Err(MichelsonError::mismatch(
                "or",
                "Left/Right node or notation",
                &value,
            )),
        }
    }

    /// `Some`/`None` nodes, `"Some (…)"`/`"None"` notation, `null` for
    /// none; any other value is taken as the inner value.
    pub fn option(input: impl Into<Input>, inner: &Mapper) -> MichelsonResult<Self> {
        let value = match source(input.into(), "option", |k| matches!(k, ValueKind::Option(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };

        let some = match (wire_prim(&value), &value) {
            (Some(("None", [])), _) | (None, Value::Null) => None,
            (Some(("Some", [v])), _) => Some(v.clone()),
            (Some((prim, _)), _) if prim == "Some" || prim == "None" => {
                return Err(MichelsonError::mismatch(
                    "option",
                    "Some with one argument or bare None",
                    &value,
                ))
            }
            (None, Value::String(text)) => match OPTION_NOTATION.captures(text) {
                Some(caps) => caps
                    .name("value")
                    .map(|v| Value::String(v.as_str().to_string())),
                None => Some(value.clone()),
            },
            _ => Some(value.clone()),
        };

        Ok(TypedValue::new(ValueKind::Option(
            some.map(|v| deferred(inner, Input::Json(v))),
        )))
    }

    /// Sequence node or native array; also used for `set`.
    pub fn list(input: impl Into<Input>, element: &Mapper) -> MichelsonResult<Self> {
        let value = match source(input.into(), "list", |k| matches!(k, ValueKind::List(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };
        match value {
            Value::Array(items) => Ok(TypedValue::new(ValueKind::List(
                items
                    .into_iter()
                    .map(|item| deferred(element, Input::Json(item)))
                    .collect(),
            ))),
            other => Err(MichelsonError::mismatch("list", "sequence or array", &other)),
        }
    }

    /// Sequence of `Elt` nodes, array of `[key, value]` pairs, or an object
    /// whose keys are handed to the key slot as strings.
    pub fn map(input: impl Into<Input>, key: &Mapper, value: &Mapper) -> MichelsonResult<Self> {
        let raw = match source(input.into(), "map", |k| matches!(k, ValueKind::Map(_)))? {
            Source::Typed(value) => return Ok(value),
            Source::Json(value) => value,
        };

        let entries: Vec<(Value, Value)> = match &raw {
            Value::Array(items) => items
                .iter()
                .map(|item| match (wire_prim(item), item) {
                    (Some(("Elt", [k, v])), _) => Some((k.clone(), v.clone())),
                    (None, Value::Array(pair)) if pair.len() == 2 => {
                        Some((pair[0].clone(), pair[1].clone()))
                    }
                    _ => None,
                })
                .collect::<Option<_>>()
                .ok_or_else(|| {
                    MichelsonError::mismatch("map", "Elt nodes or [key, value] pairs", &raw)
                })?,
            Value::Object(object) if wire_prim(&raw).is_none() => object
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
            _ => {
                return Err(MichelsonError::mismatch(
                    "map",
                    "Elt sequence, pair array or object",
                    &raw,
                ))
            }
        };

        Ok(TypedValue::new(ValueKind::Map(
            entries
                .into_iter()
                .map(|(k, v)| (deferred(key, Input::Json(k)), deferred(value, Input::Json(v))))
                .collect(),
        )))
    }
}
