// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed Michelson values.
//!
//! Every variant is built through a constructor that tries, in order:
//!
//! 1. an already-typed [`TypedValue`] of the same variant (returned as-is),
//! 2. the variant's Micheline data shape (`{int}`, `{prim: "Pair"}`, …),
//! 3. a permissive native conversion (numbers, strings, arrays, objects).
//!
//! Structured variants take a [`Mapper`] per slot to build their children;
//! children are deferred behind [`Lazy`] until forced by [`TypedValue::eval`]
//! or one of the projections.

mod primitive;
mod raw;
mod structured;

use std::sync::Arc;

use num_bigint::BigInt;
use serde_json::Value;

use crate::error::{MichelsonError, MichelsonResult};
use crate::lazy::Lazy;
use crate::micheline::Micheline;

pub use raw::RawValue;

/// Deferred child of a structured value.
pub type Child = Arc<Lazy<MichelsonResult<TypedValue>>>;

/// Builds the value for one structural slot (usually a schema generic).
pub type Mapper = Arc<dyn Fn(Input) -> MichelsonResult<TypedValue> + Send + Sync>;

/// Anything a value can be constructed from.
#[derive(Debug, Clone)]
pub enum Input {
    Typed(TypedValue),
    /// Micheline data or a native value, told apart by shape.
    Json(Value),
}

impl Input {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Input::Json(value) => Some(value),
            Input::Typed(_) => None,
        }
    }
}

impl From<TypedValue> for Input {
    fn from(value: TypedValue) -> Self {
        Input::Typed(value)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Json(value)
    }
}

impl From<Micheline> for Input {
    fn from(node: Micheline) -> Self {
        Input::Json(node.to_json())
    }
}

impl From<&Micheline> for Input {
    fn from(node: &Micheline) -> Self {
        Input::Json(node.to_json())
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Json(Value::String(value.to_string()))
    }
}

impl From<i64> for Input {
    fn from(value: i64) -> Self {
        Input::Json(Value::from(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Json(Value::Bool(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Base58 form (`tz1…`, `KT1…`), optionally with a `%entrypoint` suffix.
    Encoded(String),
    /// Binary form as it appears in `{bytes}` nodes.
    Raw(Vec<u8>),
}

#[derive(Debug, Clone)]
pub enum OrValue {
    Left(Child),
    Right(Child),
}

impl OrValue {
    pub fn child(&self) -> &Child {
        match self {
            OrValue::Left(child) | OrValue::Right(child) => child,
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, OrValue::Left(_))
    }
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Int(BigInt),
    String(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Unit,
    Address(Address),
    Option(Option<Child>),
    Or(OrValue),
    Pair(Child, Child),
    /// Also used for `set`.
    List(Vec<Child>),
    Map(Vec<(Child, Child)>),
}

#[derive(Debug, Clone)]
pub struct TypedValue {
    name: Option<String>,
    kind: ValueKind,
}

impl TypedValue {
    pub fn new(kind: ValueKind) -> Self {
        Self { name: None, kind }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn variant_name(&self) -> &'static str {
        match self.kind {
            ValueKind::Int(_) => "int",
            ValueKind::String(_) => "string",
            ValueKind::Bytes(_) => "bytes",
            ValueKind::Bool(_) => "bool",
            ValueKind::Unit => "unit",
            ValueKind::Address(_) => "address",
            ValueKind::Option(_) => "option",
            ValueKind::Or(_) => "or",
            ValueKind::Pair(..) => "pair",
            ValueKind::List(_) => "list",
            ValueKind::Map(_) => "map",
        }
    }

    /// Force every deferred child, recursively.
    pub fn eval(&self) -> MichelsonResult<()> {
        match &self.kind {
            ValueKind::Option(Some(child)) => force(child)?.eval(),
            ValueKind::Or(or) => force(or.child())?.eval(),
            ValueKind::Pair(first, second) => {
                force(first)?.eval()?;
                force(second)?.eval()
            }
            ValueKind::List(items) => items.iter().try_for_each(|item| force(item)?.eval()),
            ValueKind::Map(entries) => entries.iter().try_for_each(|(key, value)| {
                force(key)?.eval()?;
                force(value)?.eval()
            }),
            _ => Ok(()),
        }
    }

    /// Native projection. Named values are wrapped as `{ name: value }`;
    /// a pair whose sides both project to objects becomes their merge.
    pub fn as_raw_value(&self) -> MichelsonResult<RawValue> {
        let raw = match &self.kind {
            ValueKind::Int(n) => RawValue::Int(n.clone()),
            ValueKind::String(s) => RawValue::String(s.clone()),
            ValueKind::Bytes(bytes) => RawValue::String(hex::encode(bytes)),
            ValueKind::Bool(b) => RawValue::Bool(*b),
            ValueKind::Unit => RawValue::Unit,
            ValueKind::Address(Address::Encoded(s)) => RawValue::String(s.clone()),
            ValueKind::Address(Address::Raw(bytes)) => RawValue::String(hex::encode(bytes)),
            ValueKind::Option(None) => RawValue::Unit,
            ValueKind::Option(Some(child)) => force(child)?.as_raw_value()?,
            ValueKind::Or(or) => force(or.child())?.as_raw_value()?,
            ValueKind::Pair(first, second) => {
                let first = force(first)?.as_raw_value()?;
                let second = force(second)?.as_raw_value()?;
                match (first, second) {
                    (RawValue::Object(mut merged), RawValue::Object(rest)) => {
                        merged.extend(rest);
                        RawValue::Object(merged)
                    }
                    (first, second) => RawValue::List(vec![first, second]),
                }
            }
            ValueKind::List(items) => RawValue::List(
                items
                    .iter()
                    .map(|item| force(item)?.as_raw_value())
                    .collect::<MichelsonResult<_>>()?,
            ),
            ValueKind::Map(entries) => RawValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| {
                        Ok((force(key)?.as_raw_value()?, force(value)?.as_raw_value()?))
                    })
                    .collect::<MichelsonResult<_>>()?,
            ),
        };

        Ok(match &self.name {
            Some(name) => RawValue::named(name.clone(), raw),
            None => raw,
        })
    }

    /// Wire projection, ready to send back to a node.
    pub fn to_micheline(&self) -> MichelsonResult<Micheline> {
        let node = match &self.kind {
            ValueKind::Int(n) => Micheline::int(n),
            ValueKind::String(s) => Micheline::string(s.clone()),
            ValueKind::Bytes(bytes) => Micheline::bytes(bytes),
            ValueKind::Bool(true) => Micheline::prim("True", vec![]),
            ValueKind::Bool(false) => Micheline::prim("False", vec![]),
            ValueKind::Unit => Micheline::prim("Unit", vec![]),
            ValueKind::Address(Address::Encoded(s)) => Micheline::string(s.clone()),
            ValueKind::Address(Address::Raw(bytes)) => Micheline::bytes(bytes),
            ValueKind::Option(None) => Micheline::prim("None", vec![]),
            ValueKind::Option(Some(child)) => {
                Micheline::prim("Some", vec![force(child)?.to_micheline()?])
            }
            ValueKind::Or(OrValue::Left(child)) => {
                Micheline::prim("Left", vec![force(child)?.to_micheline()?])
            }
            ValueKind::Or(OrValue::Right(child)) => {
                Micheline::prim("Right", vec![force(child)?.to_micheline()?])
            }
            ValueKind::Pair(first, second) => Micheline::prim(
                "Pair",
                vec![force(first)?.to_micheline()?, force(second)?.to_micheline()?],
            ),
            ValueKind::List(items) => Micheline::Seq(
                items
                    .iter()
                    .map(|item| force(item)?.to_micheline())
                    .collect::<MichelsonResult<_>>()?,
            ),
            ValueKind::Map(entries) => Micheline::Seq(
                entries
                    .iter()
                    .map(|(key, value)| {
                        Ok(Micheline::prim(
                            "Elt",
                            vec![force(key)?.to_micheline()?, force(value)?.to_micheline()?],
                        ))
                    })
                    .collect::<MichelsonResult<_>>()?,
            ),
        };
        Ok(node)
    }

    /// Build a value from wire data alone, without a schema.
    ///
    /// Strings stay strings (no address detection) and a non-empty
    /// sequence made only of `Elt` nodes is read as a map.
    pub fn infer(node: &Micheline) -> MichelsonResult<TypedValue> {
        let kind = match node {
            Micheline::Int { int } => ValueKind::Int(primitive::parse_int(int)?),
            Micheline::String { string } => ValueKind::String(string.clone()),
            Micheline::Bytes { bytes } => ValueKind::Bytes(primitive::parse_hex(bytes)?),
            Micheline::Prim { prim, args, .. } => match (prim.as_str(), args.as_slice()) {
                ("True", []) => ValueKind::Bool(true),
                ("False", []) => ValueKind::Bool(false),
                ("Unit", []) => ValueKind::Unit,
                ("None", []) => ValueKind::Option(None),
                ("Some", [inner]) => ValueKind::Option(Some(ready(Self::infer(inner)?))),
                ("Left", [inner]) => ValueKind::Or(OrValue::Left(ready(Self::infer(inner)?))),
                ("Right", [inner]) => ValueKind::Or(OrValue::Right(ready(Self::infer(inner)?))),
                ("Pair", [first, rest @ ..]) if !rest.is_empty() => {
                    let second = match rest {
                        [only] => Self::infer(only)?,
                        _ => Self::infer(&Micheline::prim("Pair", rest.to_vec()))?,
                    };
                    ValueKind::Pair(ready(Self::infer(first)?), ready(second))
                }
                _ => {
                    return Err(MichelsonError::Unsupported(format!(
                        "cannot infer a value for `{prim}` with {} arguments",
                        args.len()
                    )))
                }
            },
            Micheline::Seq(items) => {
                let is_map = !items.is_empty()
                    && items.iter().all(|item| {
                        matches!(item.as_prim(), Some(("Elt", args, _)) if args.len() == 2)
                    });
                if is_map {
                    ValueKind::Map(
                        items
                            .iter()
                            .filter_map(Micheline::as_prim)
                            .map(|(_, args, _)| {
                                Ok((ready(Self::infer(&args[0])?), ready(Self::infer(&args[1])?)))
                            })
                            .collect::<MichelsonResult<_>>()?,
                    )
                } else {
                    ValueKind::List(
                        items
                            .iter()
                            .map(|item| Ok(ready(Self::infer(item)?)))
                            .collect::<MichelsonResult<_>>()?,
                    )
                }
            }
        };
        Ok(TypedValue::new(kind))
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.kind, &other.kind) {
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a == b,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::Unit, ValueKind::Unit) => true,
            (ValueKind::Address(a), ValueKind::Address(b)) => a == b,
            (ValueKind::Option(None), ValueKind::Option(None)) => true,
            (ValueKind::Option(Some(a)), ValueKind::Option(Some(b))) => child_eq(a, b),
            (ValueKind::Or(OrValue::Left(a)), ValueKind::Or(OrValue::Left(b)))
            | (ValueKind::Or(OrValue::Right(a)), ValueKind::Or(OrValue::Right(b))) => {
                child_eq(a, b)
            }
            (ValueKind::Pair(a1, a2), ValueKind::Pair(b1, b2)) => {
                child_eq(a1, b1) && child_eq(a2, b2)
            }
            (ValueKind::List(a), ValueKind::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| child_eq(x, y))
            }
            (ValueKind::Map(a), ValueKind::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| child_eq(ka, kb) && child_eq(va, vb))
            }
            _ => false,
        }
    }
}

fn child_eq(a: &Child, b: &Child) -> bool {
    Arc::ptr_eq(a, b) || matches!((a.get(), b.get()), (Ok(x), Ok(y)) if x == y)
}

pub(crate) fn force(child: &Child) -> MichelsonResult<&TypedValue> {
    child.get().as_ref().map_err(Clone::clone)
}

pub(crate) fn ready(value: TypedValue) -> Child {
    Arc::new(Lazy::ready(Ok(value)))
}

pub(crate) fn deferred(mapper: &Mapper, input: Input) -> Child {
    let mapper = Arc::clone(mapper);
    Arc::new(Lazy::new(move || mapper(input)))
}

/// Outcome of the "already typed?" check every constructor starts with.
pub(crate) enum Source {
    Typed(TypedValue),
    Json(Value),
}

pub(crate) fn source(
    input: Input,
    variant: &str,
    accepts: fn(&ValueKind) -> bool,
) -> MichelsonResult<Source> {
    match input {
        Input::Typed(value) if accepts(&value.kind) => Ok(Source::Typed(value)),
        Input::Typed(value) => Err(MichelsonError::InvalidValue(format!(
            "{variant}: expected a {variant} value, got typed {}",
            value.variant_name()
        ))),
        Input::Json(value) => Ok(Source::Json(value)),
    }
}

/// `{key: "…"}` leaf node.
pub(crate) fn wire_leaf<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(key)?.as_str()
}

/// `{prim, args?}` node.
pub(crate) fn wire_prim(value: &Value) -> Option<(&str, &[Value])> {
    let object = value.as_object()?;
    let prim = object.get("prim")?.as_str()?;
    let args = match object.get("args") {
        Some(Value::Array(args)) => args.as_slice(),
        None => &[],
        Some(_) => return None,
    };
    Some((prim, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Micheline {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn infer_builds_structured_values() {
        let value = TypedValue::infer(&node(json!({
            "prim": "Pair",
            "args": [{ "string": "abc" }, { "prim": "Some", "args": [{ "int": "7" }] }]
        })))
        .unwrap();
        assert_eq!(value.variant_name(), "pair");
        assert_eq!(
            value.as_raw_value().unwrap(),
            RawValue::List(vec![RawValue::String("abc".into()), RawValue::Int(7.into())])
        );
    }

    #[test]
    fn infer_reads_elt_sequences_as_maps() {
        let value = TypedValue::infer(&node(json!([
            { "prim": "Elt", "args": [{ "string": "a" }, { "int": "1" }] }
        ])))
        .unwrap();
        assert_eq!(value.variant_name(), "map");
        let empty = TypedValue::infer(&Micheline::Seq(vec![])).unwrap();
        assert_eq!(empty.variant_name(), "list");
    }

    #[test]
    fn infer_wire_round_trip() {
        let source = node(json!({
            "prim": "Pair",
            "args": [{ "int": "1" }, { "prim": "Left", "args": [{ "bytes": "00ff" }] }]
        }));
        assert_eq!(TypedValue::infer(&source).unwrap().to_micheline().unwrap(), source);
    }

    #[test]
    fn infer_rejects_unknown_prims() {
        let err = TypedValue::infer(&Micheline::prim("Lambda", vec![])).unwrap_err();
        assert!(matches!(err, MichelsonError::Unsupported(_)));
    }

    #[test]
    fn equality_compares_structure_and_names() {
        let a = TypedValue::infer(&node(json!({ "prim": "Some", "args": [{ "int": "1" }] })))
            .unwrap();
        let b = TypedValue::infer(&node(json!({ "prim": "Some", "args": [{ "int": "1" }] })))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a.clone(), b.with_name("x"));
    }

    #[test]
    fn named_value_wraps_raw() {
        let value = TypedValue::new(ValueKind::Bool(true)).with_name("flag");
        assert_eq!(
            value.as_raw_value().unwrap(),
            RawValue::named("flag", RawValue::Bool(true))
        );
    }

    #[test]
    fn wire_shape_helpers() {
        assert_eq!(wire_leaf(&json!({ "int": "5" }), "int"), Some("5"));
        assert_eq!(wire_leaf(&json!({ "int": "5", "x": 1 }), "int"), None);
        let v = json!({ "prim": "Pair", "args": [1, 2] });
        let (prim, args) = wire_prim(&v).unwrap();
        assert_eq!(prim, "Pair");
        assert_eq!(args.len(), 2);
        assert!(wire_prim(&json!({ "prim": "Unit", "args": 3 })).is_none());
    }
}
