// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Value construction driven by a schema.
//!
//! [`create_value`] walks a [`SchemaMeta`] and an input in lock-step:
//!
//! 1. typed input is returned untouched (no hooks fire);
//! 2. if the input is an object carrying the schema's `:type` or `%field`
//!    annotation as a key, that entry is used instead of the whole object;
//! 3. `before_next(meta, raw)` fires;
//! 4. the variant for `meta.tag()` is built, with each type argument's own
//!    `create_value` as the mapper for structured children;
//! 5. with `lazy_eval` set (the default) the children are forced now;
//! 6. `on_next(meta, raw, &mut value)` fires.

use std::sync::Arc;

use num_bigint::Sign;
use serde_json::Value;

use crate::annotation::TYPE_THEN_FIELD;
use crate::error::{MichelsonError, MichelsonResult};
use crate::schema::{SchemaMeta, TypeTag};
use crate::value::{Input, Mapper, TypedValue, ValueKind};

pub type BeforeNext = Arc<dyn Fn(&SchemaMeta, &Input) + Send + Sync>;
pub type OnNext = Arc<dyn Fn(&SchemaMeta, &Input, &mut TypedValue) + Send + Sync>;

#[derive(Clone)]
pub struct CreateConfig {
    /// Force deferred children right after construction.
    pub lazy_eval: bool,
    pub before_next: Option<BeforeNext>,
    pub on_next: Option<OnNext>,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            lazy_eval: true,
            before_next: None,
            on_next: None,
        }
    }
}

impl CreateConfig {
    /// Leave children unevaluated until projected.
    pub fn deferred() -> Self {
        Self {
            lazy_eval: false,
            ..Self::default()
        }
    }

    pub fn before_next<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SchemaMeta, &Input) + Send + Sync + 'static,
    {
        self.before_next = Some(Arc::new(hook));
        self
    }

    pub fn on_next<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SchemaMeta, &Input, &mut TypedValue) + Send + Sync + 'static,
    {
        self.on_next = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for CreateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateConfig")
            .field("lazy_eval", &self.lazy_eval)
            .field("before_next", &self.before_next.is_some())
            .field("on_next", &self.on_next.is_some())
            .finish()
    }
}

impl SchemaMeta {
    pub fn create_value(
        &self,
        input: impl Into<Input>,
        config: &CreateConfig,
    ) -> MichelsonResult<TypedValue> {
        create_value(self, input.into(), config)
    }
}

pub fn create_value(
    meta: &SchemaMeta,
    input: Input,
    config: &CreateConfig,
) -> MichelsonResult<TypedValue> {
    if let Input::Typed(value) = input {
        return Ok(value);
    }

    let annotation = meta.annotation(TYPE_THEN_FIELD);
    let raw = match (&input, annotation) {
        (Input::Json(Value::Object(object)), Some(name)) => match object.get(name) {
            Some(entry) => Input::Json(entry.clone()),
            None => input,
        },
        _ => input,
    };

    if let Some(hook) = &config.before_next {
        hook(meta, &raw);
    }

    let mut value = build(meta, raw.clone(), config)?;
    if let Some(name) = annotation {
        value.set_name(name);
    }

    if config.lazy_eval {
        value.eval()?;
    }

    if let Some(hook) = &config.on_next {
        hook(meta, &raw, &mut value);
    }
    Ok(value)
}

fn build(meta: &SchemaMeta, raw: Input, config: &CreateConfig) -> MichelsonResult<TypedValue> {
    match meta.tag() {
        TypeTag::Int => TypedValue::int(raw),
        TypeTag::Nat | TypeTag::Mutez => {
            let value = TypedValue::int(raw)?;
            if matches!(value.kind(), ValueKind::Int(n) if n.sign() == Sign::Minus) {
                return Err(MichelsonError::InvalidValue(format!(
                    "{}: negative value",
                    meta.tag()
                )));
            }
            Ok(value)
        }
        TypeTag::String => TypedValue::string(raw),
        TypeTag::Bytes => TypedValue::bytes(raw),
        TypeTag::Bool => TypedValue::bool(raw),
        TypeTag::Unit => TypedValue::unit(raw),
        TypeTag::Address | TypeTag::KeyHash | TypeTag::Contract => TypedValue::address(raw),
        TypeTag::Key | TypeTag::Signature => TypedValue::string_or_bytes(raw),
        TypeTag::Timestamp => TypedValue::timestamp(raw),
        TypeTag::Option => TypedValue::option(raw, &mapper(meta, 0, config)),
        TypeTag::List | TypeTag::Set => TypedValue::list(raw, &mapper(meta, 0, config)),
        TypeTag::Pair => TypedValue::pair(raw, &mapper(meta, 0, config), &mapper(meta, 1, config)),
        TypeTag::Or => TypedValue::or(raw, &mapper(meta, 0, config), &mapper(meta, 1, config)),
        TypeTag::Map => TypedValue::map(raw, &mapper(meta, 0, config), &mapper(meta, 1, config)),
        TypeTag::BigMap => match &raw {
            // storage holds a pointer to the big map, not its contents
            Input::Json(value) if value.get("int").is_some() => TypedValue::int(raw),
            _ => TypedValue::map(raw, &mapper(meta, 0, config), &mapper(meta, 1, config)),
        },
        TypeTag::Operation
        | TypeTag::Lambda
        | TypeTag::ChainId
        | TypeTag::SaplingTransaction
        | TypeTag::Other(_) => Err(MichelsonError::Unsupported(format!(
            "{} values",
            meta.tag()
        ))),
    }
}

/// Mapper building the `index`-th type argument with the same config.
fn mapper(meta: &SchemaMeta, index: usize, config: &CreateConfig) -> Mapper {
    let generic = meta.generics().get(index).cloned();
    let tag = meta.tag().clone();
    let config = config.clone();
    Arc::new(move |input: Input| {
        let generic = generic.as_ref().ok_or_else(|| {
            MichelsonError::InvalidValue(format!("{tag} schema has no type argument {index}"))
        })?;
        let meta = generic.get().as_ref().map_err(Clone::clone)?;
        create_value(meta, input, &config)
    })
}
