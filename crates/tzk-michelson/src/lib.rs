// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # tzk-michelson
//!
//! Schema-driven codec for Michelson values. Translates between a
//! contract's published schema, the Micheline wire tree a node speaks,
//! and plain native values an application builds or displays.
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | [`micheline`] | Wire tree (`{int}`, `{string}`, `{bytes}`, prim applications, sequences) |
//! | [`annotation`] | `:type`, `@var`, `%field` annotation lookup |
//! | [`lazy`] | Single-assignment memoized thunk |
//! | [`schema`] | [`SchemaMeta`] parsed from a wire type node |
//! | [`value`] | [`TypedValue`] hierarchy and its raw/wire projections |
//! | [`engine`] | [`create_value`]: walks schema and input in lock-step |
//! | [`pack`] | Packed binary encoding and script-expression hashes |
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tzk_michelson::{CreateConfig, Micheline, SchemaMeta};
//!
//! # fn example() -> tzk_michelson::MichelsonResult<()> {
//! let node: Micheline = serde_json::from_value(json!({
//!     "prim": "pair",
//!     "args": [
//!         { "prim": "address", "annots": ["%to"] },
//!         { "prim": "nat", "annots": ["%value"] }
//!     ]
//! }))
//! .unwrap();
//! let meta = SchemaMeta::from_micheline(&node)?.unwrap();
//!
//! let value = meta.create_value(
//!     json!({ "to": "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb", "value": 10 }),
//!     &CreateConfig::default(),
//! )?;
//! let wire = value.to_micheline()?;
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod engine;
pub mod error;
pub mod lazy;
pub mod micheline;
pub mod pack;
pub mod schema;
pub mod value;

pub use annotation::{find_annotation, AnnotationKind, TYPE_THEN_FIELD};
pub use engine::{create_value, BeforeNext, CreateConfig, OnNext};
pub use error::{MichelsonError, MichelsonResult};
pub use lazy::Lazy;
pub use micheline::Micheline;
pub use pack::script_expr_hash;
pub use schema::{SchemaMeta, TypeTag};
pub use value::{Address, Input, Mapper, OrValue, RawValue, TypedValue, ValueKind};
