// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # tzk-sdk
//!
//! Contract façade for Tezos smart contracts, built on the
//! `tzk-michelson` codec. Callers name an entrypoint and hand over plain
//! values; the façade discovers the contract's schema, builds the
//! Micheline parameters, and reads storage and big maps back into typed
//! values.
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | [`contract`] | [`TezosContract`]: entrypoints, call building and normalization, storage, big maps |
//! | [`node`] | Node RPC: `/script`, `/entrypoints`, `/storage` |
//! | [`indexer`] | Indexer queries (`big_maps`, `originated_account_maps`, `big_map_contents`) |
//! | [`flight`] | Single-flight and TTL caches for remote lookups |
//! | [`naming`] | Name-service resolution through a pluggable lookup |
//! | [`config`] | Endpoints from `TZK_*` variables or a JSON file |
//! | [`error`] | [`TzkError`] taxonomy |
//!
//! ## Typical flow
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tzk_sdk::{ContractCall, Micheline, SdkConfig, TezosContract};
//!
//! # async fn example() -> tzk_sdk::TzkResult<()> {
//! let config = SdkConfig::from_env()?;
//! let contract = TezosContract::new("KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn", &config)?;
//!
//! // 1. Named entrypoint with a native value
//! let call = contract
//!     .create_contract_call("approve", json!({ "spender": "tz1…", "value": 10 }), None)
//!     .await?;
//!
//! // 2. Legacy call at `default` with an Or value
//! let legacy = ContractCall::new(
//!     "default",
//!     serde_json::from_value::<Micheline>(json!({ "prim": "Left", "args": [{ "int": "1" }] })).unwrap(),
//! );
//! let call = contract.normalize_contract_call_parameters(legacy, None).await?;
//!
//! // 3. Storage as a record
//! let storage = contract.storage().await?.as_raw_value()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contract;
pub mod error;
pub mod flight;
pub mod indexer;
pub mod naming;
pub mod node;

pub use config::SdkConfig;
pub use contract::{BigMapRequest, ContractCall, Entrypoint, Entrypoints, TezosContract, DEFAULT_ENTRYPOINT};
pub use error::{TzkError, TzkResult};
pub use indexer::{BigMapRow, Operation, Predicate, Query};
pub use naming::{BigMapNameLookup, NameLookup, NameResolver};

pub use tzk_michelson::{Micheline, RawValue, SchemaMeta, TypedValue};
