// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Contract façade: entrypoint discovery, call construction and
//! normalization, storage and big-map reads.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tzk_sdk::config::SdkConfig;
//! use tzk_sdk::contract::TezosContract;
//!
//! # async fn example() -> tzk_sdk::error::TzkResult<()> {
//! let contract = TezosContract::new("KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn", &SdkConfig::from_env()?)?;
//! let call = contract
//!     .create_contract_call(
//!         "transfer",
//!         json!({ "from": "tz1…", "to": "tz1…", "value": 100 }),
//!         None,
//!     )
//!     .await?;
//! let parameters = call.parameters();
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Value};
use tracing::debug;
use tzk_michelson::value::Child;
use tzk_michelson::{
    Address, CreateConfig, Input, Micheline, MichelsonError, SchemaMeta, TypeTag, TypedValue,
    ValueKind,
};

use crate::config::SdkConfig;
use crate::error::{TzkError, TzkResult};
use crate::flight::SingleFlight;
use crate::indexer::{BigMapRow, IndexerClient, Predicate};
use crate::node::NodeClient;

pub const DEFAULT_ENTRYPOINT: &str = "default";

const BIG_MAP_PAGE: usize = 100;

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Entrypoint {
    pub name: String,
    pub schema: SchemaMeta,
    /// Type node the schema was parsed from.
    pub node: Micheline,
}

pub type Entrypoints = BTreeMap<String, Entrypoint>;

/// Parameters of one contract call, ready for operation building.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub entrypoint: String,
    pub value: Micheline,
    /// Amount sent with the call, in mutez.
    pub amount: Option<u64>,
}

impl ContractCall {
    pub fn new(entrypoint: impl Into<String>, value: Micheline) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            value,
            amount: None,
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn is_default(&self) -> bool {
        self.entrypoint == DEFAULT_ENTRYPOINT
    }

    /// `{entrypoint, value}` as accepted by operation injection.
    pub fn parameters(&self) -> Value {
        json!({
            "entrypoint": self.entrypoint,
            "value": self.value.to_json(),
        })
    }
}

/// Which rows to read from a contract's big map.
#[derive(Debug, Clone, Default)]
pub struct BigMapRequest {
    /// Big map to read; resolved from the contract when unset.
    pub id: Option<i64>,
    /// Predicates on the big maps entity used to pick one map.
    pub filter: Vec<Predicate>,
    /// Predicates on the rows themselves.
    pub predicates: Vec<Predicate>,
    pub limit: Option<usize>,
}

pub struct TezosContract {
    address: String,
    node: NodeClient,
    indexer: IndexerClient,
    entrypoints: SingleFlight<Entrypoints>,
    big_map_ids: SingleFlight<Vec<i64>>,
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl TezosContract {
    pub fn new(address: &str, config: &SdkConfig) -> TzkResult<Self> {
        config.validate()?;
        let http = reqwest::Client::new();
        Ok(Self::with_clients(
            address,
            NodeClient::new(config.node_base(), http.clone()),
            IndexerClient::new(
                config.indexer_base(),
                &config.network,
                config.indexer_api_key.clone(),
                http,
            ),
        ))
    }

    pub fn with_clients(address: &str, node: NodeClient, indexer: IndexerClient) -> Self {
        Self {
            address: address.to_string(),
            node,
            indexer,
            entrypoints: SingleFlight::new("entrypoints"),
            big_map_ids: SingleFlight::new("big_map_ids"),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    // -----------------------------------------------------------------------
    // Entrypoints
    // -----------------------------------------------------------------------

    /// Entrypoints of the contract, fetched once and shared by concurrent
    /// callers. `default` is always present.
    pub async fn entrypoints(&self) -> TzkResult<Arc<Entrypoints>> {
        let node = self.node.clone();
        let address = self.address.clone();
        self.entrypoints
            .get_or_fetch(move || async move { fetch_entrypoints(&node, &address).await })
            .await
    }

    pub async fn entrypoint(&self, name: &str) -> TzkResult<Option<Entrypoint>> {
        Ok(self.entrypoints().await?.get(name).cloned())
    }

    /// Build a call to `name` from a native or wire value. Unknown names
    /// fall back to an untyped call at `default` carrying `value` as given.
    pub async fn create_contract_call(
        &self,
        name: &str,
        value: impl Into<Input>,
        amount: Option<u64>,
    ) -> TzkResult<ContractCall> {
        let value = value.into();
        let entrypoints = self.entrypoints().await?;

        let call = match entrypoints.get(name) {
            Some(entrypoint) => {
                let typed = entrypoint
                    .schema
                    .create_value(value, &CreateConfig::default())?;
                ContractCall::new(name, typed.to_micheline()?)
            }
            None => {
                debug!(contract = %self.address, entrypoint = name, "unknown entrypoint, untyped call");
                ContractCall::new(DEFAULT_ENTRYPOINT, untyped_value(value)?)
            }
        };
        Ok(ContractCall { amount, ..call })
    }

    /// Re-address a call made at `default` with an `Or` value to the named
    /// entrypoint its branch selects, narrowing the value to that branch.
    /// Calls at a named entrypoint, and calls whose value is not
    /// `Left`/`Right`, are returned unchanged.
    pub async fn normalize_contract_call_parameters(
        &self,
        call: ContractCall,
        fallback_entrypoint: Option<&str>,
    ) -> TzkResult<ContractCall> {
        if !call.is_default() {
            return Ok(call);
        }
        if !(call.value.is_prim("Left") || call.value.is_prim("Right")) {
            return Ok(call);
        }

        let entrypoints = self.entrypoints().await?;
        let default = entrypoints.get(DEFAULT_ENTRYPOINT).ok_or_else(|| {
            TzkError::NotFound(format!("{}: no default entrypoint", self.address))
        })?;

        let trace = Arc::new(Mutex::new(BranchTrace::default()));
        let before = Arc::clone(&trace);
        let after = Arc::clone(&trace);
        let config = CreateConfig::default()
            .before_next(move |meta, _raw| {
                before
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .enter(meta);
            })
            .on_next(move |_meta, _raw, value| {
                after
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .leave(value);
            });
        default.schema.create_value(&call.value, &config)?;

        let trace = std::mem::take(&mut *trace.lock().unwrap_or_else(PoisonError::into_inner));
        let (entrypoint, value) = match trace.branch {
            Some(branch) => (branch.name, branch.value.transpose()?),
            None => (
                fallback_entrypoint.unwrap_or(DEFAULT_ENTRYPOINT).to_string(),
                None,
            ),
        };
        debug!(contract = %self.address, %entrypoint, "normalized default call");

        Ok(ContractCall {
            entrypoint,
            value: value.unwrap_or(call.value),
            amount: call.amount,
        })
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    /// Current storage decoded against the script's `storage` type.
    pub async fn storage(&self) -> TzkResult<TypedValue> {
        let (script, storage) = tokio::join!(
            self.node.script(&self.address),
            self.node.storage(&self.address)
        );
        let (script, storage) = (script?, storage?);
        let node = script.section("storage").ok_or_else(|| {
            TzkError::InvalidValue(format!("{}: script has no storage section", self.address))
        })?;
        let schema = parse_schema(node)?;
        Ok(schema.create_value(&storage, &CreateConfig::default())?)
    }

    // -----------------------------------------------------------------------
    // Big maps
    // -----------------------------------------------------------------------

    /// Ids of the contract's big maps, fetched once.
    pub async fn big_map_ids(&self) -> TzkResult<Arc<Vec<i64>>> {
        let indexer = self.indexer.clone();
        let address = self.address.clone();
        self.big_map_ids
            .get_or_fetch(move || async move { indexer.big_map_ids(&address).await })
            .await
    }

    /// The one big map matching `filter`. With no filter the contract must
    /// own exactly one big map.
    pub async fn big_map_id(&self, filter: &[Predicate]) -> TzkResult<i64> {
        let ids = self.big_map_ids().await?;
        if ids.is_empty() {
            return Err(TzkError::NotFound(format!("{}: no big maps", self.address)));
        }
        if filter.is_empty() {
            return match ids.as_slice() {
                [id] => Ok(*id),
                _ => Err(TzkError::InvalidValue(format!(
                    "{}: {} big maps, a filter is required to pick one",
                    self.address,
                    ids.len()
                ))),
            };
        }
        match self.indexer.filter_big_maps(&ids, filter).await?.as_slice() {
            [id] => Ok(*id),
            [] => Err(TzkError::NotFound(format!(
                "{}: no big map matches the filter",
                self.address
            ))),
            many => Err(TzkError::InvalidValue(format!(
                "{}: {} big maps match the filter",
                self.address,
                many.len()
            ))),
        }
    }

    pub async fn big_map_values(&self, request: &BigMapRequest) -> TzkResult<Vec<BigMapRow>> {
        let id = match request.id {
            Some(id) => id,
            None => self.big_map_id(&request.filter).await?,
        };
        self.indexer
            .big_map_contents(id, &request.predicates, request.limit.unwrap_or(BIG_MAP_PAGE))
            .await
    }

    /// Value stored under `key`, or `None` when the key is absent.
    pub async fn big_map_value(
        &self,
        id: Option<i64>,
        key: impl Into<Input>,
        key_type: &SchemaMeta,
        value_type: &SchemaMeta,
    ) -> TzkResult<Option<TypedValue>> {
        let key = key_type.create_value(key, &CreateConfig::default())?;
        let predicate = key_predicate(&key)?;
        let request = BigMapRequest {
            id,
            predicates: vec![predicate],
            limit: Some(1),
            ..BigMapRequest::default()
        };

        let rows = self.big_map_values(&request).await?;
        let Some(node) = rows.into_iter().find_map(|row| row.value) else {
            debug!(contract = %self.address, "big map key absent");
            return Ok(None);
        };
        let node = decode_row_value(node)?;
        Ok(Some(value_type.create_value(&node, &CreateConfig::default())?))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

async fn fetch_entrypoints(node: &NodeClient, address: &str) -> TzkResult<Entrypoints> {
    let (script, published) = tokio::join!(node.script(address), node.entrypoints(address));
    let (script, mut nodes) = (script?, published?);

    if !nodes.contains_key(DEFAULT_ENTRYPOINT) {
        let parameter = script.section("parameter").ok_or_else(|| {
            TzkError::InvalidValue(format!("{address}: script has no parameter section"))
        })?;
        nodes.insert(DEFAULT_ENTRYPOINT.to_string(), parameter.clone());
    }

    nodes
        .into_iter()
        .map(|(name, node)| -> TzkResult<(String, Entrypoint)> {
            let schema = parse_schema(&node)?;
            Ok((name.clone(), Entrypoint { name, schema, node }))
        })
        .collect()
}

fn parse_schema(node: &Micheline) -> TzkResult<SchemaMeta> {
    SchemaMeta::from_micheline(node)?.ok_or_else(|| {
        TzkError::InvalidValue(format!("type node is not a primitive application: {node}"))
    })
}

fn untyped_value(value: Input) -> TzkResult<Micheline> {
    match value {
        Input::Typed(typed) => Ok(typed.to_micheline()?),
        Input::Json(json) => Micheline::from_json(&json).ok_or_else(|| {
            TzkError::InvalidValue("untyped call value is not a Micheline node".into())
        }),
    }
}

/// `key_hash` for packable keys, the key's Michelson text otherwise.
fn key_predicate(key: &TypedValue) -> TzkResult<Predicate> {
    if !hash_matches_chain(key)? {
        return Ok(Predicate::eq("key", key.to_micheline()?.to_string()));
    }
    match key.script_expr_hash() {
        Ok(hash) => Ok(Predicate::eq("key_hash", hash)),
        Err(MichelsonError::Unsupported(_)) => {
            Ok(Predicate::eq("key", key.to_micheline()?.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// False when `key` holds an encoded address. The chain hashes addresses in
/// their binary form, which `pack` cannot derive from `tz1…`/`KT1…` text.
fn hash_matches_chain(key: &TypedValue) -> TzkResult<bool> {
    fn child(slot: &Child) -> TzkResult<&TypedValue> {
        Ok(slot.get().as_ref().map_err(Clone::clone)?)
    }

    match key.kind() {
        ValueKind::Address(Address::Encoded(_)) => Ok(false),
        ValueKind::Pair(first, second) => {
            Ok(hash_matches_chain(child(first)?)? && hash_matches_chain(child(second)?)?)
        }
        ValueKind::List(items) => {
            for item in items {
                if !hash_matches_chain(child(item)?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(true),
    }
}

/// Row values arrive as a Micheline node or as its JSON text.
fn decode_row_value(value: Value) -> TzkResult<Micheline> {
    let parsed = match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    };
    parsed.map_err(|e| TzkError::InvalidValue(format!("big map value is not Micheline: {e}")))
}

/// First field-annotated branch of an `Or` seen while building a value.
struct Branch {
    name: String,
    depth: usize,
    value: Option<Result<Micheline, MichelsonError>>,
}

#[derive(Default)]
struct BranchTrace {
    stack: Vec<TypeTag>,
    branch: Option<Branch>,
}

impl BranchTrace {
    fn enter(&mut self, meta: &SchemaMeta) {
        if self.branch.is_none() && self.stack.last() == Some(&TypeTag::Or) {
            if let Some(name) = meta.field_annotation() {
                self.branch = Some(Branch {
                    name: name.to_string(),
                    depth: self.stack.len(),
                    value: None,
                });
            }
        }
        self.stack.push(meta.tag().clone());
    }

    fn leave(&mut self, value: &TypedValue) {
        self.stack.pop();
        let depth = self.stack.len();
        if let Some(branch) = &mut self.branch {
            if branch.depth == depth && branch.value.is_none() {
                branch.value = Some(value.to_micheline());
            }
        }
    }
}
