// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Name-service resolution (`alice.tez` → `tz1…`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use tzk_michelson::{RawValue, SchemaMeta, TypeTag};

use crate::config::SdkConfig;
use crate::contract::TezosContract;
use crate::error::{TzkError, TzkResult};
use crate::flight::TtlCache;

#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Address registered for `name`, or `None` when unregistered.
    async fn lookup(&self, name: &str) -> TzkResult<Option<String>>;
}

pub struct NameResolver<L> {
    lookup: Arc<L>,
    cache: TtlCache<String, Option<String>>,
}

impl<L> NameResolver<L>
where
    L: NameLookup + 'static,
{
    pub fn new(lookup: L, ttl: Duration) -> Self {
        Self {
            lookup: Arc::new(lookup),
            cache: TtlCache::new("names", ttl),
        }
    }

    /// Answers live for `name_cache_ttl_secs`.
    pub fn from_config(lookup: L, config: &SdkConfig) -> Self {
        Self::new(lookup, config.name_cache_ttl())
    }

    pub async fn resolve(&self, name: &str) -> TzkResult<Option<String>> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(TzkError::InvalidValue("name is empty".into()));
        }
        let lookup = Arc::clone(&self.lookup);
        let owned = key.clone();
        let address = self
            .cache
            .get_or_fetch(&key, move || async move { lookup.lookup(&owned).await })
            .await?;
        debug!(name = %key, resolved = address.is_some(), "name resolved");
        Ok((*address).clone())
    }

    /// Forget a cached answer so the next resolve asks again.
    pub fn forget(&self, name: &str) {
        self.cache.invalidate(&name.trim().to_lowercase());
    }
}

/// Looks names up in a records big map keyed by the UTF-8 bytes of the
/// name, whose values carry an `address` field.
pub struct BigMapNameLookup {
    contract: Arc<TezosContract>,
    big_map_id: Option<i64>,
    value_type: SchemaMeta,
}

impl BigMapNameLookup {
    pub fn new(contract: Arc<TezosContract>, big_map_id: Option<i64>, value_type: SchemaMeta) -> Self {
        Self {
            contract,
            big_map_id,
            value_type,
        }
    }
}

#[async_trait]
impl NameLookup for BigMapNameLookup {
    async fn lookup(&self, name: &str) -> TzkResult<Option<String>> {
        let key_type = SchemaMeta::leaf(TypeTag::Bytes, Vec::new());
        let key = Value::String(hex::encode(name.as_bytes()));
        let record = self
            .contract
            .big_map_value(self.big_map_id, key, &key_type, &self.value_type)
            .await?;
        match record {
            Some(record) => record_address(&record.as_raw_value()?),
            None => Ok(None),
        }
    }
}

fn record_address(record: &RawValue) -> TzkResult<Option<String>> {
    match record.get("address") {
        Some(RawValue::String(address)) => Ok(Some(address.clone())),
        Some(RawValue::Unit) => Ok(None),
        Some(other) => Err(TzkError::InvalidValue(format!(
            "name record address: unexpected {other:?}"
        ))),
        None => Err(TzkError::InvalidValue(
            "name record has no address field".into(),
        )),
    }
}
