// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Indexer query client.
//!
//! Queries are POSTed as `{fields, predicates, limit}` to
//! `{indexer}/v2/data/tezos/{network}/{entity}` and answered with an
//! array of row objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TzkError, TzkResult};

pub const BIG_MAPS: &str = "big_maps";
pub const ORIGINATED_ACCOUNT_MAPS: &str = "originated_account_maps";
pub const BIG_MAP_CONTENTS: &str = "big_map_contents";

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "isnull")]
    IsNull,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operation: Operation,
    pub set: Vec<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operation: Operation, set: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operation,
            set,
            inverse: false,
            group: None,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operation::Eq, vec![value.into()])
    }

    pub fn inverse(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub fields: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub limit: usize,
}

impl Query {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            predicates: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_all(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One `big_map_contents` row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BigMapRow {
    #[serde(default)]
    pub big_map_id: Option<Value>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub key_hash: Option<String>,
    /// Micheline node, either inline or as a JSON-encoded string.
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Clone)]
pub struct IndexerClient {
    base_url: String,
    network: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl IndexerClient {
    pub fn new(
        base_url: &str,
        network: &str,
        api_key: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
            api_key,
            http,
        }
    }

    fn entity_url(&self, entity: &str) -> String {
        format!("{}/v2/data/tezos/{}/{entity}", self.base_url, self.network)
    }

    /// Run `query` against `entity`, decoding each row as `T`.
    pub async fn query<T: serde::de::DeserializeOwned>(
        &self,
        entity: &str,
        query: &Query,
    ) -> TzkResult<Vec<T>> {
        let url = self.entity_url(entity);
        debug!(%url, entity, predicates = query.predicates.len(), "indexer query");

        let mut request = self.http.post(&url).json(query);
        if let Some(key) = &self.api_key {
            request = request.header("apiKey", key);
        }
        let result: Result<Vec<T>, reqwest::Error> = async {
            request
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<T>>()
                .await
        }
        .await;
        result.map_err(|e| {
            warn!(%url, entity, error = %e, "indexer query failed");
            TzkError::network(format!("POST {url}"), e)
        })
    }

    /// Ids of every big map the contract at `address` owns.
    pub async fn big_map_ids(&self, address: &str) -> TzkResult<Vec<i64>> {
        let query = Query::new(&["big_map_id"]).with(Predicate::eq("account_id", address));
        let rows: Vec<Value> = self.query(ORIGINATED_ACCOUNT_MAPS, &query).await?;
        rows.iter()
            .map(|row| parse_id(row.get("big_map_id")))
            .collect()
    }

    /// Ids among `candidates` that also match `filter` on the big maps entity.
    pub async fn filter_big_maps(
        &self,
        candidates: &[i64],
        filter: &[Predicate],
    ) -> TzkResult<Vec<i64>> {
        let query = Query::new(&["big_map_id"])
            .with(Predicate::new(
                "big_map_id",
                Operation::In,
                candidates.iter().map(|id| Value::from(*id)).collect(),
            ))
            .with_all(filter.iter().cloned());
        let rows: Vec<Value> = self.query(BIG_MAPS, &query).await?;
        rows.iter()
            .map(|row| parse_id(row.get("big_map_id")))
            .collect()
    }

    pub async fn big_map_contents(
        &self,
        id: i64,
        predicates: &[Predicate],
        limit: usize,
    ) -> TzkResult<Vec<BigMapRow>> {
        let query = Query::new(&["big_map_id", "key", "key_hash", "value"])
            .with(Predicate::eq("big_map_id", id))
            .with_all(predicates.iter().cloned())
            .limit(limit);
        self.query(BIG_MAP_CONTENTS, &query).await
    }
}

/// Big map ids come back as numbers or decimal strings.
pub(crate) fn parse_id(value: Option<&Value>) -> TzkResult<i64> {
    let id = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| TzkError::InvalidValue(format!("big_map_id: unexpected {value:?}")))
}
