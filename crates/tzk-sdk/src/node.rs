// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Read-only node RPC for contract scripts, entrypoints and storage.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use tzk_michelson::Micheline;

use crate::error::{TzkError, TzkResult};

/// `/script` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub code: Vec<Micheline>,
}

impl Script {
    /// Type node of a top-level section (`parameter`, `storage`).
    pub fn section(&self, name: &str) -> Option<&Micheline> {
        self.code.iter().find_map(|node| match node.as_prim() {
            Some((prim, args, _)) if prim == name => {
                args.iter().find(|arg| arg.as_prim().is_some())
            }
            _ => None,
        })
    }
}

#[derive(Deserialize)]
struct EntrypointsResponse {
    #[serde(default)]
    entrypoints: BTreeMap<String, Micheline>,
}

#[derive(Clone)]
pub struct NodeClient {
    base_url: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contract_url(&self, address: &str, resource: &str) -> String {
        format!(
            "{}/chains/main/blocks/head/context/contracts/{address}/{resource}",
            self.base_url
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> TzkResult<T> {
        debug!(%url, "node request");
        let result: Result<T, reqwest::Error> = async {
            self.http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<T>()
                .await
        }
        .await;
        result.map_err(|e| {
            warn!(%url, error = %e, "node request failed");
            TzkError::network(format!("GET {url}"), e)
        })
    }

    pub async fn script(&self, address: &str) -> TzkResult<Script> {
        self.get_json(self.contract_url(address, "script")).await
    }

    /// Named entrypoints as published by the node. May omit `default`.
    pub async fn entrypoints(&self, address: &str) -> TzkResult<BTreeMap<String, Micheline>> {
        let response: EntrypointsResponse =
            self.get_json(self.contract_url(address, "entrypoints")).await?;
        Ok(response.entrypoints)
    }

    pub async fn storage(&self, address: &str) -> TzkResult<Micheline> {
        self.get_json(self.contract_url(address, "storage")).await
    }
}
