// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Endpoint configuration.
//!
//! Read from `TZK_*` environment variables or persisted as JSON:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `TZK_NODE_URL` | `node_url` | `https://mainnet.api.tez.ie` |
//! | `TZK_INDEXER_URL` | `indexer_url` | `https://conseil-prod.cryptonomic-infra.tech` |
//! | `TZK_INDEXER_API_KEY` | `indexer_api_key` | unset |
//! | `TZK_NETWORK` | `network` | `mainnet` |
//! | `TZK_NAME_CACHE_TTL` | `name_cache_ttl_secs` | `300` |

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{TzkError, TzkResult};

const DEFAULT_NODE_URL: &str = "https://mainnet.api.tez.ie";
const DEFAULT_INDEXER_URL: &str = "https://conseil-prod.cryptonomic-infra.tech";
const DEFAULT_NETWORK: &str = "mainnet";
const DEFAULT_NAME_CACHE_TTL_SECS: u64 = 300;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub node_url: String,
    pub indexer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer_api_key: Option<String>,
    pub network: String,
    pub name_cache_ttl_secs: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.into(),
            indexer_url: DEFAULT_INDEXER_URL.into(),
            indexer_api_key: None,
            network: DEFAULT_NETWORK.into(),
            name_cache_ttl_secs: DEFAULT_NAME_CACHE_TTL_SECS,
        }
    }
}

impl SdkConfig {
    pub fn from_env() -> TzkResult<Self> {
        let ttl = env_or("TZK_NAME_CACHE_TTL", &DEFAULT_NAME_CACHE_TTL_SECS.to_string());
        let name_cache_ttl_secs = ttl
            .parse()
            .map_err(|_| TzkError::Config(format!("TZK_NAME_CACHE_TTL: `{ttl}` is not a number")))?;
        Ok(Self {
            node_url: env_or("TZK_NODE_URL", DEFAULT_NODE_URL),
            indexer_url: env_or("TZK_INDEXER_URL", DEFAULT_INDEXER_URL),
            indexer_api_key: std::env::var("TZK_INDEXER_API_KEY").ok(),
            network: env_or("TZK_NETWORK", DEFAULT_NETWORK),
            name_cache_ttl_secs,
        })
    }

    pub fn load(path: &Path) -> TzkResult<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("cannot read config at {}", path.display()))?;
        let config = serde_json::from_str(&data).context("invalid config JSON")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> TzkResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, data).with_context(|| format!("cannot write config at {}", path.display()))?;
        Ok(())
    }

    /// Reject empty or placeholder endpoints before any request is made.
    pub fn validate(&self) -> TzkResult<()> {
        for (field, value) in [("node_url", &self.node_url), ("indexer_url", &self.indexer_url)] {
            if value.trim().is_empty() || value.contains("PLACEHOLDER") {
                return Err(TzkError::Config(format!("{field} is not set")));
            }
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(TzkError::Config(format!("{field}: `{value}` is not an http(s) URL")));
            }
        }
        if self.network.trim().is_empty() {
            return Err(TzkError::Config("network is not set".into()));
        }
        Ok(())
    }

    pub fn name_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.name_cache_ttl_secs)
    }

    /// Node URL without a trailing slash.
    pub fn node_base(&self) -> &str {
        self.node_url.trim_end_matches('/')
    }

    /// Indexer URL without a trailing slash.
    pub fn indexer_base(&self) -> &str {
        self.indexer_url.trim_end_matches('/')
    }
}
