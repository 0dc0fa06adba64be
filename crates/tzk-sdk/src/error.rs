// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for [`TezosContract`](crate::contract::TezosContract) and
//! its collaborators.

use std::sync::Arc;

use tzk_michelson::MichelsonError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TzkError {
    /// Caller or node data does not fit the schema.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("network: {context}: {source}")]
    Network {
        context: String,
        #[source]
        source: Arc<reqwest::Error>,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("{0:#}")]
    Other(Arc<anyhow::Error>),
}

pub type TzkResult<T> = Result<T, TzkError>;

impl TzkError {
    pub(crate) fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        TzkError::Network {
            context: context.into(),
            source: Arc::new(source),
        }
    }
}

impl From<MichelsonError> for TzkError {
    fn from(err: MichelsonError) -> Self {
        match err {
            MichelsonError::InvalidValue(message) => TzkError::InvalidValue(message),
            MichelsonError::Unsupported(message) => TzkError::Unsupported(message),
        }
    }
}

impl From<anyhow::Error> for TzkError {
    fn from(err: anyhow::Error) -> Self {
        TzkError::Other(Arc::new(err))
    }
}
