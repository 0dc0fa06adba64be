// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Single-flight resolution of remote data.
//!
//! A [`SingleFlight`] slot moves through
//! `Unresolved → Pending → {Resolved | Unresolved}`. Concurrent callers
//! that find the slot `Pending` await the same shared future, so one
//! logical fetch produces one set of requests. A failure puts the slot
//! back to `Unresolved` and is returned to every waiter; the next call
//! starts over.
//!
//! [`TtlCache`] keys one slot per lookup and lets resolved entries
//! expire. Expired and failed slots are dropped on the next lookup.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::error::TzkResult;

type SharedFetch<T> = Shared<BoxFuture<'static, TzkResult<Arc<T>>>>;

enum Slot<T> {
    Unresolved,
    Pending {
        generation: u64,
        fetch: SharedFetch<T>,
    },
    Resolved {
        value: Arc<T>,
        expires_at: Option<Instant>,
    },
}

struct State<T> {
    slot: Slot<T>,
    generation: u64,
}

pub struct SingleFlight<T> {
    label: &'static str,
    ttl: Option<Duration>,
    state: Mutex<State<T>>,
}

impl<T> SingleFlight<T>
where
    T: Send + Sync + 'static,
{
    /// Resolved values are kept for the lifetime of the slot.
    pub fn new(label: &'static str) -> Self {
        Self::build(label, None)
    }

    /// Resolved values are refetched once `ttl` has elapsed.
    pub fn with_ttl(label: &'static str, ttl: Duration) -> Self {
        Self::build(label, Some(ttl))
    }

    fn build(label: &'static str, ttl: Option<Duration>) -> Self {
        Self {
            label,
            ttl,
            state: Mutex::new(State {
                slot: Slot::Unresolved,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the resolved value, joining an in-flight fetch or starting
    /// one with `fetch` when there is neither.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> TzkResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TzkResult<T>> + Send + 'static,
    {
        let (generation, shared) = {
            let mut state = self.lock();
            match &state.slot {
                Slot::Resolved { value, expires_at }
                    if expires_at.map_or(true, |at| Instant::now() < at) =>
                {
                    debug!(cache = self.label, "cache hit");
                    return Ok(Arc::clone(value));
                }
                Slot::Pending { generation, fetch } => {
                    debug!(cache = self.label, "joined in-flight fetch");
                    (*generation, fetch.clone())
                }
                _ => {
                    state.generation += 1;
                    let generation = state.generation;
                    debug!(cache = self.label, generation, "fetch started");
                    let shared = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                    state.slot = Slot::Pending {
                        generation,
                        fetch: shared.clone(),
                    };
                    (generation, shared)
                }
            }
        };

        let result = shared.await;

        let mut state = self.lock();
        if matches!(state.slot, Slot::Pending { generation: g, .. } if g == generation) {
            state.slot = match &result {
                Ok(value) => {
                    debug!(cache = self.label, generation, "resolved");
                    Slot::Resolved {
                        value: Arc::clone(value),
                        expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
                    }
                }
                Err(err) => {
                    debug!(cache = self.label, generation, error = %err, "reset after failure");
                    Slot::Unresolved
                }
            };
        }
        result
    }

    /// Resolved value, if any, without fetching.
    pub fn peek(&self) -> Option<Arc<T>> {
        match &self.lock().slot {
            Slot::Resolved { value, expires_at }
                if expires_at.map_or(true, |at| Instant::now() < at) =>
            {
                Some(Arc::clone(value))
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.lock().slot, Slot::Pending { .. })
    }

    /// Drop whatever the slot holds. An in-flight fetch keeps running for
    /// the callers already waiting on it but no longer settles the slot.
    pub fn reset(&self) {
        self.lock().slot = Slot::Unresolved;
    }
}

/// Keyed [`SingleFlight`] slots sharing one expiry.
pub struct TtlCache<K, V> {
    label: &'static str,
    ttl: Duration,
    entries: Mutex<HashMap<K, Arc<SingleFlight<V>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Send + Sync + 'static,
{
    pub fn new(label: &'static str, ttl: Duration) -> Self {
        Self {
            label,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &K) -> Arc<SingleFlight<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        // a slot held outside the map may be about to start a fetch
        entries.retain(|_, slot| {
            Arc::strong_count(slot) > 1 || slot.is_pending() || slot.peek().is_some()
        });
        if entries.len() < before {
            debug!(cache = self.label, evicted = before - entries.len(), "pruned stale entries");
        }
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(SingleFlight::with_ttl(self.label, self.ttl))),
        )
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> TzkResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TzkResult<V>> + Send + 'static,
    {
        let slot = self.slot(key);
        slot.get_or_fetch(fetch).await
    }

    pub fn invalidate(&self, key: &K) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
