// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Single-assignment memoized thunk.
//!
//! Children of structured values and schema generics are held behind a
//! [`Lazy`] so deep trees are only materialized when something forces
//! them. The initializer runs at most once, even under concurrent access.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::OnceCell;

type Init<T> = Box<dyn FnOnce() -> T + Send>;

pub struct Lazy<T> {
    cell: OnceCell<T>,
    init: Mutex<Option<Init<T>>>,
}

impl<T> Lazy<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Mutex::new(Some(Box::new(init))),
        }
    }

    /// Already-evaluated thunk.
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::with_value(value),
            init: Mutex::new(None),
        }
    }

    pub fn get(&self) -> &T {
        self.cell.get_or_init(|| {
            let init = self
                .init
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match init {
                Some(init) => init(),
                // OnceCell runs this closure at most once
                None => unreachable!("lazy initializer consumed twice"),
            }
        })
    }

    pub fn is_evaluated(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Lazy").field(value).finish(),
            None => f.write_str("Lazy(<pending>)"),
        }
    }
}
