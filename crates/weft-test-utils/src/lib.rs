//! Test utilities for Weft development.
//!
//! Provides a [`Recorder`] that captures observer callbacks, a
//! [`CallCounter`] for counting formula executions, and standard graph
//! [`fixtures`] (chains and projections) shared by engine tests and
//! benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub use fixtures::{one_way_chain, projection, two_way_chain, Chain, Projection};

/// Captures every set of values handed to an observer.
///
/// Clones share the same log, so a clone can be moved into the
/// callback while the original is inspected by the test.
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<Vec<T>>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback suitable for [`Solver::observe`](weft_engine::Solver::observe).
    pub fn callback(&self) -> impl Fn(&[&T]) + Send + Sync + 'static {
        let seen = Arc::clone(&self.seen);
        move |values: &[&T]| {
            let snapshot = values.iter().map(|v| (*v).clone()).collect();
            lock(&seen).push(snapshot);
        }
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<T>> {
        lock(&self.seen).clone()
    }

    /// The most recent call.
    pub fn last(&self) -> Option<Vec<T>> {
        lock(&self.seen).last().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.seen).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.seen).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.seen).clear();
    }
}

impl<T: Clone + Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
        }
    }
}

// A panicking assertion inside a callback must not hide later calls.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared counter bumped from inside formulas.
#[derive(Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call.
    pub fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Calls recorded so far.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}
