// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! The published snapshot and its freshness policy.
//!
//! The current snapshot sits in a `tokio::sync::watch` channel as an
//! `Arc<RateSnapshot>`. Readers clone the `Arc` and never lock; the single
//! writer replaces it wholesale. Refresh cycles are serialized by a gate.

use crate::model::RateSnapshot;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, MutexGuard};

pub struct SnapshotCache {
    tx: watch::Sender<Arc<RateSnapshot>>,
    gate: Mutex<()>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::with_snapshot(RateSnapshot::empty())
    }

    /// Start from a previously persisted or injected snapshot.
    pub fn with_snapshot(snapshot: RateSnapshot) -> Self {
        let (tx, _) = watch::channel(Arc::new(snapshot));
        Self {
            tx,
            gate: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<RateSnapshot> {
        self.tx.borrow().clone()
    }

    /// The current snapshot if it was fetched less than `window` ago.
    ///
    /// The loading marker is never fresh: a caller arriving mid-refresh
    /// waits for the cycle's result instead.
    pub fn fresh(&self, now: DateTime<Utc>, window: Duration) -> Option<Arc<RateSnapshot>> {
        let current = self.current();
        (!current.is_loading && current.is_fresh(now, window)).then_some(current)
    }

    /// Change notifications for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RateSnapshot>> {
        self.tx.subscribe()
    }

    /// Wait for any running refresh to finish, then own the next one.
    pub async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// Publish the loading marker and return a guard for the cycle.
    ///
    /// Dropping the guard without committing restores the snapshot that was
    /// current before the cycle started.
    pub fn begin_refresh(&self) -> RefreshGuard<'_> {
        let previous = self.current();
        self.publish(Arc::new(previous.with_loading(true)));
        RefreshGuard {
            cache: self,
            previous: Some(previous),
        }
    }

    fn publish(&self, snapshot: Arc<RateSnapshot>) {
        self.tx.send_replace(snapshot);
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-progress refresh cycle.
pub struct RefreshGuard<'a> {
    cache: &'a SnapshotCache,
    previous: Option<Arc<RateSnapshot>>,
}

impl RefreshGuard<'_> {
    /// Replace the published snapshot with the cycle's result.
    pub fn commit(mut self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        self.previous = None;
        let snapshot = Arc::new(snapshot);
        self.cache.publish(Arc::clone(&snapshot));
        snapshot
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            tracing::debug!("refresh abandoned; restoring previous snapshot");
            self.cache.publish(previous);
        }
    }
}
