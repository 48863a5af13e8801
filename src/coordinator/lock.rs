// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-path mutual exclusion for mutations.
//!
//! ```text
//! PathLocks (shared by coordinator clones)
//!   HashMap<canonical path, Arc<tokio::Mutex<()>>>
//!
//! acquire(path) -> PathGuard   entry released when the guard drops,
//!                              including during unwinding
//! ```
//!
//! Entries nobody holds or waits on are pruned on the next acquire.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{Operation, SyncError, SyncResult};

type Registry = HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>;

/// Registry of per-path locks. Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    inner: Arc<Mutex<Registry>>,
}

/// Exclusive hold on one path.
#[derive(Debug)]
pub struct PathGuard {
    path: PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl PathGuard {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "released repository lock");
    }
}

impl PathLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(registry.entry(path.to_path_buf()).or_default())
    }

    /// Waits for exclusive access to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cancelled`] if `cancel` fires first.
    pub async fn acquire(
        &self,
        path: &Path,
        cancel: &CancellationToken,
        operation: Operation,
    ) -> SyncResult<PathGuard> {
        let lock = self.entry(path);
        let guard = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SyncError::Cancelled { operation }),
            guard = lock.lock_owned() => guard,
        };
        trace!(path = %path.display(), %operation, "acquired repository lock");
        Ok(PathGuard {
            path: path.to_path_buf(),
            _guard: guard,
        })
    }

    /// Number of paths currently held or waited on.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
