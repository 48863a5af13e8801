// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mutation sequencing.
//!
//! ```text
//! checkout / fetch_origin / pull
//!   |
//!   +-- RepositoryHandle::open(path)        NotFound
//!   +-- validate target (checkout)          InvalidTarget
//!   +-- PathLocks::acquire(path)            Cancelled
//!   |     previous = current_checkout_target()
//!   |     engine operation                  Engine / Cancelled
//!   |     new      = current_checkout_target()
//!   +-- guard dropped (every exit path)
//!   v
//! OperationResult { previousState, newState, success }
//! ```
//!
//! Reads go through [`MutationCoordinator::resolver`] and take no lock.
//! Failed mutations are not retried or rolled back.

pub mod lock;


use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{Operation, SyncError, SyncResult};
use crate::git::{GitBackend, RepositoryHandle};
use crate::model::OperationResult;
use crate::state::{StateResolver, SyncOptions};

use lock::PathLocks;

/// Rejects checkout targets that must never reach the engine.
///
/// # Errors
///
/// Returns [`SyncError::InvalidTarget`] for an empty target or one that
/// would be parsed as an option.
pub fn validate_target(target: &str) -> SyncResult<()> {
    if target.trim().is_empty() || target.starts_with('-') {
        return Err(SyncError::InvalidTarget {
            target: target.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Mutation<'a> {
    Checkout(&'a str),
    Fetch,
    Pull,
}

impl Mutation<'_> {
    const fn operation(self) -> Operation {
        match self {
            Self::Checkout(_) => Operation::Checkout,
            Self::Fetch => Operation::Fetch,
            Self::Pull => Operation::Pull,
        }
    }
}

/// Runs mutations one at a time per working copy.
///
/// Clones share the lock registry; distinct paths never block each other.
#[derive(Clone)]
pub struct MutationCoordinator {
    backend: Arc<dyn GitBackend>,
    options: SyncOptions,
    locks: PathLocks,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("options", &self.options)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

impl MutationCoordinator {
    #[must_use]
    pub fn new(backend: Arc<dyn GitBackend>, options: SyncOptions) -> Self {
        Self {
            backend,
            options,
            locks: PathLocks::new(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    #[must_use]
    pub const fn locks(&self) -> &PathLocks {
        &self.locks
    }

    /// A fresh resolver bound to `path` for lock-free reads.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if `path` is not a directory.
    pub fn resolver(&self, path: &Path, cancel: CancellationToken) -> SyncResult<StateResolver> {
        let handle =
            RepositoryHandle::open(path, Arc::clone(&self.backend))?.with_cancellation(cancel);
        Ok(StateResolver::new(handle, self.options.clone()))
    }

    /// Checks out `target` (branch, tag or commit).
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidTarget`] before locking; engine failures such as an
    /// unknown ref surface as [`SyncError::Engine`].
    pub async fn checkout(
        &self,
        path: &Path,
        target: &str,
        cancel: CancellationToken,
    ) -> SyncResult<OperationResult> {
        validate_target(target)?;
        self.run(path, cancel, Mutation::Checkout(target)).await
    }

    /// Fetches the configured remote.
    ///
    /// # Errors
    ///
    /// [`SyncError::Cancelled`] while waiting for the lock or during the fetch;
    /// engine failures surface as [`SyncError::Engine`].
    pub async fn fetch_origin(
        &self,
        path: &Path,
        cancel: CancellationToken,
    ) -> SyncResult<OperationResult> {
        self.run(path, cancel, Mutation::Fetch).await
    }

    /// Pulls the current branch.
    ///
    /// # Errors
    ///
    /// Same as [`MutationCoordinator::fetch_origin`].
    pub async fn pull(&self, path: &Path, cancel: CancellationToken) -> SyncResult<OperationResult> {
        self.run(path, cancel, Mutation::Pull).await
    }

    async fn run(
        &self,
        path: &Path,
        cancel: CancellationToken,
        mutation: Mutation<'_>,
    ) -> SyncResult<OperationResult> {
        let operation = mutation.operation();
        let resolver = self.resolver(path, cancel.clone())?;

        let result = self.run_locked(&resolver, &cancel, mutation).await;
        match &result {
            Ok(outcome) => info!(
                path = %resolver.handle().path().display(),
                %operation,
                previous = %outcome.previous_state,
                new = %outcome.new_state,
                "repository updated"
            ),
            Err(SyncError::Cancelled { .. }) => {
                warn!(path = %resolver.handle().path().display(), %operation, "cancelled");
            }
            Err(err) => error!(path = %resolver.handle().path().display(), "{err}"),
        }
        result
    }

    async fn run_locked(
        &self,
        resolver: &StateResolver,
        cancel: &CancellationToken,
        mutation: Mutation<'_>,
    ) -> SyncResult<OperationResult> {
        let handle = resolver.handle();
        let _guard = self
            .locks
            .acquire(handle.path(), cancel, mutation.operation())
            .await?;

        let previous = resolver.current_checkout_target().await?;
        match mutation {
            Mutation::Checkout(target) => handle.checkout(target).await?,
            Mutation::Fetch => {
                handle
                    .fetch(&self.options.remote, self.options.prune)
                    .await?;
            }
            Mutation::Pull => handle.pull().await?,
        }
        let new = resolver.current_checkout_target().await?;

        Ok(OperationResult::succeeded(previous, new))
    }
}
