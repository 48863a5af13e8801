// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository state derived from a [`RepositoryHandle`].
//!
//! ```text
//! local_branches() --> resolve_branches --> [Branch]  (pseudo entry dropped)
//!        |                                     |
//!        +--> current --------------------+    +--> merge_targets --> [CheckoutTarget]
//!                                         |    |                          ^
//! tags() ---------------------------------|----+--------------------------'
//!                                         v
//! incoming_commits():
//!   detached                   -> DivergenceReport::detached()
//!   remote missing             -> NoTrackingRef
//!   fetch <remote>
//!   refs/remotes/<remote>/<b>  missing -> NoTrackingRef
//!   log HEAD..<remote>/<b>     -> DivergenceReport { tracking, incoming }
//! ```
//!
//! Nothing here is cached; every call re-reads the working copy.


use tracing::debug;

use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::git::{BranchListing, RepositoryHandle};
use crate::model::{
    Branch, CheckoutTarget, Commit, CommitRef, DivergenceReport, DivergenceStatus,
};

/// Remote settings shared by the resolver and the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Remote compared against and fetched from.
    pub remote: String,
    /// Prune deleted remote branches on fetch.
    pub prune: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            prune: true,
        }
    }
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self {
            remote: config.repository.remote.clone(),
            prune: config.repository.prune,
        }
    }
}

/// Branches, tags and current target read in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub branches: Vec<Branch>,
    pub tags: Vec<String>,
    pub current: String,
}

/// Converts the engine listing into [`Branch`] values.
///
/// While detached the engine's pseudo entry for HEAD is dropped, so no
/// branch is ever reported active.
#[must_use]
pub fn resolve_branches(listing: &BranchListing) -> Vec<Branch> {
    listing
        .branches
        .iter()
        .filter(|raw| !(listing.detached && raw.is_current))
        .map(|raw| Branch {
            name: raw.name.clone(),
            active: raw.is_current && !listing.detached,
            latest_commit: CommitRef {
                hash: raw.commit_hash.clone(),
                summary: raw.commit_label.clone(),
            },
        })
        .collect()
}

/// Branches first, then tags, each in engine order. A name that is both a
/// branch and a tag appears twice.
#[must_use]
pub fn merge_targets(branches: &[Branch], tags: &[String]) -> Vec<CheckoutTarget> {
    branches
        .iter()
        .map(|b| CheckoutTarget::branch(&b.name))
        .chain(tags.iter().map(CheckoutTarget::tag))
        .collect()
}

/// Read-only queries over one working copy.
#[derive(Debug, Clone)]
pub struct StateResolver {
    handle: RepositoryHandle,
    options: SyncOptions,
}

impl StateResolver {
    #[must_use]
    pub const fn new(handle: RepositoryHandle, options: SyncOptions) -> Self {
        Self { handle, options }
    }

    #[must_use]
    pub const fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Active branch name, or the detached identifier.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn current_checkout_target(&self) -> SyncResult<String> {
        self.handle.current_ref().await
    }

    /// Local branches without the detached pseudo entry.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn resolved_branches(&self) -> SyncResult<Vec<Branch>> {
        let listing = self.handle.local_branches().await?;
        Ok(resolve_branches(&listing))
    }

    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn tags(&self) -> SyncResult<Vec<String>> {
        self.handle.tags().await
    }

    /// Branches followed by tags.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn merged_checkout_targets(&self) -> SyncResult<Vec<CheckoutTarget>> {
        let branches = self.resolved_branches().await?;
        let tags = self.handle.tags().await?;
        Ok(merge_targets(&branches, &tags))
    }

    /// Branches, tags and the current target.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn targets(&self) -> SyncResult<TargetSnapshot> {
        let listing = self.handle.local_branches().await?;
        let tags = self.handle.tags().await?;
        Ok(TargetSnapshot {
            branches: resolve_branches(&listing),
            tags,
            current: listing.current,
        })
    }

    /// Commits on the current branch's remote counterpart that HEAD lacks.
    ///
    /// Fetches from the configured remote first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoTrackingRef`] when the remote or
    /// `<remote>/<branch>` does not exist. A detached HEAD is not an error.
    pub async fn incoming_commits(&self) -> SyncResult<DivergenceReport> {
        let listing = self.handle.local_branches().await?;
        if listing.detached {
            debug!(current = %listing.current, "detached HEAD, no divergence");
            return Ok(DivergenceReport::detached());
        }

        let branch = listing.current;
        let remote = &self.options.remote;
        let no_tracking_ref = |branch: String| SyncError::NoTrackingRef {
            branch,
            remote: remote.clone(),
        };

        if branch.is_empty() || !self.handle.remotes().await?.contains(remote) {
            return Err(no_tracking_ref(branch));
        }

        self.handle.fetch(remote, self.options.prune).await?;

        let upstream = format!("{remote}/{branch}");
        let tracking_ref = format!("refs/remotes/{upstream}");
        if self.handle.resolve_ref(&tracking_ref).await?.is_none() {
            return Err(no_tracking_ref(branch));
        }

        let incoming = self.handle.log(Some(&format!("HEAD..{upstream}"))).await?;
        debug!(%upstream, count = incoming.len(), "incoming commits");
        Ok(DivergenceReport {
            status: DivergenceStatus::Tracking { upstream },
            incoming,
        })
    }

    /// History of HEAD, newest first.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying [`RepositoryHandle`] calls.
    pub async fn commit_log(&self) -> SyncResult<Vec<Commit>> {
        self.handle.log(None).await
    }

    /// Default branch advertised by the configured remote.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if the remote cannot be queried.
    pub async fn default_branch(&self) -> SyncResult<Option<String>> {
        self.handle.remote_head_symref(&self.options.remote).await
    }
}
