// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-path binding to a working copy.
//!
//! ```text
//! RepositoryHandle::open(path)
//!   missing / not a dir -> NotFound
//!   canonicalize
//!
//! every call except is_repository():
//!   ensure_repository() -> NotARepository
//!   backend.<op>(GitContext { repo, cancel })
//! ```
//!
//! Validity is re-checked on every call and never cached; the working copy
//! may change under us at any time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::backend::{BranchListing, GitBackend, GitContext};
use crate::error::{SyncError, SyncResult};
use crate::model::Commit;

/// Thin, fault-wrapped operation surface over one working copy.
#[derive(Clone)]
pub struct RepositoryHandle {
    path: PathBuf,
    backend: Arc<dyn GitBackend>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RepositoryHandle {
    /// Binds to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if `path` does not exist or is not a
    /// directory.
    pub fn open(path: impl AsRef<Path>, backend: Arc<dyn GitBackend>) -> SyncResult<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(SyncError::not_found(path));
        }
        let path = path
            .canonicalize()
            .map_err(|_| SyncError::not_found(path))?;

        Ok(Self {
            path,
            backend,
            cancel: CancellationToken::new(),
        })
    }

    /// Engine calls made through this handle are killed when `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Canonical path of the working copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn ctx(&self) -> GitContext<'_> {
        GitContext {
            repo: &self.path,
            cancel: &self.cancel,
        }
    }

    /// Whether the path is currently a valid working copy.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if the check itself cannot run.
    pub async fn is_repository(&self) -> SyncResult<bool> {
        if !self.path.is_dir() {
            return Ok(false);
        }
        self.backend.is_repository(self.ctx()).await
    }

    async fn ensure_repository(&self) -> SyncResult<()> {
        if !self.path.is_dir() {
            return Err(SyncError::not_found(&self.path));
        }
        if self.backend.is_repository(self.ctx()).await? {
            Ok(())
        } else {
            Err(SyncError::not_a_repository(&self.path))
        }
    }

    /// Raw local branch listing, including any detached pseudo entry.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] or [`SyncError::NotARepository`] when the path
    /// is no longer a working copy; [`SyncError::Engine`] if git fails.
    pub async fn local_branches(&self) -> SyncResult<BranchListing> {
        self.ensure_repository().await?;
        self.backend.list_local_branches(self.ctx()).await
    }

    /// Tag names, in git's order.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryHandle::local_branches`].
    pub async fn tags(&self) -> SyncResult<Vec<String>> {
        self.ensure_repository().await?;
        self.backend.list_tags(self.ctx()).await
    }

    /// Name of the checked-out branch, or the detached identifier.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryHandle::local_branches`].
    pub async fn current_ref(&self) -> SyncResult<String> {
        Ok(self.local_branches().await?.current)
    }

    /// Commits in `range` (HEAD when `None`), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if git rejects the range or its output
    /// cannot be parsed.
    pub async fn log(&self, range: Option<&str>) -> SyncResult<Vec<Commit>> {
        self.ensure_repository().await?;
        self.backend.log(self.ctx(), range).await
    }

    /// Fetches `remote`, pruning deleted remote branches when `prune` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] with git's diagnostic on failure, or
    /// [`SyncError::Cancelled`] if the handle's token fires first.
    pub async fn fetch(&self, remote: &str, prune: bool) -> SyncResult<()> {
        self.ensure_repository().await?;
        debug!(path = %self.path.display(), remote, prune, "fetching");
        self.backend.fetch(self.ctx(), remote, prune).await
    }

    /// Pulls the current branch from its upstream.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryHandle::fetch`].
    pub async fn pull(&self) -> SyncResult<()> {
        self.ensure_repository().await?;
        debug!(path = %self.path.display(), "pulling");
        self.backend.pull(self.ctx()).await
    }

    /// Checks out `target`. Tags and commits leave HEAD detached.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] when git refuses, for example an unknown
    /// ref or local changes that would be overwritten.
    pub async fn checkout(&self, target: &str) -> SyncResult<()> {
        self.ensure_repository().await?;
        debug!(path = %self.path.display(), target, "checking out");
        self.backend.checkout(self.ctx(), target).await
    }

    /// Configured remote names.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if git fails.
    pub async fn remotes(&self) -> SyncResult<Vec<String>> {
        self.ensure_repository().await?;
        self.backend.list_remotes(self.ctx()).await
    }

    /// Commit `refname` points at, `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] for failures other than a missing ref.
    pub async fn resolve_ref(&self, refname: &str) -> SyncResult<Option<String>> {
        self.ensure_repository().await?;
        self.backend.resolve_ref(self.ctx(), refname).await
    }

    /// Branch the remote's HEAD points at, queried over the network.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if the remote cannot be reached.
    pub async fn remote_head_symref(&self, remote: &str) -> SyncResult<Option<String>> {
        self.ensure_repository().await?;
        self.backend.remote_head_symref(self.ctx(), remote).await
    }
}
