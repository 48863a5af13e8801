// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git engine abstraction layer.
//!
//! ```text
//! RepositoryHandle --> dyn GitBackend --> ShellBackend --> git CLI
//!                                    \--> scripted backends (tests)
//! ```
//!
//! The trait is the only place the crate touches engine output shapes;
//! everything above it works on [`BranchListing`] and [`Commit`] values.

mod shell;

#[cfg(test)]
pub(crate) mod scripted;

use std::path::Path;

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::SyncResult;
use crate::model::Commit;

pub use shell::ShellBackend;

/// Per-call context handed to every backend operation.
#[derive(Debug, Clone, Copy)]
pub struct GitContext<'a> {
    /// Working copy the command runs in.
    pub repo: &'a Path,
    /// Cancelling kills the engine process.
    pub cancel: &'a CancellationToken,
}

/// A local branch as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBranch {
    pub name: String,
    pub is_current: bool,
    pub commit_hash: String,
    pub commit_label: String,
}

/// Local branch listing.
///
/// While detached, the engine reports the detached HEAD as a pseudo branch
/// (e.g. `(HEAD detached at v1.0)`) marked current; `current` then holds the
/// detached identifier (`v1.0`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchListing {
    pub branches: Vec<RawBranch>,
    pub current: String,
    pub detached: bool,
}

/// Operations the repository core consumes from a version control engine.
///
/// Implementations report failures as `SyncError::Engine` with the
/// engine's own diagnostic, or `SyncError::Cancelled` when `ctx.cancel`
/// fires while the engine is running. They never retry.
pub trait GitBackend: Send + Sync {
    /// Whether `ctx.repo` is inside a work tree.
    fn is_repository<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<bool>>;

    fn list_local_branches<'a>(
        &'a self,
        ctx: GitContext<'a>,
    ) -> BoxFuture<'a, SyncResult<BranchListing>>;

    /// Tag names in engine order.
    fn list_tags<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>>;

    /// Configured remote names.
    fn list_remotes<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>>;

    /// Commit hash `refname` points at, `None` if it does not exist.
    fn resolve_ref<'a>(
        &'a self,
        ctx: GitContext<'a>,
        refname: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>>;

    /// Log of `range` (e.g. `HEAD..origin/main`), or of HEAD; newest first.
    fn log<'a>(
        &'a self,
        ctx: GitContext<'a>,
        range: Option<&'a str>,
    ) -> BoxFuture<'a, SyncResult<Vec<Commit>>>;

    fn fetch<'a>(
        &'a self,
        ctx: GitContext<'a>,
        remote: &'a str,
        prune: bool,
    ) -> BoxFuture<'a, SyncResult<()>>;

    /// Pull the current branch from its configured upstream.
    fn pull<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<()>>;

    fn checkout<'a>(
        &'a self,
        ctx: GitContext<'a>,
        treeish: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>>;

    /// Default branch advertised by `remote`'s HEAD symref, if any.
    fn remote_head_symref<'a>(
        &'a self,
        ctx: GitContext<'a>,
        remote: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>>;
}
