// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory git backend for resolver and coordinator tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::DateTime;
use futures_util::future::BoxFuture;

use super::{BranchListing, GitBackend, GitContext, RawBranch};
use crate::error::{Operation, SyncError, SyncResult};
use crate::model::{Author, Commit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug)]
struct State {
    is_repo: bool,
    branches: Vec<String>,
    tags: Vec<String>,
    head: Head,
    remotes: Vec<String>,
    /// `<remote>/<branch>` -> commits HEAD does not have yet
    tracking: BTreeMap<String, Vec<Commit>>,
    history: Vec<Commit>,
    default_branch: Option<String>,
    failures: HashMap<Operation, String>,
    /// Next mutation of this kind panics mid-flight.
    panic_on: Option<Operation>,
}

/// Scripted working copy. Records every call and the peak number of
/// concurrently running mutations.
#[derive(Debug)]
pub(crate) struct ScriptedBackend {
    state: Mutex<State>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

pub(crate) fn commit(hash: &str, message: &str) -> Commit {
    Commit {
        hash: hash.to_string(),
        message: message.to_string(),
        date: DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").expect("valid date"),
        author: Author {
            name: "Test".to_string(),
            email: "test@test.com".to_string(),
        },
    }
}

impl ScriptedBackend {
    pub(crate) fn repository(branches: &[&str], current: &str) -> Self {
        Self {
            state: Mutex::new(State {
                is_repo: true,
                branches: branches.iter().map(ToString::to_string).collect(),
                tags: Vec::new(),
                head: Head::Branch(current.to_string()),
                remotes: Vec::new(),
                tracking: BTreeMap::new(),
                history: vec![commit("c0ffee", "Initial commit")],
                default_branch: None,
                failures: HashMap::new(),
                panic_on: None,
            }),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn not_a_repository() -> Self {
        let backend = Self::repository(&[], "main");
        backend.state().is_repo = false;
        backend
    }

    pub(crate) fn with_tags(self, tags: &[&str]) -> Self {
        self.state().tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    pub(crate) fn with_remote(self, remote: &str) -> Self {
        self.state().remotes.push(remote.to_string());
        self
    }

    pub(crate) fn with_tracking(self, upstream: &str, incoming: Vec<Commit>) -> Self {
        self.state().tracking.insert(upstream.to_string(), incoming);
        self
    }

    pub(crate) fn with_default_branch(self, branch: &str) -> Self {
        self.state().default_branch = Some(branch.to_string());
        self
    }

    pub(crate) fn detached_at(self, identifier: &str) -> Self {
        self.state().head = Head::Detached(identifier.to_string());
        self
    }

    pub(crate) fn failing(self, operation: Operation, message: &str) -> Self {
        self.state().failures.insert(operation, message.to_string());
        self
    }

    /// The next `operation` mutation panics instead of completing.
    pub(crate) fn panicking(self, operation: Operation) -> Self {
        self.state().panic_on = Some(operation);
        self
    }

    /// Mutations sleep this long while holding the working copy.
    pub(crate) const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn head(&self) -> Head {
        self.state().head.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("state lock")
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls lock").push(call.into());
    }

    fn check(&self, operation: Operation) -> SyncResult<()> {
        match self.state().failures.get(&operation) {
            Some(message) => Err(SyncError::engine(operation, message.clone())),
            None => Ok(()),
        }
    }

    /// Runs `apply` as a mutation that takes `delay` to complete.
    async fn mutate(
        &self,
        ctx: GitContext<'_>,
        operation: Operation,
        apply: impl FnOnce(&mut State) -> SyncResult<()>,
    ) -> SyncResult<()> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = tokio::select! {
            () = tokio::time::sleep(self.delay) => {
                let panics = self.state().panic_on.take_if(|op| *op == operation).is_some();
                assert!(!panics, "scripted {operation} panicked");
                self.check(operation).and_then(|()| apply(&mut self.state()))
            }
            () = ctx.cancel.cancelled() => Err(SyncError::Cancelled { operation }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl GitBackend for ScriptedBackend {
    fn is_repository<'a>(&'a self, _ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<bool>> {
        Box::pin(async move {
            self.check(Operation::IsRepository)?;
            Ok(self.state().is_repo)
        })
    }

    fn list_local_branches<'a>(
        &'a self,
        _ctx: GitContext<'a>,
    ) -> BoxFuture<'a, SyncResult<BranchListing>> {
        Box::pin(async move {
            self.record("branch");
            self.check(Operation::ListBranches)?;
            let state = self.state();
            let mut listing = BranchListing::default();

            if let Head::Detached(id) = &state.head {
                listing.detached = true;
                listing.current.clone_from(id);
                listing.branches.push(RawBranch {
                    name: format!("(HEAD detached at {id})"),
                    is_current: true,
                    commit_hash: "d3adb33".to_string(),
                    commit_label: "Detached commit".to_string(),
                });
            }
            for name in &state.branches {
                let is_current = state.head == Head::Branch(name.clone());
                if is_current {
                    listing.current.clone_from(name);
                }
                listing.branches.push(RawBranch {
                    name: name.clone(),
                    is_current,
                    commit_hash: format!("{name}-tip"),
                    commit_label: format!("Tip of {name}"),
                });
            }
            Ok(listing)
        })
    }

    fn list_tags<'a>(&'a self, _ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>> {
        Box::pin(async move {
            self.check(Operation::ListTags)?;
            Ok(self.state().tags.clone())
        })
    }

    fn list_remotes<'a>(&'a self, _ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>> {
        Box::pin(async move {
            self.check(Operation::ListRemotes)?;
            Ok(self.state().remotes.clone())
        })
    }

    fn resolve_ref<'a>(
        &'a self,
        _ctx: GitContext<'a>,
        refname: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>> {
        Box::pin(async move {
            self.check(Operation::ResolveRef)?;
            let upstream = refname.strip_prefix("refs/remotes/").unwrap_or(refname);
            Ok(self
                .state()
                .tracking
                .contains_key(upstream)
                .then(|| format!("{upstream}-tip")))
        })
    }

    fn log<'a>(
        &'a self,
        _ctx: GitContext<'a>,
        range: Option<&'a str>,
    ) -> BoxFuture<'a, SyncResult<Vec<Commit>>> {
        Box::pin(async move {
            self.record(range.map_or_else(|| "log".to_string(), |r| format!("log {r}")));
            self.check(Operation::Log)?;
            let state = self.state();
            match range.and_then(|r| r.strip_prefix("HEAD..")) {
                Some(upstream) => state.tracking.get(upstream).cloned().ok_or_else(|| {
                    SyncError::engine(
                        Operation::Log,
                        format!("fatal: ambiguous argument '{upstream}'"),
                    )
                }),
                None => Ok(state.history.clone()),
            }
        })
    }

    fn fetch<'a>(
        &'a self,
        ctx: GitContext<'a>,
        remote: &'a str,
        prune: bool,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.record(format!("fetch {remote} prune={prune}"));
            self.mutate(ctx, Operation::Fetch, |_| Ok(())).await
        })
    }

    fn pull<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.record("pull");
            self.mutate(ctx, Operation::Pull, |state| {
                let Head::Branch(branch) = state.head.clone() else {
                    return Err(SyncError::engine(
                        Operation::Pull,
                        "You are not currently on a branch.",
                    ));
                };
                let upstream = format!("origin/{branch}");
                let incoming = state.tracking.get_mut(&upstream).ok_or_else(|| {
                    SyncError::engine(
                        Operation::Pull,
                        "There is no tracking information for the current branch.",
                    )
                })?;
                let mut merged = std::mem::take(incoming);
                merged.append(&mut state.history);
                state.history = merged;
                Ok(())
            })
            .await
        })
    }

    fn checkout<'a>(
        &'a self,
        ctx: GitContext<'a>,
        treeish: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.record(format!("checkout {treeish}"));
            self.mutate(ctx, Operation::Checkout, |state| {
                if state.branches.iter().any(|b| b == treeish) {
                    state.head = Head::Branch(treeish.to_string());
                } else if state.tags.iter().any(|t| t == treeish) {
                    state.head = Head::Detached(treeish.to_string());
                } else {
                    return Err(SyncError::engine(
                        Operation::Checkout,
                        format!(
                            "error: pathspec '{treeish}' did not match any file(s) known to git"
                        ),
                    ));
                }
                Ok(())
            })
            .await
        })
    }

    fn remote_head_symref<'a>(
        &'a self,
        _ctx: GitContext<'a>,
        _remote: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>> {
        Box::pin(async move {
            self.check(Operation::RemoteHead)?;
            Ok(self.state().default_branch.clone())
        })
    }
}
