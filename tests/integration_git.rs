// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for working copy synchronization.
//!
//! Drives real `git` in temporary repositories through the handle, the
//! resolver and the coordinator.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use reposync::coordinator::MutationCoordinator;
use reposync::error::{Operation, SyncError};
use reposync::git::{GitBackend, RepositoryHandle, ShellBackend};
use reposync::model::{CheckoutTarget, DivergenceStatus};
use reposync::state::SyncOptions;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn backend() -> Arc<dyn GitBackend> {
    Arc::new(ShellBackend::default())
}

fn coordinator() -> MutationCoordinator {
    MutationCoordinator::new(backend(), SyncOptions::default())
}

/// Helper to run git commands in a directory
fn run_git(args: &[&str], cwd: &Path) {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit_file(dir: &Path, name: &str, message: &str) {
    fs::write(dir.join(name), message).unwrap();
    run_git(&["add", "."], dir);
    run_git(&["commit", "-q", "-m", message], dir);
}

/// Repo with `main` (current), `feature` and tag `v1.0`.
fn init_scenario_repo(dir: &Path) {
    run_git(&["init", "-q", "-b", "main"], dir);
    commit_file(dir, "README.md", "Initial commit");
    run_git(&["tag", "v1.0"], dir);
    run_git(&["branch", "feature"], dir);
    commit_file(dir, "CHANGELOG.md", "Second commit");
}

/// Bare `origin` plus a working clone tracking `origin/main`.
struct RemoteFixture {
    _root: TempDir,
    origin: std::path::PathBuf,
    work: std::path::PathBuf,
}

impl RemoteFixture {
    fn new() -> Self {
        let root = temp_dir();
        let seed = root.path().join("seed");
        let origin = root.path().join("origin.git");
        let work = root.path().join("work");
        fs::create_dir(&seed).unwrap();
        init_scenario_repo(&seed);
        run_git(
            &["clone", "-q", "--bare", "seed", "origin.git"],
            root.path(),
        );
        run_git(&["clone", "-q", "origin.git", "work"], root.path());
        Self {
            _root: root,
            origin,
            work,
        }
    }

    /// Pushes a new commit to origin/main from a separate clone.
    fn push_upstream(&self, message: &str) {
        let other = self.origin.with_file_name("other");
        if !other.exists() {
            run_git(
                &["clone", "-q", "origin.git", "other"],
                self.origin.parent().unwrap(),
            );
        }
        commit_file(&other, &format!("{message}.txt"), message);
        run_git(&["push", "-q", "origin", "main"], &other);
    }
}

// =============================================================================
// RepositoryHandle
// =============================================================================

#[tokio::test]
async fn git_is_repository_matches_branch_listing() {
    let plain = temp_dir();
    let handle = RepositoryHandle::open(plain.path(), backend()).unwrap();
    assert!(!handle.is_repository().await.unwrap());
    assert!(matches!(
        handle.local_branches().await,
        Err(SyncError::NotARepository { .. })
    ));

    run_git(&["init", "-q"], plain.path());
    assert!(handle.is_repository().await.unwrap());
    assert!(handle.local_branches().await.is_ok());
}

#[tokio::test]
async fn git_open_missing_path() {
    let temp = temp_dir();
    let err = RepositoryHandle::open(temp.path().join("nope"), backend()).unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
}

// =============================================================================
// StateResolver
// =============================================================================

#[tokio::test]
async fn git_merged_targets_branches_then_tags() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let resolver = coordinator()
        .resolver(temp.path(), CancellationToken::new())
        .unwrap();

    let targets = resolver.merged_checkout_targets().await.unwrap();
    // git lists branches by name
    assert_eq!(
        targets,
        [
            CheckoutTarget::branch("feature"),
            CheckoutTarget::branch("main"),
            CheckoutTarget::tag("v1.0"),
        ]
    );
    assert_eq!(resolver.current_checkout_target().await.unwrap(), "main");
}

#[tokio::test]
async fn git_no_upstream_is_no_tracking_ref() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let resolver = coordinator()
        .resolver(temp.path(), CancellationToken::new())
        .unwrap();

    let err = resolver.incoming_commits().await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::NoTrackingRef { ref branch, .. } if branch == "main"
    ));
}

#[tokio::test]
async fn git_commit_log_newest_first() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let resolver = coordinator()
        .resolver(temp.path(), CancellationToken::new())
        .unwrap();

    let log = resolver.commit_log().await.unwrap();
    let messages: Vec<_> = log.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, ["Second commit", "Initial commit"]);
    assert_eq!(log[0].author.email, "test@test.com");
}

// =============================================================================
// MutationCoordinator
// =============================================================================

#[tokio::test]
async fn git_checkout_tag_detaches() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let coordinator = coordinator();

    let result = coordinator
        .checkout(temp.path(), "v1.0", CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.previous_state, "main");
    assert_eq!(result.new_state, "v1.0");

    let resolver = coordinator
        .resolver(temp.path(), CancellationToken::new())
        .unwrap();
    let branches = resolver.resolved_branches().await.unwrap();
    assert!(branches.iter().all(|b| !b.active));
    assert!(branches.iter().all(|b| !b.name.starts_with('(')));
    let report = resolver.incoming_commits().await.unwrap();
    assert_eq!(report.status, DivergenceStatus::Detached);
    assert!(report.incoming.is_empty());
}

#[tokio::test]
async fn git_checkout_round_trip() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let coordinator = coordinator();

    let mut pairs = Vec::new();
    for target in ["feature", "main", "feature"] {
        let result = coordinator
            .checkout(temp.path(), target, CancellationToken::new())
            .await
            .unwrap();
        pairs.push(format!("{}->{}", result.previous_state, result.new_state));
    }
    assert_eq!(pairs, ["main->feature", "feature->main", "main->feature"]);
}

#[tokio::test]
async fn git_checkout_nonexistent_ref() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let coordinator = coordinator();

    let err = coordinator
        .checkout(temp.path(), "nonexistent-ref", CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        SyncError::Engine { operation, message } => {
            assert_eq!(operation, Operation::Checkout);
            assert!(message.contains("nonexistent-ref"), "got: {message}");
        }
        other => panic!("expected engine error, got {other:?}"),
    }

    let current = coordinator
        .resolver(temp.path(), CancellationToken::new())
        .unwrap()
        .current_checkout_target()
        .await
        .unwrap();
    assert_eq!(current, "main");
}

#[tokio::test]
async fn git_concurrent_checkouts_chain() {
    let temp = temp_dir();
    init_scenario_repo(temp.path());
    let coordinator = coordinator();

    let (a, b) = tokio::join!(
        coordinator.checkout(temp.path(), "feature", CancellationToken::new()),
        coordinator.checkout(temp.path(), "v1.0", CancellationToken::new()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(
        a.previous_state == b.new_state || b.previous_state == a.new_state,
        "interleaved: {a:?} / {b:?}"
    );
}

#[tokio::test]
async fn git_fetch_twice_is_idempotent() {
    let fixture = RemoteFixture::new();
    let coordinator = coordinator();

    for _ in 0..2 {
        coordinator
            .fetch_origin(&fixture.work, CancellationToken::new())
            .await
            .unwrap();
        let report = coordinator
            .resolver(&fixture.work, CancellationToken::new())
            .unwrap()
            .incoming_commits()
            .await
            .unwrap();
        assert_eq!(
            report.status,
            DivergenceStatus::Tracking {
                upstream: "origin/main".to_string()
            }
        );
        assert!(report.incoming.is_empty());
    }
}

#[tokio::test]
async fn git_incoming_then_pull() {
    let fixture = RemoteFixture::new();
    fixture.push_upstream("Upstream change");
    let coordinator = coordinator();
    let resolver = coordinator
        .resolver(&fixture.work, CancellationToken::new())
        .unwrap();

    let report = resolver.incoming_commits().await.unwrap();
    assert_eq!(report.incoming.len(), 1);
    assert_eq!(report.incoming[0].message, "Upstream change");

    let result = coordinator
        .pull(&fixture.work, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.previous_state, "main");
    assert_eq!(result.new_state, "main");
    assert!(resolver.incoming_commits().await.unwrap().incoming.is_empty());
    assert_eq!(
        resolver.commit_log().await.unwrap()[0].message,
        "Upstream change"
    );
}

#[tokio::test]
async fn git_default_branch_from_remote() {
    let fixture = RemoteFixture::new();
    let resolver = coordinator()
        .resolver(&fixture.work, CancellationToken::new())
        .unwrap();

    assert_eq!(
        resolver.default_branch().await.unwrap().as_deref(),
        Some("main")
    );
}
