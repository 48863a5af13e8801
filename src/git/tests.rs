// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;

use super::RepositoryHandle;
use super::backend::scripted::ScriptedBackend;
use super::parse::{
    detached_identifier, parse_branch_listing, parse_head_symref, parse_lines, parse_log,
};
use crate::error::{Operation, SyncError};

// =============================================================================
// parse
// =============================================================================

#[test]
fn test_parse_branch_listing_attached() {
    let stdout = " \0feature\0a1b2c3d\0Add feature\n*\0main\0e4f5a6b\0Initial commit";
    let listing = parse_branch_listing(stdout);

    assert!(!listing.detached);
    assert_eq!(listing.current, "main");
    assert_eq!(listing.branches.len(), 2);
    assert!(!listing.branches[0].is_current);
    assert_eq!(listing.branches[0].commit_hash, "a1b2c3d");
    assert_eq!(listing.branches[1].commit_label, "Initial commit");
}

#[test]
fn test_parse_branch_listing_detached() {
    let stdout = "*\0(HEAD detached at v1.0)\0a1b2c3d\0Release\n \0main\0a1b2c3d\0Release";
    let listing = parse_branch_listing(stdout);

    assert!(listing.detached);
    assert_eq!(listing.current, "v1.0");
    assert_eq!(listing.branches[0].name, "(HEAD detached at v1.0)");
}

#[test]
fn test_parse_branch_listing_empty() {
    let listing = parse_branch_listing("");
    assert!(listing.branches.is_empty());
    assert!(listing.current.is_empty());
}

#[test]
fn test_detached_identifier() {
    assert_eq!(detached_identifier("(HEAD detached at v1.0)"), "v1.0");
    assert_eq!(detached_identifier("(HEAD detached from 1a2b3c4)"), "1a2b3c4");
    assert_eq!(detached_identifier("(detached at origin/main)"), "origin/main");
    assert_eq!(
        detached_identifier("(no branch, rebasing main)"),
        "no branch, rebasing main"
    );
}

#[test]
fn test_parse_log() {
    let stdout = "abc123\x1f2024-03-01T12:30:00+02:00\x1fDev\x1fdev@example.com\x1fFix build\n\
                  def456\x1f2024-02-28T09:00:00+00:00\x1fOther\x1fother@example.com\x1f";
    let log = parse_log(stdout).expect("valid log");

    assert_eq!(log.len(), 2);
    assert_eq!(log[0].hash, "abc123");
    assert_eq!(log[0].message, "Fix build");
    assert_eq!(log[0].date.to_rfc3339(), "2024-03-01T12:30:00+02:00");
    assert_eq!(log[1].author.email, "other@example.com");
    assert_eq!(log[1].message, "");
}

#[test]
fn test_parse_log_rejects_malformed_line() {
    let err = parse_log("abc123 not a log line").unwrap_err();
    insta::assert_snapshot!(err, @"unexpected log line: abc123 not a log line");
}

#[test]
fn test_parse_head_symref() {
    let stdout = "ref: refs/heads/main\tHEAD\n0123456789abcdef\tHEAD";
    assert_eq!(parse_head_symref(stdout).as_deref(), Some("main"));

    let dashed = "ref: refs/heads/release-2.x\tHEAD\n0123\tHEAD";
    assert_eq!(parse_head_symref(dashed).as_deref(), Some("release-2.x"));

    assert_eq!(parse_head_symref("0123456789abcdef\tHEAD"), None);
}

#[test]
fn test_parse_lines() {
    assert_eq!(parse_lines("v1.0\n\n  v2.0  \n"), ["v1.0", "v2.0"]);
    assert!(parse_lines("").is_empty());
}

// =============================================================================
// RepositoryHandle
// =============================================================================

#[test]
fn test_open_missing_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("missing");
    let err = RepositoryHandle::open(&missing, Arc::new(ScriptedBackend::repository(&[], "main")))
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
}

#[test]
fn test_open_file_is_not_found() {
    let temp = tempfile::tempdir().expect("temp dir");
    let file = temp.path().join("file.txt");
    std::fs::write(&file, "x").expect("write file");
    let err = RepositoryHandle::open(&file, Arc::new(ScriptedBackend::repository(&[], "main")))
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
}

#[tokio::test]
async fn test_operations_require_repository() {
    let temp = tempfile::tempdir().expect("temp dir");
    let handle =
        RepositoryHandle::open(temp.path(), Arc::new(ScriptedBackend::not_a_repository()))
            .expect("directory exists");

    assert!(!handle.is_repository().await.expect("check runs"));
    assert!(matches!(
        handle.local_branches().await,
        Err(SyncError::NotARepository { .. })
    ));
    assert!(matches!(
        handle.checkout("main").await,
        Err(SyncError::NotARepository { .. })
    ));
}

#[tokio::test]
async fn test_handle_current_ref() {
    let temp = tempfile::tempdir().expect("temp dir");
    let backend = Arc::new(ScriptedBackend::repository(&["main", "feature"], "feature"));
    let handle = RepositoryHandle::open(temp.path(), backend).expect("open");

    assert_eq!(handle.current_ref().await.expect("current"), "feature");
}

#[tokio::test]
async fn test_handle_surfaces_engine_diagnostic() {
    let temp = tempfile::tempdir().expect("temp dir");
    let backend = Arc::new(
        ScriptedBackend::repository(&["main"], "main")
            .failing(Operation::Fetch, "fatal: unable to access 'https://host/'"),
    );
    let handle = RepositoryHandle::open(temp.path(), backend).expect("open");

    let err = handle.fetch("origin", true).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"fetch failed: fatal: unable to access 'https://host/'");
}

#[test]
fn test_handle_path_is_canonical() {
    let temp = tempfile::tempdir().expect("temp dir");
    let nested = temp.path().join("repo");
    std::fs::create_dir(&nested).expect("create dir");
    let spelled = nested.join("..").join("repo");

    let handle = RepositoryHandle::open(&spelled, Arc::new(ScriptedBackend::repository(&[], "main")))
        .expect("open");
    assert_eq!(handle.path(), nested.canonicalize().expect("canonical"));
}
