// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ConfigError, Operation, SyncError};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "repository".to_string(),
        key: "path".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"missing required config key 'path' in section '[repository]'");
}

#[test]
fn test_engine_error_keeps_diagnostic_verbatim() {
    let diagnostic = "error: pathspec 'nope' did not match any file(s) known to git";
    let err = SyncError::engine(Operation::Checkout, diagnostic);
    assert!(err.to_string().ends_with(diagnostic));
    match err {
        SyncError::Engine { operation, message } => {
            assert_eq!(operation, Operation::Checkout);
            assert_eq!(message, diagnostic);
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_sync_error_display() {
    let errors = [
        SyncError::NotFound {
            path: "/srv/data".to_string(),
        }
        .to_string(),
        SyncError::NoTrackingRef {
            branch: "main".to_string(),
            remote: "origin".to_string(),
        }
        .to_string(),
        SyncError::Cancelled {
            operation: Operation::Fetch,
        }
        .to_string(),
    ];
    insta::assert_debug_snapshot!(errors, @r#"
    [
        "path not found: /srv/data",
        "branch 'main' has no tracking ref on remote 'origin'",
        "fetch was cancelled",
    ]
    "#);
}

#[test]
fn test_http_status_mapping() {
    let cases = [
        (
            SyncError::InvalidTarget {
                target: String::new(),
            },
            400,
        ),
        (
            SyncError::NotFound {
                path: "x".to_string(),
            },
            404,
        ),
        (
            SyncError::NotARepository {
                path: "x".to_string(),
            },
            409,
        ),
        (SyncError::engine(Operation::Pull, "conflict"), 500),
    ];
    for (err, status) in cases {
        assert_eq!(err.http_status(), status, "status for {err:?}");
    }
}
