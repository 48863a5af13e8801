// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   info:   version, options, inis
//!   repo:   targets, log, checkout, fetch, pull, default-branch, action
//! ```

pub mod info;
pub mod repo;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Token cancelled on Ctrl-C or once `timeout` elapses.
///
/// Must be called inside a Tokio runtime.
#[must_use]
pub fn cancellation_token(timeout: Option<Duration>) -> CancellationToken {
    let token = CancellationToken::new();

    let on_interrupt = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    warn!("interrupted, cancelling git");
                    on_interrupt.cancel();
                }
            }
            () = on_interrupt.cancelled() => {}
        }
    });

    if let Some(timeout) = timeout {
        let on_timeout = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(timeout) => {
                    warn!(secs = timeout.as_secs(), "timed out, cancelling git");
                    on_timeout.cancel();
                }
                () = on_timeout.cancelled() => {}
            }
        });
    }

    token
}
