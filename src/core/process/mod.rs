// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning and management.
//!
//! ```text
//! ProcessBuilder::new("git")
//!   .args() .cwd() .env() .capture_output()
//!   .run() / .run_with_cancellation()
//!       --> tokio::process::Command (kill_on_drop, own process group)
//!           cancel --> SIGKILL to the group
//!           read stdout/stderr to completion
//!       --> ProcessOutput { exit_code, stdout, stderr, interrupted }
//! ```

pub mod builder;
mod io;
mod runner;
#[cfg(unix)]
mod unix;
