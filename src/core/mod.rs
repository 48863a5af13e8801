// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core runtime services.
//!
//! ```text
//!     core
//!      |
//!      v
//!   process
//!   ProcessBuilder --> tokio::process --> ProcessOutput
//!   run() / run_with_cancellation(token)
//! ```

pub mod process;
