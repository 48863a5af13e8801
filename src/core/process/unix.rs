// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unix-specific process utilities.
//!
//! ```text
//! build_command --> process_group(0)   child leads its own group
//! cancellation:  killpg(pgid, SIGKILL) --> helpers (ssh, remote-https) die too
//! ```

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::Child;
use tracing::debug;

/// Kills every process in the child's group.
///
/// The child was spawned with `process_group(0)`, so its pid is the group id.
/// A group that is already gone is not an error.
pub(super) fn kill_process_group(child: &Child) {
    let Some(pgid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => debug!(pgid, error = %e, "killpg failed, killing child only"),
    }
}
