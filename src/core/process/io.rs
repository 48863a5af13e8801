// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Output capture for processes.
//!
//! ```text
//! run_child() / run_child_with_cancellation()
//!   stdout/stderr reader tasks (read to EOF, no backpressure on the child)
//!   wait (or cancel --> terminate_process: kill the whole group)
//!   join readers (bounded by READER_GRACE after a kill)
//!   --> ProcessOutput { stdout, stderr, exit_code, interrupted }
//! ```

use std::time::Duration;

use crate::error::Result;
use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags};

/// Spawns a task draining `stream` to EOF.
///
/// Returns `None` when the stream is neither logged nor kept.
fn spawn_reader<R>(
    stream: Option<R>,
    flags: StreamFlags,
    process_name: &str,
    stream_name: &'static str,
) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if !flags.intersects(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING) {
        return None;
    }
    let name = process_name.to_string();
    stream.map(|stream| tokio::spawn(read_stream(stream, flags, name, stream_name)))
}

async fn read_stream<R>(
    mut reader: R,
    flags: StreamFlags,
    process_name: String,
    stream_name: &'static str,
) -> String
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_to_end(&mut bytes).await {
        warn!(
            process = %process_name,
            stream = stream_name,
            error = %e,
            "error reading stream"
        );
    }
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if flags.contains(StreamFlags::FORWARD_TO_LOG) {
        for line in text.lines() {
            trace!(process = %process_name, stream = stream_name, line = %line, "output");
        }
    }

    if flags.contains(StreamFlags::KEEP_IN_STRING) {
        text.trim_end().to_string()
    } else {
        String::new()
    }
}

/// How long readers may keep draining after the child was killed.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Joins a reader task. With a `grace` bound, a reader still blocked when it
/// expires (a descendant outside the group holds the pipe) is aborted.
async fn join_reader(handle: Option<JoinHandle<String>>, grace: Option<Duration>) -> String {
    let Some(mut handle) = handle else {
        return String::new();
    };
    let Some(grace) = grace else {
        return handle.await.unwrap_or_default();
    };
    if let Ok(joined) = tokio::time::timeout(grace, &mut handle).await {
        joined.unwrap_or_default()
    } else {
        handle.abort();
        String::new()
    }
}

/// Terminates the child and everything it started.
async fn terminate_process(child: &mut Child) {
    #[cfg(unix)]
    super::unix::kill_process_group(child);
    child.kill().await.ok();
}

impl ProcessBuilder {
    /// Runs the child process to completion, collecting its output.
    pub(super) async fn run_child(&self, name: &str, child: &mut Child) -> Result<ProcessOutput> {
        self.run_child_with_cancellation(name, child, CancellationToken::new())
            .await
    }

    /// Runs the child process, killing it if `token` is cancelled first.
    pub(super) async fn run_child_with_cancellation(
        &self,
        name: &str,
        child: &mut Child,
        token: CancellationToken,
    ) -> Result<ProcessOutput> {
        let stdout_handle = spawn_reader(child.stdout.take(), self.stdout_flags(), name, "stdout");
        let stderr_handle = spawn_reader(child.stderr.take(), self.stderr_flags(), name, "stderr");

        let (exit_status, interrupted) = tokio::select! {
            status = child.wait() => (
                status.with_context(|| format!("failed waiting for process {name}"))?,
                false,
            ),
            () = token.cancelled() => {
                warn!(process = %name, "Cancellation requested, terminating process");
                terminate_process(child).await;
                let status = child.wait().await
                    .with_context(|| format!("failed waiting for process {name} to exit"))?;
                (status, true)
            }
        };

        let grace = interrupted.then_some(READER_GRACE);
        let stdout = join_reader(stdout_handle, grace).await;
        let stderr = join_reader(stderr_handle, grace).await;

        Ok(ProcessOutput::new(
            exit_status.code().unwrap_or(-1),
            stdout,
            stderr,
            interrupted,
        ))
    }
}
