// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution and lifecycle management.
//!
//! ```text
//! run() / run_with_cancellation(token)
//!              |
//!              v
//!     build_command()
//!     args, cwd, env, stdio
//!              |
//!              v
//!          spawn() ---> ProcessError::SpawnFailed
//!              |
//!              v
//!    validate exit_code
//!    (skip if ALLOW_FAILURE or interrupted)
//!              |
//!              v
//!       ProcessOutput
//! ```

use crate::error::{ProcessError, Result};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::builder::{ProcessBuilder, ProcessFlags, ProcessOutput, StreamFlags};

impl ProcessBuilder {
    fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program().file_stem().map_or_else(
                    || "process".to_string(),
                    |s| s.to_string_lossy().into_owned(),
                )
            },
            String::from,
        )
    }

    /// Returns the full command line as a string (for logging).
    fn command_line(&self) -> String {
        use std::fmt::Write as _;

        let mut cmd = format!("{}", self.program().display());
        for arg in self.args_slice() {
            if arg.contains(' ') {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns and runs the process, waiting for completion.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Spawning the child process fails.
    /// - The process exits with a code outside the success set (and `ALLOW_FAILURE` is not set).
    pub async fn run(self) -> Result<ProcessOutput> {
        let name = self.display_name();
        let mut child = self.spawn(&name)?;
        let output = self.run_child(&name, &mut child).await?;
        self.check_exit(&name, &output)?;
        Ok(output)
    }

    /// Spawns and runs the process with cancellation support.
    ///
    /// When the token is cancelled the child is killed and the returned
    /// output has `is_interrupted() == true`. A token that is already
    /// cancelled prevents the spawn entirely.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessBuilder::run`]; exit codes of interrupted processes
    /// are not checked.
    pub async fn run_with_cancellation(self, token: CancellationToken) -> Result<ProcessOutput> {
        if token.is_cancelled() {
            return Ok(ProcessOutput::new(-1, String::new(), String::new(), true));
        }

        let name = self.display_name();
        let mut child = self.spawn(&name)?;
        let output = self
            .run_child_with_cancellation(&name, &mut child, token)
            .await?;

        if !output.is_interrupted() {
            self.check_exit(&name, &output)?;
        }

        trace!(
            process = %name,
            exit_code = output.exit_code(),
            interrupted = output.is_interrupted(),
            "completed"
        );
        Ok(output)
    }

    fn spawn(&self, name: &str) -> Result<Child> {
        let cmd_line = self.command_line();

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let child = self
            .build_command()
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                command: cmd_line,
                source,
            })?;

        trace!(process = %name, pid = ?child.id(), "spawned");
        Ok(child)
    }

    fn check_exit(&self, name: &str, output: &ProcessOutput) -> Result<()> {
        if self.process_flags().contains(ProcessFlags::ALLOW_FAILURE)
            || self.success_code_set().contains(&output.exit_code())
        {
            return Ok(());
        }
        if !output.stderr().is_empty() {
            error!(process = %name, stderr = %output.stderr(), "process error output");
        }
        Err(ProcessError::NonZeroExit {
            command: self.command_line(),
            code: output.exit_code(),
        }
        .into())
    }

    fn build_command(&self) -> Command {
        let mut command = Command::new(self.program());

        command.args(self.args_slice());

        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }

        command.envs(self.extra_env());

        command.stdin(Stdio::null());
        command.stdout(Self::stdio_from_flags(self.stdout_flags()));
        command.stderr(Self::stdio_from_flags(self.stderr_flags()));

        // A dropped future must not leave git running.
        command.kill_on_drop(true);

        // Own group, so cancellation reaches transport helpers as well.
        #[cfg(unix)]
        command.process_group(0);

        command
    }

    fn stdio_from_flags(flags: StreamFlags) -> Stdio {
        if flags.contains(StreamFlags::BIT_BUCKET) {
            Stdio::null()
        } else {
            Stdio::piped()
        }
    }
}
