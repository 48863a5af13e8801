// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shell-based git backend using the git CLI.
//!
//! ```text
//! ShellBackend --> ProcessBuilder::run_with_cancellation --> git
//!   env: GIT_TERMINAL_PROMPT=0 GCM_INTERACTIVE=never LC_ALL=C
//!   exit != 0    --> SyncError::Engine { operation, stderr }
//!                    (is_repository: "not a git repository" --> Ok(false))
//!   interrupted  --> SyncError::Cancelled { operation }
//! ```

use futures_util::future::BoxFuture;
use tracing::debug;

use super::{BranchListing, GitBackend, GitContext};
use crate::core::process::builder::{ProcessBuilder, ProcessFlags, ProcessOutput};
use crate::error::{Operation, SyncError, SyncResult};
use crate::git::parse;
use crate::model::Commit;

const BRANCH_FORMAT: &str =
    "--format=%(HEAD)%00%(refname:short)%00%(objectname:short)%00%(contents:subject)";
const LOG_FORMAT: &str = "--format=%H%x1f%aI%x1f%an%x1f%ae%x1f%s";
/// Diagnostic git prints (under `LC_ALL=C`) when discovery finds no repository.
const NOT_A_REPOSITORY: &str = "not a git repository";

/// Git backend driving the `git` executable.
///
/// The executable is resolved through PATH on first use and the result is
/// cached for the life of the process. A missing binary surfaces as an
/// engine error from the operation that needed it.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    executable: String,
}

impl Default for ShellBackend {
    fn default() -> Self {
        Self::new("git")
    }
}

impl ShellBackend {
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Runs git and returns its output whatever the exit code.
    async fn run(
        &self,
        ctx: GitContext<'_>,
        operation: Operation,
        args: &[&str],
    ) -> SyncResult<ProcessOutput> {
        let builder = ProcessBuilder::which(&self.executable)
            .map_err(|e| SyncError::engine(operation, e.to_string()))?;

        let output = builder
            .args(args)
            .cwd(ctx.repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .env("LC_ALL", "C")
            .name(format!("git {}", operation))
            .flag(ProcessFlags::ALLOW_FAILURE)
            .capture_output()
            .run_with_cancellation(ctx.cancel.clone())
            .await
            .map_err(|e| SyncError::engine(operation, format!("{e:#}")))?;

        if output.is_interrupted() {
            return Err(SyncError::Cancelled { operation });
        }
        Ok(output)
    }

    /// Runs git and requires a zero exit code, returning stdout.
    async fn run_ok(
        &self,
        ctx: GitContext<'_>,
        operation: Operation,
        args: &[&str],
    ) -> SyncResult<String> {
        let output = self.run(ctx, operation, args).await?;
        if output.success() {
            return Ok(output.stdout().to_string());
        }
        Err(SyncError::engine(operation, failure_message(&output)))
    }
}

/// The engine's diagnostic: stderr, else stdout, else the exit code.
fn failure_message(output: &ProcessOutput) -> String {
    if !output.stderr().is_empty() {
        output.stderr().to_string()
    } else if !output.stdout().is_empty() {
        output.stdout().to_string()
    } else {
        format!("git exited with code {}", output.exit_code())
    }
}

impl GitBackend for ShellBackend {
    fn is_repository<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<bool>> {
        Box::pin(async move {
            let output = self
                .run(
                    ctx,
                    Operation::IsRepository,
                    &["rev-parse", "--is-inside-work-tree"],
                )
                .await?;
            if output.success() {
                return Ok(output.stdout().trim() == "true");
            }
            // Only git's own verdict means "no"; dubious ownership, a broken
            // config or a permission error mean the check could not run.
            if output.stderr().contains(NOT_A_REPOSITORY) {
                return Ok(false);
            }
            Err(SyncError::engine(
                Operation::IsRepository,
                failure_message(&output),
            ))
        })
    }

    fn list_local_branches<'a>(
        &'a self,
        ctx: GitContext<'a>,
    ) -> BoxFuture<'a, SyncResult<BranchListing>> {
        Box::pin(async move {
            let stdout = self
                .run_ok(
                    ctx,
                    Operation::ListBranches,
                    &["branch", "--list", "--no-color", BRANCH_FORMAT],
                )
                .await?;
            let mut listing = parse::parse_branch_listing(&stdout);

            // Unborn branch: nothing to list yet, HEAD still names a branch.
            if listing.branches.is_empty() {
                let output = self
                    .run(
                        ctx,
                        Operation::ListBranches,
                        &["symbolic-ref", "--quiet", "--short", "HEAD"],
                    )
                    .await?;
                if output.success() {
                    listing.current = output.stdout().trim().to_string();
                }
                debug!(current = %listing.current, "no local branches");
            }
            Ok(listing)
        })
    }

    fn list_tags<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>> {
        Box::pin(async move {
            let stdout = self
                .run_ok(ctx, Operation::ListTags, &["tag", "--list"])
                .await?;
            Ok(parse::parse_lines(&stdout))
        })
    }

    fn list_remotes<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<Vec<String>>> {
        Box::pin(async move {
            let stdout = self.run_ok(ctx, Operation::ListRemotes, &["remote"]).await?;
            Ok(parse::parse_lines(&stdout))
        })
    }

    fn resolve_ref<'a>(
        &'a self,
        ctx: GitContext<'a>,
        refname: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>> {
        Box::pin(async move {
            let revision = format!("{refname}^{{commit}}");
            let output = self
                .run(
                    ctx,
                    Operation::ResolveRef,
                    &["rev-parse", "--verify", "--quiet", &revision],
                )
                .await?;
            match output.exit_code() {
                0 => Ok(Some(output.stdout().trim().to_string())),
                // --quiet: a missing ref exits 1 without a diagnostic
                1 if output.stderr().is_empty() => Ok(None),
                _ => Err(SyncError::engine(
                    Operation::ResolveRef,
                    failure_message(&output),
                )),
            }
        })
    }

    fn log<'a>(
        &'a self,
        ctx: GitContext<'a>,
        range: Option<&'a str>,
    ) -> BoxFuture<'a, SyncResult<Vec<Commit>>> {
        Box::pin(async move {
            let mut args = vec!["log", "--no-color", LOG_FORMAT];
            args.extend(range);
            args.push("--");
            let stdout = self.run_ok(ctx, Operation::Log, &args).await?;
            parse::parse_log(&stdout).map_err(|message| SyncError::engine(Operation::Log, message))
        })
    }

    fn fetch<'a>(
        &'a self,
        ctx: GitContext<'a>,
        remote: &'a str,
        prune: bool,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            let mut args = vec!["fetch", "--quiet"];
            if prune {
                args.push("--prune");
            }
            args.push(remote);
            self.run_ok(ctx, Operation::Fetch, &args).await?;
            Ok(())
        })
    }

    fn pull<'a>(&'a self, ctx: GitContext<'a>) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.run_ok(ctx, Operation::Pull, &["pull", "--quiet"])
                .await?;
            Ok(())
        })
    }

    fn checkout<'a>(
        &'a self,
        ctx: GitContext<'a>,
        treeish: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.run_ok(
                ctx,
                Operation::Checkout,
                &[
                    "-c",
                    "advice.detachedHead=false",
                    "checkout",
                    "--quiet",
                    treeish,
                    "--",
                ],
            )
            .await?;
            Ok(())
        })
    }

    fn remote_head_symref<'a>(
        &'a self,
        ctx: GitContext<'a>,
        remote: &'a str,
    ) -> BoxFuture<'a, SyncResult<Option<String>>> {
        Box::pin(async move {
            let stdout = self
                .run_ok(
                    ctx,
                    Operation::RemoteHead,
                    &["ls-remote", "--symref", remote, "HEAD"],
                )
                .await?;
            Ok(parse::parse_head_symref(&stdout))
        })
    }
}
