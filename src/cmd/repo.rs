// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Working copy commands.
//!
//! ```text
//! Config --> RepoContext { coordinator(ShellBackend), path, cancel }
//!   targets / log          api::list_targets / api::get_log
//!   checkout/fetch/pull    api::run_action
//!   action <json>          ActionRequest::from_json -> api::run_action
//!   default-branch         StateResolver::default_branch
//! stdout: response JSON, or { success: false, error } on failure
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::{self, ActionRequest, ApiError};
use crate::config::Config;
use crate::coordinator::MutationCoordinator;
use crate::error::Result;
use crate::git::ShellBackend;
use crate::state::SyncOptions;

/// Everything a working copy command needs.
#[derive(Debug, Clone)]
pub struct RepoContext {
    pub coordinator: MutationCoordinator,
    pub path: PathBuf,
    pub cancel: CancellationToken,
}

impl RepoContext {
    /// Builds the context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `repository.path` is not configured.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let path = config.repository_path()?.to_path_buf();
        let backend = Arc::new(ShellBackend::new(config.git.executable.clone()));
        Ok(Self {
            coordinator: MutationCoordinator::new(backend, SyncOptions::from(config)),
            path,
            cancel,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize response")?;
    println!("{json}");
    Ok(())
}

/// Prints `response`, or the error body and returns the error.
fn respond<T: Serialize>(response: std::result::Result<T, ApiError>) -> Result<()> {
    match response {
        Ok(body) => print_json(&body),
        Err(err) => {
            print_json(&err.body())?;
            Err(anyhow::Error::new(err))
        }
    }
}

/// Run the targets command.
///
/// # Errors
///
/// Returns an error if the working copy cannot be read.
pub async fn run_targets_command(ctx: &RepoContext) -> Result<()> {
    respond(api::list_targets(&ctx.coordinator, &ctx.path, ctx.cancel.clone()).await)
}

/// Run the log command.
///
/// # Errors
///
/// Returns an error if the log or the divergence check fails.
pub async fn run_log_command(ctx: &RepoContext) -> Result<()> {
    respond(api::get_log(&ctx.coordinator, &ctx.path, ctx.cancel.clone()).await)
}

/// Run an action (checkout, fetch or pull).
///
/// # Errors
///
/// Returns an error if the mutation fails.
pub async fn run_action_command(ctx: &RepoContext, request: &ActionRequest) -> Result<()> {
    respond(api::run_action(&ctx.coordinator, &ctx.path, request, ctx.cancel.clone()).await)
}

/// Run an action given as a JSON body.
///
/// # Errors
///
/// Returns an error if the body is malformed or the mutation fails.
pub async fn run_json_action_command(ctx: &RepoContext, body: &str) -> Result<()> {
    match ActionRequest::from_json(body) {
        Ok(request) => run_action_command(ctx, &request).await,
        Err(err) => respond::<()>(Err(err)),
    }
}

#[derive(Serialize)]
struct DefaultBranchResponse {
    remote: String,
    branch: Option<String>,
}

/// Run the default-branch command.
///
/// # Errors
///
/// Returns an error if the remote cannot be queried.
pub async fn run_default_branch_command(ctx: &RepoContext) -> Result<()> {
    let response = async {
        let resolver = ctx.coordinator.resolver(&ctx.path, ctx.cancel.clone())?;
        let branch = resolver.default_branch().await?;
        Ok::<_, ApiError>(DefaultBranchResponse {
            remote: resolver.options().remote.clone(),
            branch,
        })
    }
    .await;
    respond(response)
}
