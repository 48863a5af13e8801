// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request and response shapes for an HTTP layer.
//!
//! ```text
//! list targets  -> { branches, tags, current }
//! log           -> { log, incoming }
//! action        <- { type: checkout, target } | { type: fetch } | { type: pull }
//!               -> { success: true, previous?, new? }
//! failure       -> status from SyncError::http_status()
//!                  { success: false, error }
//! ```
//!
//! Permission checks belong to the caller; these handlers assume the
//! request is already authorized.


use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::coordinator::MutationCoordinator;
use crate::error::SyncError;
use crate::model::{Branch, Commit};
use crate::state::TargetSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsResponse {
    pub branches: Vec<Branch>,
    pub tags: Vec<String>,
    pub current: String,
}

impl From<TargetSnapshot> for TargetsResponse {
    fn from(snapshot: TargetSnapshot) -> Self {
        Self {
            branches: snapshot.branches,
            tags: snapshot.tags,
            current: snapshot.current,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {
    pub log: Vec<Commit>,
    pub incoming: Vec<Commit>,
}

/// Body of an action request, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionRequest {
    Checkout { target: String },
    Fetch,
    Pull,
}

impl ActionRequest {
    /// Parses a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] for malformed bodies or unknown types.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError {
            status: 400,
            message: format!("invalid action request: {e}"),
        })
    }

    /// The `type` discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Checkout { .. } => "checkout",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(rename = "new", default, skip_serializing_if = "Option::is_none")]
    pub new_target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// A failed request: status code plus the message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.message.clone(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self {
            status: err.http_status(),
            message: err.to_string(),
        }
    }
}

/// Branches, tags and the current checkout target.
///
/// # Errors
///
/// Any [`SyncError`] from reading the working copy.
pub async fn list_targets(
    coordinator: &MutationCoordinator,
    path: &Path,
    cancel: CancellationToken,
) -> Result<TargetsResponse, ApiError> {
    let resolver = coordinator.resolver(path, cancel)?;
    Ok(resolver.targets().await?.into())
}

/// HEAD history plus incoming commits from the tracking ref.
///
/// A detached HEAD yields an empty `incoming`; a branch without a tracking
/// ref fails with 409 instead.
///
/// # Errors
///
/// Any [`SyncError`] from the log or the divergence check.
pub async fn get_log(
    coordinator: &MutationCoordinator,
    path: &Path,
    cancel: CancellationToken,
) -> Result<LogResponse, ApiError> {
    let resolver = coordinator.resolver(path, cancel)?;
    let log = resolver.commit_log().await?;
    let incoming = resolver.incoming_commits().await?.incoming;
    Ok(LogResponse { log, incoming })
}

/// Runs one mutation.
///
/// # Errors
///
/// The failure message wraps the underlying error unmodified:
/// `Failed to run action '<type>' error message:\n<error>`.
pub async fn run_action(
    coordinator: &MutationCoordinator,
    path: &Path,
    request: &ActionRequest,
    cancel: CancellationToken,
) -> Result<ActionResponse, ApiError> {
    let result = match request {
        ActionRequest::Checkout { target } => coordinator
            .checkout(path, target, cancel)
            .await
            .map(|r| (Some(r.previous_state), Some(r.new_state))),
        ActionRequest::Fetch => coordinator
            .fetch_origin(path, cancel)
            .await
            .map(|_| (None, None)),
        ActionRequest::Pull => coordinator.pull(path, cancel).await.map(|_| (None, None)),
    };

    match result {
        Ok((previous, new_target)) => Ok(ActionResponse {
            success: true,
            previous,
            new_target,
        }),
        Err(err) => Err(ApiError {
            status: err.http_status(),
            message: format!(
                "Failed to run action '{}' error message:\n{err}",
                request.kind()
            ),
        }),
    }
}
