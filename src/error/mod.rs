// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!   anyhow::Result  (cli, config, logging)
//!          ^
//!          |  context
//!   SyncError  (closed taxonomy, core API)
//!     NotFound        path missing / not a dir
//!     NotARepository  dir is not a work tree
//!     Engine          git failed, raw stderr
//!     NoTrackingRef   no <remote>/<branch>
//!     InvalidTarget   rejected before git
//!     Cancelled       caller cancelled
//!
//!   ConfigError   ProcessError  (ambient)
//! ```

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SyncError`].
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Engine operation names carried by [`SyncError::Engine`] and
/// [`SyncError::Cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IsRepository,
    ListBranches,
    ListTags,
    ListRemotes,
    ResolveRef,
    Log,
    Fetch,
    Pull,
    Checkout,
    RemoteHead,
}

impl Operation {
    /// Stable lower-case name used in messages and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsRepository => "isRepository",
            Self::ListBranches => "listBranches",
            Self::ListTags => "listTags",
            Self::ListRemotes => "listRemotes",
            Self::ResolveRef => "resolveRef",
            Self::Log => "log",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Checkout => "checkout",
            Self::RemoteHead => "remoteHead",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by the repository core.
///
/// Every engine failure is wrapped here with its diagnostic intact, so
/// callers can match exhaustively instead of inspecting message text.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Path does not exist or is not a directory.
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// Path exists but is not a git working copy.
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    /// The git invocation failed. `message` is the engine's own output.
    #[error("{operation} failed: {message}")]
    Engine {
        operation: Operation,
        message: String,
    },

    /// Divergence was requested but `<remote>/<branch>` does not exist.
    #[error("branch '{branch}' has no tracking ref on remote '{remote}'")]
    NoTrackingRef { branch: String, remote: String },

    /// Checkout target rejected before reaching the engine.
    #[error("invalid checkout target '{target}'")]
    InvalidTarget { target: String },

    /// The caller cancelled the operation while git was running.
    #[error("{operation} was cancelled")]
    Cancelled { operation: Operation },
}

impl SyncError {
    pub(crate) fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.display().to_string(),
        }
    }

    pub(crate) fn not_a_repository(path: &Path) -> Self {
        Self::NotARepository {
            path: path.display().to_string(),
        }
    }

    pub(crate) fn engine(operation: Operation, message: impl Into<String>) -> Self {
        Self::Engine {
            operation,
            message: message.into(),
        }
    }

    /// HTTP status a boundary layer should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::NotARepository { .. } | Self::NoTrackingRef { .. } => 409,
            Self::InvalidTarget { .. } => 400,
            Self::Engine { .. } => 500,
            Self::Cancelled { .. } => 499,
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },
}

#[cfg(test)]
mod tests;
