// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository state values.
//!
//! ```text
//! Branch { name, active, latestCommit { hash, summary } }
//! CheckoutTarget { name, kind: branch | tag }
//! Commit { hash, message, date, author { name, email } }
//! DivergenceReport { status: detached | tracking, incoming: [Commit] }
//! OperationResult { previousState, newState, success }
//! ```
//!
//! All values are derived fresh from the working copy on every call and
//! serialize in the camelCase shape the HTTP layer returns.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Tip commit of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub hash: String,
    pub summary: String,
}

/// A local branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    /// True for the checked-out branch; never true while detached.
    pub active: bool,
    pub latest_commit: CommitRef,
}

/// Kind of a [`CheckoutTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Branch,
    Tag,
}

/// A name a caller may check out.
///
/// A branch and a tag with the same name are two distinct targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutTarget {
    pub name: String,
    pub kind: TargetKind,
}

impl CheckoutTarget {
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::Branch,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::Tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// One log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    /// Subject line.
    pub message: String,
    /// Author date with the author's UTC offset.
    pub date: DateTime<FixedOffset>,
    pub author: Author,
}

/// Why a [`DivergenceReport`] holds what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DivergenceStatus {
    /// HEAD is detached; no tracking ref applies and nothing is reported.
    Detached,
    /// Compared against `upstream`, e.g. `origin/main`.
    Tracking { upstream: String },
}

/// Commits on the tracking ref that local HEAD does not contain, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub status: DivergenceStatus,
    pub incoming: Vec<Commit>,
}

impl DivergenceReport {
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            status: DivergenceStatus::Detached,
            incoming: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_detached(&self) -> bool {
        matches!(self.status, DivergenceStatus::Detached)
    }

    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.incoming.is_empty()
    }
}

/// Before/after snapshot of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub previous_state: String,
    pub new_state: String,
    pub success: bool,
}

impl OperationResult {
    pub(crate) const fn succeeded(previous_state: String, new_state: String) -> Self {
        Self {
            previous_state,
            new_state,
            success: true,
        }
    }

    /// Whether the checked-out target changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous_state != self.new_state
    }
}
