// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git working copy access.
//!
//! ```text
//!      RepositoryHandle (handle.rs)
//!      path check, NotARepository
//!               |
//!               v
//!      ,------------------,
//!      | backend (trait)  |
//!      '--+----------+----'
//!         |          |
//!         v          v
//!   ShellBackend   scripted
//!   git CLI        (tests)
//!         |
//!         v
//!     parse.rs
//!   branch / log / ls-remote output
//! ```

pub mod backend;
pub mod handle;
pub mod parse;

pub use backend::{BranchListing, GitBackend, GitContext, RawBranch, ShellBackend};
pub use handle::RepositoryHandle;

#[cfg(test)]
mod tests;
