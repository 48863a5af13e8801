// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |             info / repo
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |   config   |     api      |
//!              |  TOML, env | JSON shapes  |
//!              '------------+------+-------'
//!                                  |
//!                                  v
//!                         coordinator
//!                   per-path lock, before/after
//!                                  |
//!                                  v
//!                             state
//!                  targets, detached, incoming
//!                                  |
//!                                  v
//!                       git (RepositoryHandle)
//!                   GitBackend -> ShellBackend
//!
//!   +-----------------------------------------+
//!   |  core   process runner, cancellation    |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, model     |
//!   +-----------------------------------------+
//! ```

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod git;
pub mod logging;
pub mod model;
pub mod state;
