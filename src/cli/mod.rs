// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for reposync using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! reposync [global options] <command>
//! version | options | inis
//! targets                 branches, tags, current
//! log                     history + incoming
//! checkout <target>
//! fetch | pull
//! default-branch
//! action <json>           {"type":"checkout","target":"v1.0"}
//! ```

pub mod global;


use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Repository state synchronization for a managed git working copy.
#[derive(Debug, Parser)]
#[command(
    name = "reposync",
    author,
    version,
    about = "Repository State Synchronization",
    long_about = "reposync Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Inspects and updates one git working copy. Every command\n\
                  prints JSON on stdout. Mutations on the same working copy are\n\
                  serialized; Ctrl-C or git/timeout_secs kills a running git.",
    after_help = "CONFIGURATION:\n\n\
                  reposync reads `reposync.toml` from the current directory if it\n\
                  exists, then every --ini file in order, then REPOSYNC_* environment\n\
                  variables (REPOSYNC_REPOSITORY__PATH=/srv/data), then --set\n\
                  overrides, then --repo and --log-level."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files that were loaded.
    Inis,

    /// Lists branches, tags and the current checkout target.
    Targets,

    /// Shows the commit log and the commits waiting on the remote.
    Log,

    /// Checks out a branch, tag or commit.
    Checkout {
        /// Branch, tag or commit to check out.
        target: String,
    },

    /// Fetches the configured remote.
    Fetch,

    /// Pulls the current branch from its upstream.
    Pull,

    /// Shows the default branch advertised by the remote.
    #[command(name = "default-branch")]
    DefaultBranch,

    /// Runs an action given as a JSON request body.
    Action {
        /// e.g. '{"type":"checkout","target":"v1.0"}' or '{"type":"fetch"}'
        #[arg(value_name = "JSON")]
        request: String,
    },
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
