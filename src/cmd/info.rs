// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commands that only report on reposync itself.

use crate::config::Config;

pub fn run_version_command() {
    println!("reposync {}", env!("CARGO_PKG_VERSION"));
}

/// Prints every option as `section/key = value`.
pub fn run_options_command(config: &Config) {
    config
        .format_options()
        .iter()
        .for_each(|line| println!("{line}"));
}

/// Prints the configuration sources in load order.
pub fn run_inis_command(sources: &[String]) {
    if sources.is_empty() {
        println!("no configuration files loaded, using defaults");
        return;
    }
    sources.iter().for_each(|line| println!("{line}"));
}
