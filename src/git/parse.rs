// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsers for git porcelain output.
//!
//! ```text
//! branch --format  "*\0main\0a1b2c3d\0subject"      -> RawBranch
//!                  "*\0(HEAD detached at v1)\0.."   -> detached, current = "v1"
//! log --format     "H\x1f aI\x1f an\x1f ae\x1f s"   -> Commit
//! ls-remote        "ref: refs/heads/main\tHEAD"     -> "main"
//! ```

use chrono::DateTime;
use regex::Regex;

use super::backend::{BranchListing, RawBranch};
use crate::model::{Author, Commit};

/// Parses `git branch --list --format=%(HEAD)%00%(refname:short)%00...`.
pub fn parse_branch_listing(stdout: &str) -> BranchListing {
    let mut listing = BranchListing::default();

    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let mut fields = line.splitn(4, '\0');
        let is_current = fields.next().is_some_and(|h| h.trim() == "*");
        let Some(name) = fields.next().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        let commit_hash = fields.next().unwrap_or_default().trim().to_string();
        let commit_label = fields.next().unwrap_or_default().trim().to_string();

        if is_current {
            if name.starts_with('(') {
                listing.detached = true;
                listing.current = detached_identifier(name);
            } else {
                listing.current = name.to_string();
            }
        }

        listing.branches.push(RawBranch {
            name: name.to_string(),
            is_current,
            commit_hash,
            commit_label,
        });
    }

    listing
}

/// Extracts the identifier from a detached HEAD description.
///
/// `(HEAD detached at v1.0)` gives `v1.0`; other parenthesized states such
/// as `(no branch, rebasing main)` give their inner text.
pub fn detached_identifier(label: &str) -> String {
    let inner = label
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(label);

    let Ok(re) = Regex::new(r"^(?:HEAD )?detached (?:at|from) (\S+)$") else {
        return inner.to_string();
    };
    re.captures(inner)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| inner.to_string(), |m| m.as_str().to_string())
}

/// Parses `git log --format=%H%x1f%aI%x1f%an%x1f%ae%x1f%s`.
///
/// # Errors
///
/// Returns a description of the first malformed line.
pub fn parse_log(stdout: &str) -> Result<Vec<Commit>, String> {
    stdout
        .lines()
        .filter(|l| !l.is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.splitn(5, '\x1f').collect();
            let [hash, date, name, email, subject] = fields[..] else {
                return Err(format!("unexpected log line: {line}"));
            };
            let date = DateTime::parse_from_rfc3339(date)
                .map_err(|e| format!("invalid commit date '{date}': {e}"))?;
            Ok(Commit {
                hash: hash.to_string(),
                message: subject.to_string(),
                date,
                author: Author {
                    name: name.to_string(),
                    email: email.to_string(),
                },
            })
        })
        .collect()
}

/// Default branch from `git ls-remote --symref <remote> HEAD`.
pub fn parse_head_symref(stdout: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^ref:\s*refs/heads/(\S+)\s+HEAD\s*$").ok()?;
    re.captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// One trimmed, non-empty entry per line.
pub fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
