// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for reposync.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. local reposync.toml (cwd, optional)
//! 3. --ini FILE (repeatable)
//! 4. REPOSYNC_* env vars
//! 5. --set section/key=value
//! 6. dedicated CLI flags (--repo, --log-level)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REPOSYNC_REPOSITORY__PATH=/srv/data  → repository.path
//! REPOSYNC_REPOSITORY__REMOTE=upstream → repository.remote
//! REPOSYNC_GIT__TIMEOUT_SECS=60        → git.timeout_secs
//! ```

pub mod loader;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::logging::LogLevel;

use loader::ConfigLoader;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub repository: RepositoryConfig,
    pub git: GitConfig,
}

/// `[global]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Console log level (0-6).
    pub log_level: LogLevel,
}

/// `[repository]` section: the managed working copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Working copy root.
    pub path: Option<PathBuf>,
    /// Remote used for fetch and divergence checks.
    pub remote: String,
    /// Prune deleted remote branches on fetch.
    pub prune: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            remote: "origin".to_string(),
            prune: true,
        }
    }
}

/// `[git]` section: the external engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Executable name or path, resolved through PATH.
    pub executable: String,
    /// Cancel engine calls after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reposync::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("reposync.toml")
    ///     .with_env_prefix("REPOSYNC")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate values that serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for an empty remote or executable,
    /// or a zero timeout.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.repository.remote.trim().is_empty() {
            return Err(invalid("repository", "remote", "must not be empty"));
        }
        if self.git.executable.trim().is_empty() {
            return Err(invalid("git", "executable", "must not be empty"));
        }
        if self.git.timeout_secs == Some(0) {
            return Err(invalid("git", "timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }

    /// The configured working copy path.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if `repository.path` is unset.
    pub fn repository_path(&self) -> std::result::Result<&Path, ConfigError> {
        self.repository
            .path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                section: "repository".to_string(),
                key: "path".to_string(),
            })
    }

    /// Engine call timeout, if configured.
    #[must_use]
    pub fn git_timeout(&self) -> Option<Duration> {
        self.git.timeout_secs.map(Duration::from_secs)
    }

    /// Format configuration options for display, sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        options.insert(
            "global/log_level",
            self.global.log_level.as_u8().to_string(),
        );
        options.insert(
            "repository/path",
            self.repository
                .path
                .as_ref()
                .map_or_else(|| "(unset)".to_string(), |p| p.display().to_string()),
        );
        options.insert("repository/remote", self.repository.remote.clone());
        options.insert("repository/prune", self.repository.prune.to_string());
        options.insert("git/executable", self.git.executable.clone());
        options.insert(
            "git/timeout_secs",
            self.git
                .timeout_secs
                .map_or_else(|| "(none)".to_string(), |t| t.to_string()),
        );

        options
            .into_iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect()
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
