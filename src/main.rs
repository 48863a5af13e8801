// reposync: Repository State Synchronization
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Options | Inis | Targets | Log | Checkout | Fetch | Pull
//!   DefaultBranch | Action
//! ```

use std::process::ExitCode;

use reposync::api::ActionRequest;
use reposync::cli::global::GlobalOptions;
use reposync::cli::{self, Command};
use reposync::cmd::cancellation_token;
use reposync::cmd::info::{run_inis_command, run_options_command, run_version_command};
use reposync::cmd::repo::{
    RepoContext, run_action_command, run_default_branch_command, run_json_action_command,
    run_log_command, run_targets_command,
};
use reposync::config::Config;
use reposync::config::loader::ConfigLoader;
use reposync::logging::init_logging;
use reposync::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        run_version_command();
        return ExitCode::SUCCESS;
    }

    let loader = match build_config_loader(&cli.global) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let sources = loader.format_loaded_files();
    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&cli.global, &config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(cli.command.as_ref(), &config, &sources).await
}

fn build_log_config(global: &GlobalOptions, config: &Config) -> LogConfig {
    let console_level = config.global.log_level;

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

async fn dispatch_command(command: Option<&Command>, config: &Config, sources: &[String]) -> ExitCode {
    let result = match command {
        Some(Command::Version) => {
            run_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Inis) => {
            run_inis_command(sources);
            Ok(())
        }
        Some(command) => run_repo_command(command, config).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_repo_command(command: &Command, config: &Config) -> reposync::error::Result<()> {
    let ctx = RepoContext::from_config(config, cancellation_token(config.git_timeout()))?;

    match command {
        Command::Targets => run_targets_command(&ctx).await,
        Command::Log => run_log_command(&ctx).await,
        Command::Checkout { target } => {
            let request = ActionRequest::Checkout {
                target: target.clone(),
            };
            run_action_command(&ctx, &request).await
        }
        Command::Fetch => run_action_command(&ctx, &ActionRequest::Fetch).await,
        Command::Pull => run_action_command(&ctx, &ActionRequest::Pull).await,
        Command::DefaultBranch => run_default_branch_command(&ctx).await,
        Command::Action { request } => run_json_action_command(&ctx, request).await,
        Command::Version | Command::Options | Command::Inis => Ok(()),
    }
}

fn build_config_loader(global: &GlobalOptions) -> reposync::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional("reposync.toml");
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader = loader.with_env_prefix("REPOSYNC");
    for option in global.to_config_overrides() {
        loader = loader.set_option(&option)?;
    }
    Ok(loader)
}
