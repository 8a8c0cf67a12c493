// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Switchboard CLI
//!
//! The `switchboard` binary drives the Connect resource layer from the
//! command line.
//!
//! ## Commands
//!
//! - `switchboard get|describe|create|update|delete` - Resource operations
//! - `switchboard config show|validate|generate` - Configuration management
//! - `switchboard migrate` - Apply database migrations
//!
//! Resource commands build a `ResourceManager` over the data source named in
//! the configuration. With the `memory` provider every invocation starts
//! from an empty directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use switchboard_core::domain::config::LogFormat;
use switchboard_core::infrastructure::config_loader;

mod commands;

use commands::{ConfigCommand, MigrateCommand, ResourceCommand};

/// Switchboard - Manage the Connect resource directory
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SWITCHBOARD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true, env = "SWITCHBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Apply pending database migrations
    #[command(name = "migrate")]
    Migrate {
        #[command(flatten)]
        command: MigrateCommand,
    },

    #[command(flatten)]
    Resource(ResourceCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { command } => {
            // config commands load the manifest themselves
            init_logging(cli.log_level.as_deref().unwrap_or("info"), LogFormat::Text)?;
            commands::config::handle_command(command, cli.config).await
        }
        Commands::Migrate { command } => {
            let config = config_loader::load_or_default(cli.config)
                .context("Failed to load configuration")?;
            let logging = &config.spec.logging;
            init_logging(cli.log_level.as_deref().unwrap_or(&logging.level), logging.format)?;
            commands::migrate::execute(command, &config).await
        }
        Commands::Resource(command) => {
            let config = config_loader::load_or_default(cli.config)
                .context("Failed to load configuration")?;
            let logging = &config.spec.logging;
            init_logging(cli.log_level.as_deref().unwrap_or(&logging.level), logging.format)?;
            commands::resource::handle_command(command, &config).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
