// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use switchboard_core::domain::config::{DataSourceProvider, ENV_DATABASE_URL, ENV_DATA_SOURCE};
use switchboard_core::infrastructure::config_loader::{self, ENV_CONFIG_PATH};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const POSTGRES_TEMPLATE: &str = include_str!("../../templates/config-postgres.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./switchboard.yaml")]
        output: PathBuf,

        /// Generate a PostgreSQL-backed configuration
        #[arg(long)]
        postgres: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, postgres } => generate(output, postgres).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = config_loader::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            ENV_CONFIG_PATH,
            std::env::var(ENV_CONFIG_PATH)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./switchboard.yaml");
        println!("  4. ~/.switchboard/config.yaml");
        println!("  5. /etc/switchboard/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let data_source = &config.spec.data_source;
    println!("{}", "Data Source:".bold());
    match data_source.provider {
        DataSourceProvider::Memory => println!("  Provider: memory"),
        DataSourceProvider::Postgres => {
            println!("  Provider: postgres");
            if data_source.url.is_some() {
                println!("  URL: {}", "(set, hidden)".dimmed());
            } else {
                let parameters = data_source.effective_parameters();
                println!("  Host: {}:{}", parameters.host, parameters.port);
                println!("  Database: {}", parameters.database);
                println!("  Username: {}", parameters.username);
                println!("  Max connections: {}", parameters.max_connections);
            }
        }
    }
    for var in [ENV_DATA_SOURCE, ENV_DATABASE_URL] {
        if std::env::var(var).is_ok() {
            println!("  {} {}", "overridden by".yellow(), var);
        }
    }
    println!();

    println!("{}", "Logging:".bold());
    println!("  Level: {}", config.spec.logging.level);
    println!("  Format: {:?}", config.spec.logging.format);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    match config_path {
        Some(path) => {
            config_loader::load_config(&path)
                .with_context(|| format!("Configuration validation failed for {:?}", path))?;
        }
        None => {
            config_loader::load_or_default(None).context("Configuration validation failed")?;
        }
    }

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, postgres: bool) -> Result<()> {
    let sample = if postgres {
        POSTGRES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid_configurations() {
        let minimal = config_loader::parse_config(MINIMAL_TEMPLATE).unwrap();
        assert_eq!(minimal.spec.data_source.provider, DataSourceProvider::Memory);

        let postgres = config_loader::parse_config(POSTGRES_TEMPLATE).unwrap();
        assert_eq!(postgres.spec.data_source.provider, DataSourceProvider::Postgres);
    }

    #[tokio::test]
    async fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("switchboard.yaml");

        generate(output.clone(), true).await.unwrap();
        validate(Some(output)).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_reports_schema_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, MINIMAL_TEMPLATE.replace("provider: memory", "provider: redis"))
            .unwrap();

        assert!(validate(Some(path)).await.is_err());
    }
}
