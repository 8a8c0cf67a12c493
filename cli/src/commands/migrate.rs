// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Migration Command
//!
//! `switchboard migrate` creates and updates the collection tables used by
//! the PostgreSQL data source.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! switchboard migrate
//!
//! # Preview migrations without applying
//! switchboard migrate --dry-run
//! ```
//!
//! The connection comes from the configured data source; set
//! `SWITCHBOARD_DATABASE_URL` to override it.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use switchboard_core::domain::config::ConnectConfigManifest;
use switchboard_core::domain::repository::{PostgresConfig, StorageBackend};
use switchboard_core::infrastructure::db::Database;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Args)]
pub struct MigrateCommand {
    /// Perform a dry run without applying changes
    #[arg(long)]
    dry_run: bool,
}

fn postgres_config(config: &ConnectConfigManifest) -> Result<PostgresConfig> {
    match config.spec.data_source.storage_backend() {
        StorageBackend::PostgreSQL(postgres) => Ok(postgres),
        StorageBackend::InMemory => bail!(
            "the configured data source is 'memory'; set provider 'postgres' or SWITCHBOARD_DATA_SOURCE=postgres"
        ),
    }
}

pub async fn execute(cmd: MigrateCommand, config: &ConnectConfigManifest) -> Result<()> {
    println!("{}", "Switchboard Migrate".bold().green());

    let postgres = postgres_config(config)?;

    println!("Connecting to database...");
    let database = Database::new(&PostgresConfig {
        max_connections: 1,
        ..postgres
    })
    .await
    .context("Failed to connect to database")?;
    let pool = database.get_pool();

    let applied_count = match sqlx::query("SELECT version FROM _sqlx_migrations")
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows.len(),
        Err(_) => 0,
    };

    let total_migrations = MIGRATOR.iter().count();

    println!(
        "Migration status: {} applied, {} total available.",
        applied_count, total_migrations
    );

    if applied_count >= total_migrations {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations found (Dry Run):");
        for migration in MIGRATOR.iter().skip(applied_count) {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying pending migrations...");
    MIGRATOR.run(pool).await.context("Failed to apply migrations")?;
    tracing::info!(applied = total_migrations - applied_count, "Migrations applied");
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::domain::config::DataSourceProvider;

    #[test]
    fn test_memory_data_source_cannot_be_migrated() {
        let config = ConnectConfigManifest::default();
        assert!(postgres_config(&config).is_err());
    }

    #[test]
    fn test_url_takes_precedence() {
        let mut config = ConnectConfigManifest::default();
        config.spec.data_source.provider = DataSourceProvider::Postgres;
        config.spec.data_source.url = Some("postgres://connect@db/connect".to_string());

        let postgres = postgres_config(&config).unwrap();
        assert_eq!(postgres.connection_string, "postgres://connect@db/connect");
    }

    #[test]
    fn test_embedded_migrations() {
        assert!(MIGRATOR.iter().count() >= 1);
    }
}
