// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Connect Configuration Types
//
// Defines the configuration manifest consumed by the resource layer:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Data source selection (in-memory or PostgreSQL)
// - Connection parameters, with defaults when omitted
// - Logging settings for the CLI
//
// Loading (file discovery, schema validation) lives in
// crate::infrastructure::config_loader.

use serde::{Deserialize, Serialize};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const CONFIG_API_VERSION: &str = "switchboard.io/v1";
pub const CONFIG_KIND: &str = "ConnectConfig";

/// Environment variable holding a full PostgreSQL connection string
pub const ENV_DATABASE_URL: &str = "SWITCHBOARD_DATABASE_URL";
/// Environment variable selecting the data source provider
pub const ENV_DATA_SOURCE: &str = "SWITCHBOARD_DATA_SOURCE";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectConfigManifest {
    /// API version (must be "switchboard.io/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ConnectConfig")
    pub kind: String,

    pub metadata: ConfigMetadata,

    #[serde(default)]
    pub spec: ConnectConfigSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectConfigSpec {
    #[serde(default)]
    pub data_source: DataSourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceProvider {
    #[default]
    Memory,
    Postgres,
}

impl std::str::FromStr for DataSourceProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown data source provider: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    #[serde(default)]
    pub provider: DataSourceProvider,

    /// Connection parameters. Defaults apply when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ConnectionParameters>,

    /// Full connection string; takes precedence over `parameters`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "switchboard".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ConnectConfigManifest {
    fn default() -> Self {
        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ConfigMetadata {
                name: "switchboard".to_string(),
            },
            spec: ConnectConfigSpec::default(),
        }
    }
}

impl ConnectionParameters {
    pub fn connection_string(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, password, self.host, self.port, self.database
            ),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.username, self.host, self.port, self.database
            ),
        }
    }
}

impl DataSourceConfig {
    /// Parameters in effect: the configured ones, or the defaults
    pub fn effective_parameters(&self) -> ConnectionParameters {
        self.parameters.clone().unwrap_or_default()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        match self.provider {
            DataSourceProvider::Memory => StorageBackend::InMemory,
            DataSourceProvider::Postgres => {
                let parameters = self.effective_parameters();
                StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string: self
                        .url
                        .clone()
                        .unwrap_or_else(|| parameters.connection_string()),
                    max_connections: parameters.max_connections,
                })
            }
        }
    }
}

impl ConnectConfigManifest {
    /// Apply environment variable overrides to configuration.
    /// This allows container deployments to override config via env vars.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            tracing::info!("Environment override: {} is set", ENV_DATABASE_URL);
            self.spec.data_source.url = Some(url);
        }

        if let Some(val) = lookup(ENV_DATA_SOURCE) {
            match val.parse::<DataSourceProvider>() {
                Ok(provider) => {
                    tracing::info!("Environment override: {}={:?}", ENV_DATA_SOURCE, provider);
                    self.spec.data_source.provider = provider;
                }
                Err(e) => {
                    tracing::warn!("Invalid value for {}: {}. Ignoring.", ENV_DATA_SOURCE, e);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != CONFIG_API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                CONFIG_API_VERSION
            );
        }

        if self.kind != CONFIG_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, CONFIG_KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let data_source = &self.spec.data_source;
        if data_source.provider == DataSourceProvider::Postgres {
            if let Some(url) = &data_source.url {
                if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                    anyhow::bail!("dataSource.url must be a postgres:// connection string");
                }
            }

            let parameters = data_source.effective_parameters();
            if parameters.host.is_empty() {
                anyhow::bail!("dataSource.parameters.host cannot be empty");
            }
            if parameters.port == 0 {
                anyhow::bail!("dataSource.parameters.port must be between 1 and 65535");
            }
            if parameters.database.is_empty() {
                anyhow::bail!("dataSource.parameters.database cannot be empty");
            }
            if parameters.max_connections == 0 {
                anyhow::bail!("dataSource.parameters.maxConnections must be at least 1");
            }
        }

        Ok(())
    }
}
