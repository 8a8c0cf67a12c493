// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Configuration Loader
//!
//! Reads a `ConnectConfig` manifest from disk:
//!
//! 1. read the file (YAML; JSON is accepted as a YAML subset)
//! 2. validate the raw document against the embedded config schema
//! 3. decode into `ConnectConfigManifest`
//! 4. run semantic validation
//!
//! Discovery order when no path is given:
//! `SWITCHBOARD_CONFIG_PATH`, `./switchboard.yaml`,
//! `~/.switchboard/config.yaml`, `/etc/switchboard/config.yaml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use thiserror::Error;

use crate::domain::config::ConnectConfigManifest;
use crate::infrastructure::schema_validator::{compile, first_error, CONFIG_SCHEMA};

pub const ENV_CONFIG_PATH: &str = "SWITCHBOARD_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Schema(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load and fully validate the manifest at `path`
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectConfigManifest, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|e| match e {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse and validate a manifest held in memory
pub fn parse_config(content: &str) -> Result<ConnectConfigManifest, ConfigError> {
    let parse_error = |source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    };

    let document: Value = serde_yaml::from_str(content).map_err(parse_error)?;

    let validator = compile(CONFIG_SCHEMA).map_err(|e| ConfigError::Schema(e.to_string()))?;
    first_error(&validator, &document).map_err(ConfigError::Schema)?;

    let manifest: ConnectConfigManifest = serde_yaml::from_str(content).map_err(parse_error)?;
    manifest
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(manifest)
}

/// Discover configuration file using precedence order
pub fn discover_config() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Working directory
    let cwd = PathBuf::from("./switchboard.yaml");
    if cwd.exists() {
        return Some(cwd);
    }

    // 3. User home
    if let Some(home) = dirs::home_dir() {
        let user_config = home.join(".switchboard").join("config.yaml");
        if user_config.exists() {
            return Some(user_config);
        }
    }

    // 4. System config
    let system_config = PathBuf::from("/etc/switchboard/config.yaml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load configuration with discovery, fallback to default
pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<ConnectConfigManifest> {
    // Explicit CLI path fails if missing or invalid
    if let Some(path) = cli_path {
        tracing::info!("Loading configuration from explicit path: {:?}", path);
        let mut config = load_config(&path)
            .with_context(|| format!("Failed to load config at {:?}", path))?;
        config.apply_env_overrides();
        return Ok(config);
    }

    let mut config = match discover_config() {
        Some(path) => {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config at {:?}", path))?
        }
        None => {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            ConnectConfigManifest::default()
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{DataSourceProvider, LogFormat};
    use std::io::Write;

    const POSTGRES_CONFIG: &str = r#"
apiVersion: switchboard.io/v1
kind: ConnectConfig
metadata:
  name: local
spec:
  dataSource:
    provider: postgres
    parameters:
      host: db
      port: 5433
      database: connect
      username: connect
      password: connect
      maxConnections: 10
  logging:
    level: debug
    format: json
"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_temp(POSTGRES_CONFIG);
        let manifest = load_config(file.path()).unwrap();

        assert_eq!(manifest.metadata.name, "local");
        assert_eq!(manifest.spec.data_source.provider, DataSourceProvider::Postgres);
        let parameters = manifest.spec.data_source.effective_parameters();
        assert_eq!(parameters.port, 5433);
        assert_eq!(parameters.max_connections, 10);
        assert_eq!(manifest.spec.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_json_manifest_is_accepted() {
        let json = r#"{"apiVersion":"switchboard.io/v1","kind":"ConnectConfig","metadata":{"name":"ci"}}"#;
        let manifest = parse_config(json).unwrap();
        assert_eq!(manifest.spec.data_source.provider, DataSourceProvider::Memory);
    }

    #[test]
    fn test_schema_rejects_unknown_provider() {
        let yaml = POSTGRES_CONFIG.replace("provider: postgres", "provider: mongodb");
        let err = parse_config(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)), "{err}");
        assert!(err.to_string().contains("/spec/dataSource/provider"), "{err}");
    }

    #[test]
    fn test_schema_rejects_wrong_kind() {
        let yaml = POSTGRES_CONFIG.replace("kind: ConnectConfig", "kind: NodeConfig");
        assert!(matches!(parse_config(&yaml), Err(ConfigError::Schema(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/switchboard.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_yaml_names_the_file() {
        let file = write_temp("apiVersion: [unterminated");
        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_path_must_exist() {
        assert!(load_or_default(Some(PathBuf::from("/nonexistent/switchboard.yaml"))).is_err());
    }
}
