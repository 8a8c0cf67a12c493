// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Resource commands
//!
//! Commands: get, describe, create, update, delete
//!
//! Collections are named by their plural (`agents`, `numbers`, ...) or by
//! kind (`Agent`). Manifests are YAML or JSON. A response whose status is
//! not `OK`/`CREATED` is reported as an error, so the process exits non-zero.

use anyhow::{anyhow, Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use switchboard_core::application::repository_factory::create_resource_manager;
use switchboard_core::domain::config::ConnectConfigManifest;
use switchboard_core::{Kind, Ref, ResourceManager, Response};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum ResourceCommand {
    /// List the resources of a collection
    Get {
        /// Collection name, e.g. agents, peers, numbers
        collection: String,

        /// Filter expression, e.g. "@.spec.credentials.username=='1001'"
        #[arg(long)]
        filter: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Show one resource
    Describe {
        collection: String,

        #[arg(value_name = "REF")]
        reference: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Create a resource from a manifest
    Create {
        /// Manifest file (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Replace a resource from a manifest carrying its ref
    Update {
        /// Manifest file (YAML or JSON)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a resource
    Delete {
        collection: String,

        #[arg(value_name = "REF")]
        reference: String,
    },
}

pub async fn handle_command(command: ResourceCommand, config: &ConnectConfigManifest) -> Result<()> {
    let backend = config.spec.data_source.storage_backend();
    let manager = create_resource_manager(&backend)
        .await
        .context("Failed to initialize resource manager")?;
    run(command, &manager).await
}

async fn run(command: ResourceCommand, manager: &ResourceManager) -> Result<()> {
    match command {
        ResourceCommand::Get {
            collection,
            filter,
            output,
        } => {
            let kind = parse_collection(&collection)?;
            let resources = into_result(manager.find(kind, filter.as_deref()).await)?;
            print(&resources, output)
        }
        ResourceCommand::Describe {
            collection,
            reference,
            output,
        } => {
            let kind = parse_collection(&collection)?;
            let resource = into_result(manager.get(kind, &Ref::from(reference)).await)?;
            print(&resource, output)
        }
        ResourceCommand::Create { file } => {
            let document = read_manifest(&file)?;
            let reference = into_result(manager.insert_document(document).await)?;
            println!("{}", format!("✓ Created {}", reference).green());
            Ok(())
        }
        ResourceCommand::Update { file } => {
            let document = read_manifest(&file)?;
            let reference = into_result(manager.update_document(document).await)?;
            println!("{}", format!("✓ Updated {}", reference).green());
            Ok(())
        }
        ResourceCommand::Delete {
            collection,
            reference,
        } => {
            let kind = parse_collection(&collection)?;
            let reference = into_result(manager.remove(kind, &Ref::from(reference)).await)?;
            println!("{}", format!("✓ Deleted {}", reference).green());
            Ok(())
        }
    }
}

fn parse_collection(name: &str) -> Result<Kind> {
    name.parse::<Kind>().map_err(|e| anyhow!(e))
}

fn read_manifest(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse manifest {:?}", path))
}

fn into_result<T>(response: Response<T>) -> Result<T> {
    let status = response.status;
    match response.result {
        Some(result) if status.is_success() => Ok(result),
        _ => Err(anyhow!(
            "{}: {}",
            status,
            response.error.unwrap_or_else(|| "no result".to_string())
        )),
    }
}

fn print<T: Serialize>(value: &T, output: OutputFormat) -> Result<()> {
    let rendered = match output {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::domain::repository::StorageBackend;
    use switchboard_core::Status;

    const ACL: &str = r#"
apiVersion: v2
kind: AccessControlList
metadata:
  name: Local Network
spec:
  accessControl:
    allow:
      - 192.168.1.0/24
    deny:
      - 0.0.0.0/0
"#;

    async fn manager() -> ResourceManager {
        create_resource_manager(&StorageBackend::InMemory).await.unwrap()
    }

    fn manifest(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_create_from_yaml_manifest() {
        let manager = manager().await;
        let file = manifest(ACL);

        run(
            ResourceCommand::Create {
                file: file.path().to_path_buf(),
            },
            &manager,
        )
        .await
        .unwrap();

        let listed = manager.find(Kind::AccessControlList, None).await;
        assert_eq!(listed.status, Status::Ok);
        assert_eq!(listed.result.map(|r| r.len()), Some(1));
    }

    #[tokio::test]
    async fn test_failed_response_is_an_error() {
        let manager = manager().await;
        let err = run(
            ResourceCommand::Delete {
                collection: "agents".to_string(),
                reference: "ag-missing".to_string(),
            },
            &manager,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("NOT_FOUND: "), "{err}");
    }

    #[tokio::test]
    async fn test_invalid_manifest_is_a_bad_request() {
        let manager = manager().await;
        let file = manifest(&ACL.replace("Local Network", "LN"));

        let err = run(
            ResourceCommand::Create {
                file: file.path().to_path_buf(),
            },
            &manager,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("BAD_REQUEST: "), "{err}");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(parse_collection("numbers").unwrap(), Kind::Number);
        assert_eq!(parse_collection("dids").unwrap(), Kind::Number);
        assert_eq!(parse_collection("Peer").unwrap(), Kind::Peer);
        assert!(parse_collection("trunks").is_err());
    }
}
