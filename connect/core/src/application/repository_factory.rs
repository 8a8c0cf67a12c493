// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates the concrete collection store for the configured storage backend
//! and assembles the resource manager around it.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wire infrastructure implementations to domain interfaces

use std::sync::Arc;

use anyhow::Context;

use crate::application::resource_manager::ResourceManager;
use crate::domain::repository::{CollectionStore, StorageBackend};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::{InMemoryCollectionStore, PostgresCollectionStore};
use crate::infrastructure::schema_validator::JsonSchemaValidator;

/// Creates a CollectionStore implementation based on the configured backend
pub async fn create_collection_store(backend: &StorageBackend) -> anyhow::Result<Arc<dyn CollectionStore>> {
    match backend {
        StorageBackend::InMemory => {
            tracing::debug!("Using in-memory collection store");
            Ok(Arc::new(InMemoryCollectionStore::new()))
        }
        StorageBackend::PostgreSQL(config) => {
            let database = Database::new(config)
                .await
                .context("Failed to connect to PostgreSQL")?;
            tracing::debug!(
                "Using PostgreSQL collection store (max_connections: {})",
                config.max_connections
            );
            Ok(Arc::new(PostgresCollectionStore::new(database.get_pool().clone())))
        }
    }
}

/// Resource manager over the configured backend, validating with the
/// embedded JSON schemas
pub async fn create_resource_manager(backend: &StorageBackend) -> anyhow::Result<ResourceManager> {
    let store = create_collection_store(backend).await?;
    let validator = JsonSchemaValidator::new().context("Failed to compile resource schemas")?;
    Ok(ResourceManager::new(store, Arc::new(validator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::Kind;

    #[tokio::test]
    async fn test_in_memory_backend() {
        let manager = create_resource_manager(&StorageBackend::InMemory).await.unwrap();
        let response = manager.find(Kind::Agent, None).await;
        assert!(response.is_success());
        assert_eq!(response.result.map(|r| r.len()), Some(0));
    }
}
