// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Collection Store Interface
//!
//! Persistence contract the resource manager depends on. One trait covers
//! every collection; operations are scoped by `Kind`, which names exactly
//! one collection.
//!
//! | Operation | Contract |
//! |-----------|----------|
//! | `insert` | store assigns `ref`, `createdAt`, `updatedAt` and returns the `ref` |
//! | `update_by_ref` | whole-document replace; `createdAt` preserved |
//! | `remove_by_ref` | retires the `ref`; referencing columns are cleared |
//! | `find_all` | every record, declared relations expanded |
//! | `find_by_ref` | one record or `None` |
//!
//! ## Storage Backend Abstraction
//!
//! Concrete implementations are selected at startup from the data source
//! configuration (see `crate::domain::config`). The in-memory store is used
//! for development and testing, PostgreSQL for production.
//!
//! Every write is a single atomic write against one `ref`. Constraint
//! violations surface as `RepositoryError::Database` carrying the SQLSTATE
//! code and, when it can be determined, the offending field.

use async_trait::async_trait;

use crate::domain::record::StorageRecord;
use crate::domain::resource::{Kind, Ref};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Insert a new record, returning its store-assigned reference
    async fn insert(&self, kind: Kind, record: StorageRecord) -> Result<Ref, RepositoryError>;

    /// Replace the record stored under `reference`
    async fn update_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
        record: StorageRecord,
    ) -> Result<(), RepositoryError>;

    /// Delete the record stored under `reference`
    async fn remove_by_ref(&self, kind: Kind, reference: &Ref) -> Result<(), RepositoryError>;

    /// List every record of the collection
    async fn find_all(&self, kind: Kind) -> Result<Vec<StorageRecord>, RepositoryError>;

    /// Find one record by reference
    async fn find_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
    ) -> Result<Option<StorageRecord>, RepositoryError>;
}

/// SQLSTATE codes the stores emit for constraint violations
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const NO_DATA_FOUND: &str = "P0002";
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {message}")]
    Database {
        /// Backend error code (SQLSTATE)
        code: Option<String>,
        /// Column named by the violated constraint
        field: Option<String>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RepositoryError {
    pub fn constraint(code: &str, field: &str, message: impl Into<String>) -> Self {
        RepositoryError::Database {
            code: Some(code.to_string()),
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db) => {
                let field = db
                    .constraint()
                    .and_then(|constraint| field_from_constraint(db.table(), constraint));
                RepositoryError::Database {
                    code: db.code().map(|c| c.into_owned()),
                    field,
                    message: db.message().to_string(),
                }
            }
            _ => RepositoryError::Database {
                code: None,
                field: None,
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Recover the column from a PostgreSQL default constraint name such as
/// `agents_username_key` or `domains_accessControlListRef_fkey`.
pub fn field_from_constraint(table: Option<&str>, constraint: &str) -> Option<String> {
    let stem = ["_fkey", "_key", "_check"]
        .iter()
        .find_map(|suffix| constraint.strip_suffix(suffix))?;

    let column = match table {
        Some(table) => stem.strip_prefix(table)?.strip_prefix('_')?,
        None => {
            let known = Kind::ALL
                .iter()
                .find_map(|k| stem.strip_prefix(k.collection()).and_then(|s| s.strip_prefix('_')));
            known?
        }
    };

    (!column.is_empty()).then(|| column.to_string())
}
