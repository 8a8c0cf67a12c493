// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Collection Store Implementations
//!
//! Infrastructure implementations of the `CollectionStore` contract defined
//! in the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve storage records, one collection per kind
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **PostgresCollectionStore** - one table per collection, constraints
//!   enforced by the database (see `cli/migrations`)
//! - **InMemoryCollectionStore** - lock-protected collections for tests and
//!   development; enforces the declared unique and foreign-key constraints
//!   itself and reports violations with the SQLSTATE codes PostgreSQL uses
//!
//! Both stores expand declared relations on read and clear referencing
//! columns when a referenced record is deleted.

pub mod postgres_collection;

pub use postgres_collection::PostgresCollectionStore;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::domain::record::StorageRecord;
use crate::domain::repository::{sqlstate, CollectionStore, RepositoryError};
use crate::domain::resource::{Kind, Ref};

type Collections = HashMap<Kind, Vec<StorageRecord>>;

#[derive(Clone, Default)]
pub struct InMemoryCollectionStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find<'a>(collections: &'a Collections, kind: Kind, reference: &Ref) -> Option<&'a StorageRecord> {
    collections
        .get(&kind)?
        .iter()
        .find(|r| r.reference.as_ref() == Some(reference))
}

fn not_found(kind: Kind, reference: &Ref) -> RepositoryError {
    RepositoryError::NotFound(format!("{}/{}", kind.collection(), reference))
}

/// Check the unique and foreign-key constraints `record` would be subject
/// to. `own` is the ref being replaced on update.
fn check_constraints(
    collections: &Collections,
    kind: Kind,
    record: &StorageRecord,
    own: Option<&Ref>,
) -> Result<(), RepositoryError> {
    let schema = kind.schema();
    let rows = collections.get(&kind).map(Vec::as_slice).unwrap_or_default();

    for column in schema.unique_columns() {
        let Some(value) = record.column(column.name) else {
            continue;
        };
        let taken = rows
            .iter()
            .filter(|row| own.is_none() || row.reference.as_ref() != own)
            .any(|row| row.column(column.name) == Some(value));
        if taken {
            return Err(RepositoryError::constraint(
                sqlstate::UNIQUE_VIOLATION,
                column.name,
                format!(
                    "duplicate key value violates unique constraint \"{}\"",
                    schema.unique_constraint(column.name)
                ),
            ));
        }
    }

    for (column, target) in schema.foreign_keys() {
        let Some(value) = record.column(column.name) else {
            continue;
        };
        let exists = match value {
            Value::String(target_ref) => find(collections, target, &Ref::from(target_ref.as_str())).is_some(),
            _ => false,
        };
        if !exists {
            return Err(RepositoryError::constraint(
                sqlstate::FOREIGN_KEY_VIOLATION,
                column.name,
                format!(
                    "insert or update on table \"{}\" violates foreign key constraint \"{}\"",
                    schema.table(),
                    schema.foreign_key_constraint(column.name)
                ),
            ));
        }
    }

    Ok(())
}

/// Copy of `record` with its declared relations joined in
fn expand(collections: &Collections, kind: Kind, record: &StorageRecord) -> StorageRecord {
    let mut expanded = record.clone();
    for column in kind.schema().columns {
        let (Some(relation), Some(target)) = (column.expand, column.references) else {
            continue;
        };
        let related = expanded
            .opt_ref(column.name)
            .ok()
            .flatten()
            .and_then(|target_ref| find(collections, target, &target_ref).cloned());
        expanded.relate(relation, related);
    }
    expanded
}

/// Strip what callers may not set: relations and timestamps
fn writable(mut record: StorageRecord) -> StorageRecord {
    record.relations.clear();
    record.created_at = None;
    record.updated_at = None;
    record
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn insert(&self, kind: Kind, record: StorageRecord) -> Result<Ref, RepositoryError> {
        let mut collections = self.collections.write();
        let mut record = writable(record);
        check_constraints(&collections, kind, &record, None)?;

        let reference = Ref::generate();
        let now = Utc::now();
        record.reference = Some(reference.clone());
        record.created_at = Some(now);
        record.updated_at = Some(now);

        collections.entry(kind).or_default().push(record);
        Ok(reference)
    }

    async fn update_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
        record: StorageRecord,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write();
        let created_at = find(&collections, kind, reference)
            .ok_or_else(|| not_found(kind, reference))?
            .created_at;

        let mut record = writable(record);
        check_constraints(&collections, kind, &record, Some(reference))?;

        record.reference = Some(reference.clone());
        record.created_at = created_at;
        record.updated_at = Some(Utc::now());

        let rows = collections.entry(kind).or_default();
        if let Some(slot) = rows.iter_mut().find(|r| r.reference.as_ref() == Some(reference)) {
            *slot = record;
        }
        Ok(())
    }

    async fn remove_by_ref(&self, kind: Kind, reference: &Ref) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write();
        let rows = collections.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|r| r.reference.as_ref() != Some(reference));
        if rows.len() == before {
            return Err(not_found(kind, reference));
        }

        // ON DELETE SET NULL
        for referencing in Kind::ALL {
            let columns: Vec<&str> = referencing
                .schema()
                .foreign_keys()
                .filter(|(_, target)| *target == kind)
                .map(|(column, _)| column.name)
                .collect();
            if columns.is_empty() {
                continue;
            }
            for row in collections.entry(referencing).or_default() {
                for column in &columns {
                    if row.column(column).and_then(Value::as_str) == Some(reference.as_str()) {
                        row.columns.remove(*column);
                    }
                }
            }
        }
        Ok(())
    }

    async fn find_all(&self, kind: Kind) -> Result<Vec<StorageRecord>, RepositoryError> {
        let collections = self.collections.read();
        Ok(collections
            .get(&kind)
            .map(|rows| rows.iter().map(|r| expand(&collections, kind, r)).collect())
            .unwrap_or_default())
    }

    async fn find_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
    ) -> Result<Option<StorageRecord>, RepositoryError> {
        let collections = self.collections.read();
        Ok(find(&collections, kind, reference).map(|r| expand(&collections, kind, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acl() -> StorageRecord {
        let mut record = StorageRecord::new("v2", "Local Network");
        record.put("allow", serde_json::json!(["10.0.0.0/8"]));
        record
    }

    fn domain(uri: &str, acl_ref: Option<&Ref>) -> StorageRecord {
        let mut record = StorageRecord::new("v2", "Local Domain");
        record.put("domainUri", uri);
        record.put_ref("accessControlListRef", acl_ref);
        record
    }

    fn code_and_field(err: RepositoryError) -> (Option<String>, Option<String>) {
        match err {
            RepositoryError::Database { code, field, .. } => (code, field),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ref_and_timestamps() {
        let store = InMemoryCollectionStore::new();
        let mut record = acl();
        record.reference = Some(Ref::from("caller-chosen"));

        let reference = store.insert(Kind::AccessControlList, record).await.unwrap();
        assert_ne!(reference.as_str(), "caller-chosen");

        let stored = store.find_by_ref(Kind::AccessControlList, &reference).await.unwrap().unwrap();
        assert_eq!(stored.reference, Some(reference));
        assert!(stored.created_at.is_some());
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_unique_violation() {
        let store = InMemoryCollectionStore::new();
        store.insert(Kind::Domain, domain("sip.local", None)).await.unwrap();

        let err = store.insert(Kind::Domain, domain("sip.local", None)).await.unwrap_err();
        assert_eq!(
            code_and_field(err),
            (Some("23505".to_string()), Some("domainUri".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_may_keep_its_own_unique_value() {
        let store = InMemoryCollectionStore::new();
        let reference = store.insert(Kind::Domain, domain("sip.local", None)).await.unwrap();
        let created = store.find_by_ref(Kind::Domain, &reference).await.unwrap().unwrap();

        store
            .update_by_ref(Kind::Domain, &reference, domain("sip.local", None))
            .await
            .unwrap();

        let updated = store.find_by_ref(Kind::Domain, &reference).await.unwrap().unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_foreign_key_violation() {
        let store = InMemoryCollectionStore::new();
        let missing = Ref::from("acl-missing");
        let err = store.insert(Kind::Domain, domain("sip.local", Some(&missing))).await.unwrap_err();
        assert_eq!(
            code_and_field(err),
            (Some("23503".to_string()), Some("accessControlListRef".to_string()))
        );
    }

    #[tokio::test]
    async fn test_relations_are_expanded_and_cleared_on_delete() {
        let store = InMemoryCollectionStore::new();
        let acl_ref = store.insert(Kind::AccessControlList, acl()).await.unwrap();
        let domain_ref = store
            .insert(Kind::Domain, domain("sip.local", Some(&acl_ref)))
            .await
            .unwrap();

        let stored = store.find_by_ref(Kind::Domain, &domain_ref).await.unwrap().unwrap();
        let expanded = stored.relation("accessControlList").unwrap();
        assert_eq!(expanded.reference.as_ref(), Some(&acl_ref));

        store.remove_by_ref(Kind::AccessControlList, &acl_ref).await.unwrap();

        let stored = store.find_by_ref(Kind::Domain, &domain_ref).await.unwrap().unwrap();
        assert!(stored.column("accessControlListRef").is_none());
        assert!(stored.relations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_refs() {
        let store = InMemoryCollectionStore::new();
        let reference = Ref::from("nope");
        assert!(store.find_by_ref(Kind::Agent, &reference).await.unwrap().is_none());
        assert!(matches!(
            store.remove_by_ref(Kind::Agent, &reference).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.update_by_ref(Kind::Agent, &reference, StorageRecord::default()).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(store.find_all(Kind::Agent).await.unwrap().is_empty());
    }
}
