// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Collection Store
//!
//! `CollectionStore` backed by one PostgreSQL table per collection via
//! `sqlx`. Statements are built from the static `CollectionSchema` of each
//! kind; every table shares the envelope columns:
//!
//! | Column | Type |
//! |--------|------|
//! | `"ref"` | `TEXT PRIMARY KEY` |
//! | `"apiVersion"` | `TEXT` |
//! | `"name"` | `TEXT` |
//! | `"extended"` | `JSONB` |
//! | `"createdAt"` / `"updatedAt"` | `TIMESTAMPTZ` |
//!
//! Unique and foreign-key constraints live in the migrations under
//! `cli/migrations`; their violations come back as `RepositoryError::Database`
//! with the SQLSTATE code and the column recovered from the constraint name.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};

use crate::domain::collection::{ColumnDef, ColumnType};
use crate::domain::record::StorageRecord;
use crate::domain::repository::{CollectionStore, RepositoryError};
use crate::domain::resource::{Kind, Ref};

pub struct PostgresCollectionStore {
    pool: PgPool,
}

impl PostgresCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_by_ref(&self, kind: Kind, reference: &str) -> Result<Option<StorageRecord>, RepositoryError> {
        let row = build_select(kind, Some(reference))
            .build()
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_record(kind, &row)).transpose()
    }

    /// Join declared relations into `records`, one lookup per distinct ref
    async fn expand(&self, kind: Kind, records: &mut [StorageRecord]) -> Result<(), RepositoryError> {
        for column in kind.schema().columns {
            let (Some(relation), Some(target)) = (column.expand, column.references) else {
                continue;
            };

            let mut cache: HashMap<String, Option<StorageRecord>> = HashMap::new();
            for record in records.iter_mut() {
                let Some(target_ref) = record.column(column.name).and_then(Value::as_str) else {
                    continue;
                };
                let target_ref = target_ref.to_string();
                if !cache.contains_key(&target_ref) {
                    let related = self.select_by_ref(target, &target_ref).await?;
                    cache.insert(target_ref.clone(), related);
                }
                let related = cache.get(&target_ref).cloned().flatten();
                record.relate(relation, related);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Statement builders
// ============================================================================

fn quoted(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

/// Bind the typed value of `column`, NULL when the column is absent
fn push_column(
    query: &mut QueryBuilder<'static, Postgres>,
    column: &ColumnDef,
    record: &StorageRecord,
) -> Result<(), RepositoryError> {
    let value = record.column(column.name);
    let mismatch = || {
        RepositoryError::Serialization(format!(
            "column {} does not hold a {:?} value",
            column.name, column.column_type
        ))
    };

    match column.column_type {
        ColumnType::Text => {
            let text = match value {
                None => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => return Err(mismatch()),
            };
            query.push_bind(text);
        }
        ColumnType::Boolean => {
            let flag = match value {
                None => None,
                Some(Value::Bool(b)) => Some(*b),
                Some(_) => return Err(mismatch()),
            };
            query.push_bind(flag);
        }
        ColumnType::Integer => {
            let number = match value {
                None => None,
                Some(v) => Some(v.as_i64().ok_or_else(mismatch)?),
            };
            query.push_bind(number);
        }
        ColumnType::TextArray => {
            let items = match value {
                None => None,
                Some(v) => Some(
                    serde_json::from_value::<Vec<String>>(v.clone()).map_err(|_| mismatch())?,
                ),
            };
            query.push_bind(items);
        }
        ColumnType::Json => {
            query.push_bind(value.cloned());
        }
    }
    Ok(())
}

fn extended_value(record: &StorageRecord) -> Option<Value> {
    record.extended.clone().map(Value::Object)
}

pub(crate) fn build_insert(
    kind: Kind,
    reference: &Ref,
    record: &StorageRecord,
) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let schema = kind.schema();
    let mut query = QueryBuilder::new(format!(
        "INSERT INTO {} (\"ref\", \"apiVersion\", \"name\", \"extended\"",
        quoted(schema.table())
    ));
    for column in schema.columns {
        query.push(", ").push(quoted(column.name));
    }

    query.push(", \"createdAt\", \"updatedAt\") VALUES (");
    query
        .push_bind(reference.as_str().to_string())
        .push(", ")
        .push_bind(record.api_version.clone())
        .push(", ")
        .push_bind(record.name.clone())
        .push(", ")
        .push_bind(extended_value(record));
    for column in schema.columns {
        query.push(", ");
        push_column(&mut query, column, record)?;
    }
    query.push(", NOW(), NOW())");

    Ok(query)
}

pub(crate) fn build_update(
    kind: Kind,
    reference: &Ref,
    record: &StorageRecord,
) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let schema = kind.schema();
    let mut query = QueryBuilder::new(format!("UPDATE {} SET ", quoted(schema.table())));
    query
        .push("\"apiVersion\" = ")
        .push_bind(record.api_version.clone())
        .push(", \"name\" = ")
        .push_bind(record.name.clone())
        .push(", \"extended\" = ")
        .push_bind(extended_value(record));
    for column in schema.columns {
        query.push(", ").push(quoted(column.name)).push(" = ");
        push_column(&mut query, column, record)?;
    }

    query
        .push(", \"updatedAt\" = NOW() WHERE \"ref\" = ")
        .push_bind(reference.as_str().to_string());
    Ok(query)
}

pub(crate) fn build_delete(kind: Kind, reference: &Ref) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "DELETE FROM {} WHERE \"ref\" = ",
        quoted(kind.collection())
    ));
    query.push_bind(reference.as_str().to_string());
    query
}

pub(crate) fn build_select(kind: Kind, reference: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT * FROM {}", quoted(kind.collection())));
    match reference {
        Some(reference) => {
            query.push(" WHERE \"ref\" = ").push_bind(reference.to_string());
        }
        None => {
            query.push(" ORDER BY \"createdAt\", \"ref\"");
        }
    }
    query
}

fn row_to_record(kind: Kind, row: &PgRow) -> Result<StorageRecord, RepositoryError> {
    let mut record = StorageRecord::new(
        row.try_get::<String, _>("apiVersion")?,
        row.try_get::<String, _>("name")?,
    );
    record.reference = Some(Ref(row.try_get::<String, _>("ref")?));
    record.extended = match row.try_get::<Option<Value>, _>("extended")? {
        Some(Value::Object(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(RepositoryError::Serialization(format!(
                "extended must be an object, found {}",
                other
            )))
        }
    };
    record.created_at = row.try_get::<Option<DateTime<Utc>>, _>("createdAt")?;
    record.updated_at = row.try_get::<Option<DateTime<Utc>>, _>("updatedAt")?;

    for column in kind.schema().columns {
        let name = column.name;
        match column.column_type {
            ColumnType::Text => record.put_opt(name, row.try_get::<Option<String>, _>(name)?),
            ColumnType::Boolean => record.put_opt(name, row.try_get::<Option<bool>, _>(name)?),
            ColumnType::Integer => record.put_opt(name, row.try_get::<Option<i64>, _>(name)?),
            ColumnType::TextArray => {
                let items = row.try_get::<Option<Vec<String>>, _>(name)?.unwrap_or_default();
                record.put_serialized(name, &items)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
            }
            ColumnType::Json => match row.try_get::<Option<Value>, _>(name)? {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) if items.is_empty() => {}
                Some(value) => record.put(name, value),
            },
        }
    }

    Ok(record)
}

#[async_trait]
impl CollectionStore for PostgresCollectionStore {
    async fn insert(&self, kind: Kind, record: StorageRecord) -> Result<Ref, RepositoryError> {
        let reference = Ref::generate();
        build_insert(kind, &reference, &record)?
            .build()
            .execute(&self.pool)
            .await?;
        Ok(reference)
    }

    async fn update_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
        record: StorageRecord,
    ) -> Result<(), RepositoryError> {
        let result = build_update(kind, reference, &record)?
            .build()
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{}/{}", kind.collection(), reference)));
        }
        Ok(())
    }

    async fn remove_by_ref(&self, kind: Kind, reference: &Ref) -> Result<(), RepositoryError> {
        let result = build_delete(kind, reference).build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{}/{}", kind.collection(), reference)));
        }
        Ok(())
    }

    async fn find_all(&self, kind: Kind) -> Result<Vec<StorageRecord>, RepositoryError> {
        let rows = build_select(kind, None).build().fetch_all(&self.pool).await?;
        let mut records = rows
            .iter()
            .map(|row| row_to_record(kind, row))
            .collect::<Result<Vec<_>, _>>()?;
        self.expand(kind, &mut records).await?;
        Ok(records)
    }

    async fn find_by_ref(
        &self,
        kind: Kind,
        reference: &Ref,
    ) -> Result<Option<StorageRecord>, RepositoryError> {
        let Some(record) = self.select_by_ref(kind, reference.as_str()).await? else {
            return Ok(None);
        };
        let mut records = [record];
        self.expand(kind, &mut records).await?;
        let [record] = records;
        Ok(Some(record))
    }
}
