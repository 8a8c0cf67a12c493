// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Storage Record
//!
//! Backend-facing shape of a resource. Kind-specific fields are flattened
//! into named columns (`domainUri`, `accessControlListRef`, ...), mirroring
//! the relational layout used by the PostgreSQL store. Relations expanded by
//! the store on read travel in `relations`, keyed by relation name.
//!
//! Absent optional values are absent columns. A column is never stored as
//! JSON `null`; this keeps the DTO ↔ record mapping a bijection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::resource::{Extended, Ref};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("column '{column}' has an unexpected type: {reason}")]
    InvalidColumn { column: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRecord {
    pub api_version: String,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Ref>,

    pub name: String,

    #[serde(default)]
    pub columns: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<Extended>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, StorageRecord>,
}

impl StorageRecord {
    pub fn new(api_version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    // ── writers ───────────────────────────────────────────────────────────────

    pub fn put(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.insert(column.to_string(), value.into());
    }

    pub fn put_opt(&mut self, column: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.put(column, value);
        }
    }

    pub fn put_ref(&mut self, column: &str, reference: Option<&Ref>) {
        self.put_opt(column, reference.map(|r| r.0.clone()));
    }

    /// Store a serializable value (enums, nested lists). Empty arrays are
    /// left out so that `Vec::new()` and an absent column mean the same.
    pub fn put_serialized<T: Serialize>(&mut self, column: &str, value: &T) -> Result<(), MappingError> {
        let value = serde_json::to_value(value).map_err(|e| MappingError::InvalidColumn {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
        match value {
            Value::Null => {}
            Value::Array(ref items) if items.is_empty() => {}
            other => self.put(column, other),
        }
        Ok(())
    }

    pub fn relate(&mut self, relation: &str, record: Option<StorageRecord>) {
        if let Some(record) = record {
            self.relations.insert(relation.to_string(), record);
        }
    }

    // ── readers ───────────────────────────────────────────────────────────────

    pub fn column(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn str(&self, column: &str) -> Result<String, MappingError> {
        self.opt_str(column)?
            .ok_or_else(|| MappingError::MissingColumn(column.to_string()))
    }

    pub fn opt_str(&self, column: &str) -> Result<Option<String>, MappingError> {
        match self.columns.get(column) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(invalid(column, "string", other)),
        }
    }

    pub fn opt_ref(&self, column: &str) -> Result<Option<Ref>, MappingError> {
        Ok(self.opt_str(column)?.map(Ref))
    }

    pub fn bool(&self, column: &str) -> Result<bool, MappingError> {
        match self.columns.get(column) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid(column, "boolean", other)),
            None => Err(MappingError::MissingColumn(column.to_string())),
        }
    }

    pub fn opt_u32(&self, column: &str) -> Result<Option<u32>, MappingError> {
        match self.columns.get(column) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| invalid(column, "unsigned 32-bit integer", &Value::Number(n.clone()))),
            Some(other) => Err(invalid(column, "integer", other)),
        }
    }

    /// Read a required column through serde, e.g. an enum.
    pub fn deserialized<T: DeserializeOwned>(&self, column: &str) -> Result<T, MappingError> {
        let value = self
            .columns
            .get(column)
            .cloned()
            .ok_or_else(|| MappingError::MissingColumn(column.to_string()))?;
        decode(column, value)
    }

    /// Read a list column. An absent column is an empty list.
    pub fn list<T: DeserializeOwned>(&self, column: &str) -> Result<Vec<T>, MappingError> {
        match self.columns.get(column) {
            None => Ok(Vec::new()),
            Some(value) => decode(column, value.clone()),
        }
    }

    pub fn relation(&self, relation: &str) -> Option<&StorageRecord> {
        self.relations.get(relation)
    }
}

fn decode<T: DeserializeOwned>(column: &str, value: Value) -> Result<T, MappingError> {
    serde_json::from_value(value).map_err(|e| MappingError::InvalidColumn {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(column: &str, expected: &str, found: &Value) -> MappingError {
    MappingError::InvalidColumn {
        column: column.to_string(),
        reason: format!("expected {}, found {}", expected, found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_columns_are_omitted() {
        let mut record = StorageRecord::new("v2", "Local Domain");
        record.put_opt("accessControlListRef", None::<String>);
        record.put_ref("gatewayRef", None);
        record.put_serialized("allow", &Vec::<String>::new()).unwrap();
        assert!(record.columns.is_empty());
    }

    #[test]
    fn test_typed_readers() {
        let mut record = StorageRecord::new("v2", "Agent");
        record.put("username", "1001");
        record.put("enabled", true);
        record.put("maxContacts", 3u32);
        record.put("allow", json!(["10.0.0.0/8"]));

        assert_eq!(record.str("username").unwrap(), "1001");
        assert!(record.bool("enabled").unwrap());
        assert_eq!(record.opt_u32("maxContacts").unwrap(), Some(3));
        assert_eq!(record.opt_u32("expires").unwrap(), None);
        assert_eq!(record.list::<String>("allow").unwrap(), vec!["10.0.0.0/8"]);
        assert!(record.list::<String>("deny").unwrap().is_empty());
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut record = StorageRecord::new("v2", "Agent");
        record.put("username", 42);
        assert!(matches!(
            record.str("username"),
            Err(MappingError::InvalidColumn { .. })
        ));
        assert_eq!(
            record.str("secret"),
            Err(MappingError::MissingColumn("secret".to_string()))
        );
    }
}
