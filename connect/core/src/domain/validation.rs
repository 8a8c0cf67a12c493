// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Document Validation
//!
//! Structural validation is delegated to a schema engine that the domain
//! treats as a black box: given a kind and a candidate document it answers
//! pass, or fail with the first error message. Semantic rules the schema
//! cannot express (name length, FQDN format, required-on-update `ref`) live in
//! the per-kind mappers.
//!
//! The JSON Schema implementation lives in
//! `crate::infrastructure::schema_validator`.

use serde_json::Value;

use crate::domain::resource::Kind;

pub trait DocumentValidator: Send + Sync {
    /// Validate `document` against the schema of `kind`, returning the first
    /// error message on failure.
    fn validate(&self, kind: Kind, document: &Value) -> Result<(), String>;
}
