// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Store Error Translation
//!
//! Finite mapping from backend error codes (PostgreSQL SQLSTATE) to the
//! domain error taxonomy. Applied once, at the resource manager's store call
//! site.
//!
//! | Code | Meaning | Domain error |
//! |------|---------|--------------|
//! | `23505` | unique_violation | `Conflict { field }` |
//! | `23503` | foreign_key_violation | `Dependency { field }` |
//! | `23502` | not_null_violation | `Validation` |
//! | `23514` | check_violation | `Validation` |
//! | `P0002` | no_data_found | `NotFound` |
//! | anything else | | `Internal` (message kept, code dropped) |
//!
//! Validation messages are rebuilt from the offending field; backend
//! messages name relations and constraints and only survive as `Internal`.

use crate::domain::errors::ResourceError;
use crate::domain::repository::{sqlstate, RepositoryError};

/// Domain class of a backend error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Conflict,
    Dependency,
    Validation,
    NotFound,
    Internal,
}

pub const TRANSLATION_TABLE: &[(&str, ErrorClass)] = &[
    (sqlstate::UNIQUE_VIOLATION, ErrorClass::Conflict),
    (sqlstate::FOREIGN_KEY_VIOLATION, ErrorClass::Dependency),
    (sqlstate::NOT_NULL_VIOLATION, ErrorClass::Validation),
    (sqlstate::CHECK_VIOLATION, ErrorClass::Validation),
    (sqlstate::NO_DATA_FOUND, ErrorClass::NotFound),
];

pub fn classify(code: Option<&str>) -> ErrorClass {
    code.and_then(|code| {
        TRANSLATION_TABLE
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, class)| *class)
    })
    .unwrap_or(ErrorClass::Internal)
}

fn validation_message(code: Option<&str>, field: &str) -> String {
    match code {
        Some(sqlstate::NOT_NULL_VIOLATION) => format!("{} is required", field),
        _ => format!("invalid value for field: {}", field),
    }
}

pub fn translate(error: RepositoryError) -> ResourceError {
    match error {
        RepositoryError::Database {
            code,
            field,
            message,
        } => {
            let field = field.unwrap_or_else(|| "unknown".to_string());
            match classify(code.as_deref()) {
                ErrorClass::Conflict => ResourceError::Conflict { field },
                ErrorClass::Dependency => ResourceError::Dependency { field },
                ErrorClass::Validation => {
                    ResourceError::Validation(validation_message(code.as_deref(), &field))
                }
                ErrorClass::NotFound => ResourceError::NotFound(message),
                ErrorClass::Internal => ResourceError::Internal(message),
            }
        }
        RepositoryError::NotFound(message) => ResourceError::NotFound(message),
        RepositoryError::Serialization(message) | RepositoryError::Unknown(message) => {
            ResourceError::Internal(message)
        }
    }
}
