// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Errors
//!
//! Stable error taxonomy surfaced by the resource manager. Backend failures
//! are classified into one of these variants before they leave the manager;
//! backend error codes never appear in the messages.
//!
//! | Variant | Raised when | Status |
//! |---------|-------------|--------|
//! | `Validation` | schema or semantic rule violated | `BAD_REQUEST` |
//! | `NotFound` | `ref` absent, or a filter matched nothing | `NOT_FOUND` |
//! | `Conflict` | unique field already taken | `BAD_REQUEST` |
//! | `Dependency` | referenced resource missing | `BAD_REQUEST` |
//! | `Syntax` | malformed filter expression | `BAD_REQUEST` |
//! | `Internal` | anything else the backend reports | `INTERNAL` |

use thiserror::Error;

use crate::domain::filter::FilterSyntaxError;
use crate::domain::response::Status;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("entity already exists for field: {field}")]
    Conflict { field: String },

    #[error("dependent entity doesn't exist for: {field}")]
    Dependency { field: String },

    #[error(transparent)]
    Syntax(#[from] FilterSyntaxError),

    #[error("{0}")]
    Internal(String),
}

impl ResourceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            ResourceError::Validation(_)
            | ResourceError::Conflict { .. }
            | ResourceError::Dependency { .. }
            | ResourceError::Syntax(_) => Status::BadRequest,
            ResourceError::NotFound(_) => Status::NotFound,
            ResourceError::Internal(_) => Status::Internal,
        }
    }
}
