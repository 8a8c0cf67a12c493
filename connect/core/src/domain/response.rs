// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Response envelope returned by every resource manager operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ResourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Created,
    NotFound,
    BadRequest,
    Internal,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "CREATED",
            Status::NotFound => "NOT_FOUND",
            Status::BadRequest => "BAD_REQUEST",
            Status::Internal => "INTERNAL",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Ok | Status::Created)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Response<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: Status::Ok,
            result: Some(result),
            error: None,
        }
    }

    pub fn created(result: T) -> Self {
        Self {
            status: Status::Created,
            result: Some(result),
            error: None,
        }
    }

    pub fn from_error(error: &ResourceError) -> Self {
        Self {
            status: error.status(),
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// Wrap an operation outcome, using `success` as the status on `Ok`.
    pub fn from_result(result: Result<T, ResourceError>, success: Status) -> Self {
        match result {
            Ok(value) => Self {
                status: success,
                result: Some(value),
                error: None,
            },
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
