// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # JSON Schema Validator
//!
//! `DocumentValidator` backed by the `jsonschema` crate. One schema per kind
//! is embedded at build time from `connect/core/schemas/` and compiled once
//! when the validator is constructed.
//!
//! Only the first error is reported, prefixed with the JSON pointer of the
//! offending value when there is one:
//!
//! ```text
//! /spec/transport: "carrier-pigeon" is not one of "udp", "tcp", ...
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::domain::resource::Kind;
use crate::domain::validation::DocumentValidator;

const ACCESS_CONTROL_LIST_SCHEMA: &str = include_str!("../../schemas/access_control_list.schema.json");
const CREDENTIALS_SCHEMA: &str = include_str!("../../schemas/credentials.schema.json");
const DOMAIN_SCHEMA: &str = include_str!("../../schemas/domain.schema.json");
const AGENT_SCHEMA: &str = include_str!("../../schemas/agent.schema.json");
const GATEWAY_SCHEMA: &str = include_str!("../../schemas/gateway.schema.json");
const PEER_SCHEMA: &str = include_str!("../../schemas/peer.schema.json");
const NUMBER_SCHEMA: &str = include_str!("../../schemas/number.schema.json");

/// Schema of the `ConnectConfig` manifest
pub const CONFIG_SCHEMA: &str = include_str!("../../schemas/config.schema.json");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid schema: {0}")]
    Invalid(String),
}

fn embedded_schema(kind: Kind) -> &'static str {
    match kind {
        Kind::AccessControlList => ACCESS_CONTROL_LIST_SCHEMA,
        Kind::Credentials => CREDENTIALS_SCHEMA,
        Kind::Domain => DOMAIN_SCHEMA,
        Kind::Agent => AGENT_SCHEMA,
        Kind::Gateway => GATEWAY_SCHEMA,
        Kind::Peer => PEER_SCHEMA,
        Kind::Number => NUMBER_SCHEMA,
    }
}

/// Compile a schema given as JSON text
pub fn compile(source: &str) -> Result<jsonschema::Validator, SchemaError> {
    let schema: Value = serde_json::from_str(source)?;
    jsonschema::options()
        .build(&schema)
        .map_err(|e| SchemaError::Invalid(e.to_string()))
}

/// Validate `instance`, returning the first error message
pub fn first_error(validator: &jsonschema::Validator, instance: &Value) -> Result<(), String> {
    validator.validate(instance).map_err(|error| {
        let path = error.instance_path().to_string();
        if path.is_empty() {
            error.to_string()
        } else {
            format!("{}: {}", path, error)
        }
    })
}

pub struct JsonSchemaValidator {
    validators: HashMap<Kind, jsonschema::Validator>,
}

impl JsonSchemaValidator {
    pub fn new() -> Result<Self, SchemaError> {
        let validators = Kind::ALL
            .into_iter()
            .map(|kind| compile(embedded_schema(kind)).map(|validator| (kind, validator)))
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { validators })
    }
}

impl DocumentValidator for JsonSchemaValidator {
    fn validate(&self, kind: Kind, document: &Value) -> Result<(), String> {
        match self.validators.get(&kind) {
            Some(validator) => first_error(validator, document),
            None => Err(format!("no schema registered for kind {}", kind)),
        }
    }
}
