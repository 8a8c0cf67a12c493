// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Envelope
//!
//! Every resource in the Connect directory shares the same Kubernetes-style
//! envelope: `apiVersion`, `kind`, `ref`, `metadata`, a kind-specific `spec`,
//! an opaque `extended` document and store-managed timestamps.
//!
//! | Type | Description |
//! |------|-------------|
//! | `Ref` | Store-assigned identifier, unique within a collection |
//! | `Kind` | Closed set of resource kinds, one collection each |
//! | `Resource<S>` | Envelope around a kind-specific spec `S` |
//! | `Extended` | Caller-defined document, passed through untouched |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque caller-defined metadata. Never inspected, only preserved.
pub type Extended = serde_json::Map<String, serde_json::Value>;

/// Unique, immutable identifier of a resource within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(pub String);

impl Ref {
    /// Generate a fresh reference. Only stores call this.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ref {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Ref {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Resource kinds managed by the directory. Each kind owns one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    AccessControlList,
    Credentials,
    Domain,
    Agent,
    Gateway,
    Peer,
    Number,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::AccessControlList,
        Kind::Credentials,
        Kind::Domain,
        Kind::Agent,
        Kind::Gateway,
        Kind::Peer,
        Kind::Number,
    ];

    /// Kind name as it appears in the `kind` field of a document
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::AccessControlList => "AccessControlList",
            Kind::Credentials => "Credentials",
            Kind::Domain => "Domain",
            Kind::Agent => "Agent",
            Kind::Gateway => "Gateway",
            Kind::Peer => "Peer",
            Kind::Number => "Number",
        }
    }

    /// Name of the collection holding resources of this kind
    pub fn collection(&self) -> &'static str {
        match self {
            Kind::AccessControlList => "acls",
            Kind::Credentials => "credentials",
            Kind::Domain => "domains",
            Kind::Agent => "agents",
            Kind::Gateway => "gateways",
            Kind::Peer => "peers",
            Kind::Number => "numbers",
        }
    }

    /// Resolve a collection name. `dids` is accepted as the legacy name of
    /// the numbers collection.
    pub fn from_collection(name: &str) -> Option<Kind> {
        match name {
            "dids" => Some(Kind::Number),
            other => Kind::ALL.into_iter().find(|k| k.collection() == other),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts a kind name (`Agent`) or a collection name (`agents`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .or_else(|| Kind::from_collection(s))
            .ok_or_else(|| format!("unknown resource kind or collection: '{}'", s))
    }
}

/// Geographic information attached to numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    pub city: String,
    pub country: String,
    pub country_iso_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Human-friendly label (3 to 64 characters)
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_info: Option<GeoInfo>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geo_info: None,
        }
    }
}

/// Typed, versioned resource document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource<S> {
    pub api_version: String,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Ref>,

    #[serde(default)]
    pub metadata: Metadata,

    pub spec: S,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<Extended>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_API_VERSION: &str = "v2";

impl<S> Resource<S> {
    /// New, not yet persisted resource
    pub fn new(name: impl Into<String>, spec: S) -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            reference: None,
            metadata: Metadata::named(name),
            spec,
            extended: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_ref(mut self, reference: impl Into<Ref>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_extended(mut self, extended: Extended) -> Self {
        self.extended = Some(extended);
        self
    }
}
