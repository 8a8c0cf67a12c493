// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Collection Schemas
//!
//! Static description of the kind-specific columns of every collection:
//! their storage type, uniqueness, and foreign-key style references to other
//! collections. Both stores consume these declarations: the in-memory store
//! enforces the constraints itself, the PostgreSQL store builds its SQL from
//! them (the constraints live in the migrations).
//!
//! Constraint names follow the PostgreSQL defaults, `{table}_{column}_key`
//! for unique constraints and `{table}_{column}_fkey` for foreign keys, so a
//! violated constraint can be traced back to the offending field.

use crate::domain::resource::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Boolean,
    Integer,
    TextArray,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub unique: bool,
    /// Collection this column points into, by `ref`
    pub references: Option<Kind>,
    /// Relation name under which the referenced record is joined on read
    pub expand: Option<&'static str>,
}

const fn column(name: &'static str, column_type: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        unique: false,
        references: None,
        expand: None,
    }
}

impl ColumnDef {
    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn references(mut self, kind: Kind) -> Self {
        self.references = Some(kind);
        self
    }

    const fn expanded_as(mut self, relation: &'static str) -> Self {
        self.expand = Some(relation);
        self
    }
}

#[derive(Debug)]
pub struct CollectionSchema {
    pub kind: Kind,
    pub columns: &'static [ColumnDef],
}

impl CollectionSchema {
    pub fn table(&self) -> &'static str {
        self.kind.collection()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.unique)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnDef, Kind)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|target| (c, target)))
    }

    pub fn unique_constraint(&self, column: &str) -> String {
        format!("{}_{}_key", self.table(), column)
    }

    pub fn foreign_key_constraint(&self, column: &str) -> String {
        format!("{}_{}_fkey", self.table(), column)
    }
}

use ColumnType::*;

static ACCESS_CONTROL_LISTS: CollectionSchema = CollectionSchema {
    kind: Kind::AccessControlList,
    columns: &[column("allow", TextArray), column("deny", TextArray)],
};

static CREDENTIALS: CollectionSchema = CollectionSchema {
    kind: Kind::Credentials,
    columns: &[column("username", Text), column("password", Text)],
};

static DOMAINS: CollectionSchema = CollectionSchema {
    kind: Kind::Domain,
    columns: &[
        column("domainUri", Text).unique(),
        column("accessControlListRef", Text)
            .references(Kind::AccessControlList)
            .expanded_as("accessControlList"),
    ],
};

static AGENTS: CollectionSchema = CollectionSchema {
    kind: Kind::Agent,
    columns: &[
        column("username", Text).unique(),
        column("secret", Text),
        column("domainRef", Text)
            .references(Kind::Domain)
            .expanded_as("domain"),
        column("privacy", Text),
        column("enabled", Boolean),
        column("maxContacts", Integer),
        column("expires", Integer),
    ],
};

static GATEWAYS: CollectionSchema = CollectionSchema {
    kind: Kind::Gateway,
    columns: &[
        column("host", Text),
        column("port", Integer),
        column("transport", Text),
        column("credentialsRef", Text).references(Kind::Credentials),
        column("expires", Integer),
    ],
};

static PEERS: CollectionSchema = CollectionSchema {
    kind: Kind::Peer,
    columns: &[
        column("username", Text).unique(),
        column("aor", Text),
        column("contactAddr", Text),
        column("enabled", Boolean),
        column("credentialsRef", Text).references(Kind::Credentials),
        column("accessControlListRef", Text)
            .references(Kind::AccessControlList)
            .expanded_as("accessControlList"),
    ],
};

static NUMBERS: CollectionSchema = CollectionSchema {
    kind: Kind::Number,
    columns: &[
        column("telUrl", Text).unique(),
        column("aorLink", Text),
        column("gatewayRef", Text).references(Kind::Gateway),
        column("sessionAffinityHeader", Text),
        column("extraHeaders", Json),
        column("city", Text),
        column("country", Text),
        column("countryIsoCode", Text),
    ],
};

impl Kind {
    pub fn schema(&self) -> &'static CollectionSchema {
        match self {
            Kind::AccessControlList => &ACCESS_CONTROL_LISTS,
            Kind::Credentials => &CREDENTIALS,
            Kind::Domain => &DOMAINS,
            Kind::Agent => &AGENTS,
            Kind::Gateway => &GATEWAYS,
            Kind::Peer => &PEERS,
            Kind::Number => &NUMBERS,
        }
    }
}
