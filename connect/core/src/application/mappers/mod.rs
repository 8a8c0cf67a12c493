// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Mappers
//!
//! One mapper per kind converts between the typed `Resource<S>` and the
//! flat `StorageRecord`, and owns the kind's business rules.
//!
//! | Capability | Behaviour |
//! |------------|-----------|
//! | `to_storage` | envelope + kind columns; expanded relations go to `relations` |
//! | `from_storage` | inverse; malformed records yield `MappingError` |
//! | `validate_spec` | kind-specific format rules |
//!
//! Envelope rules shared by every kind (name bounds, `geoInfo` only on
//! numbers, `ref` on update) are applied here before the kind rules run.

pub mod acl;
pub mod agent;
pub mod credentials;
pub mod domain;
pub mod gateway;
pub mod number;
pub mod peer;
pub mod rules;

use crate::domain::errors::ResourceError;
use crate::domain::kinds::ResourceDto;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Metadata, Resource};

pub use acl::AccessControlListMapper;
pub use agent::AgentMapper;
pub use credentials::CredentialsMapper;
pub use domain::DomainMapper;
pub use gateway::GatewayMapper;
pub use number::NumberMapper;
pub use peer::PeerMapper;

const NAME_MIN_LENGTH: usize = 3;
const NAME_MAX_LENGTH: usize = 64;

pub trait ResourceMapper {
    const KIND: Kind;
    type Spec;

    /// Kind-specific business rules
    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError>;

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError>;

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError>;

    fn validate_create(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        validate_metadata(Self::KIND, &resource.metadata)?;
        Self::validate_spec(resource)
    }

    fn validate_update(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        validate_metadata(Self::KIND, &resource.metadata)?;
        match &resource.reference {
            Some(reference) if !reference.is_empty() => {}
            _ => return Err(ResourceError::validation("reference is required for update")),
        }
        Self::validate_spec(resource)
    }
}

fn validate_metadata(kind: Kind, metadata: &Metadata) -> Result<(), ResourceError> {
    validate_name(metadata)?;
    // only the numbers collection has columns for it
    if kind != Kind::Number && metadata.geo_info.is_some() {
        return Err(ResourceError::validation(format!(
            "metadata.geoInfo is not supported on {}",
            kind
        )));
    }
    Ok(())
}

fn validate_name(metadata: &Metadata) -> Result<(), ResourceError> {
    if metadata.name.trim().is_empty() {
        return Err(ResourceError::validation("name is required"));
    }

    let length = metadata.name.chars().count();
    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&length) {
        return Err(ResourceError::validation(format!(
            "name must be between {} and {} characters",
            NAME_MIN_LENGTH, NAME_MAX_LENGTH
        )));
    }

    Ok(())
}

/// Record holding the envelope fields of `resource`, no columns yet
pub(crate) fn envelope_record<S>(resource: &Resource<S>) -> StorageRecord {
    StorageRecord {
        api_version: resource.api_version.clone(),
        reference: resource.reference.clone(),
        name: resource.metadata.name.clone(),
        extended: resource.extended.clone(),
        created_at: resource.created_at,
        updated_at: resource.updated_at,
        ..Default::default()
    }
}

/// Resource with the envelope fields of `record` around `spec`
pub(crate) fn envelope_resource<S>(record: &StorageRecord, spec: S) -> Resource<S> {
    Resource {
        api_version: record.api_version.clone(),
        reference: record.reference.clone(),
        metadata: Metadata::named(record.name.clone()),
        spec,
        extended: record.extended.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

pub(crate) fn require(condition: bool, message: &str) -> Result<(), ResourceError> {
    if condition {
        Ok(())
    } else {
        Err(ResourceError::validation(message))
    }
}

impl ResourceDto {
    pub fn validate_create(&self) -> Result<(), ResourceError> {
        match self {
            ResourceDto::AccessControlList(r) => AccessControlListMapper::validate_create(r),
            ResourceDto::Credentials(r) => CredentialsMapper::validate_create(r),
            ResourceDto::Domain(r) => DomainMapper::validate_create(r),
            ResourceDto::Agent(r) => AgentMapper::validate_create(r),
            ResourceDto::Gateway(r) => GatewayMapper::validate_create(r),
            ResourceDto::Peer(r) => PeerMapper::validate_create(r),
            ResourceDto::Number(r) => NumberMapper::validate_create(r),
        }
    }

    pub fn validate_update(&self) -> Result<(), ResourceError> {
        match self {
            ResourceDto::AccessControlList(r) => AccessControlListMapper::validate_update(r),
            ResourceDto::Credentials(r) => CredentialsMapper::validate_update(r),
            ResourceDto::Domain(r) => DomainMapper::validate_update(r),
            ResourceDto::Agent(r) => AgentMapper::validate_update(r),
            ResourceDto::Gateway(r) => GatewayMapper::validate_update(r),
            ResourceDto::Peer(r) => PeerMapper::validate_update(r),
            ResourceDto::Number(r) => NumberMapper::validate_update(r),
        }
    }

    pub fn to_storage(&self) -> Result<StorageRecord, MappingError> {
        match self {
            ResourceDto::AccessControlList(r) => AccessControlListMapper::to_storage(r),
            ResourceDto::Credentials(r) => CredentialsMapper::to_storage(r),
            ResourceDto::Domain(r) => DomainMapper::to_storage(r),
            ResourceDto::Agent(r) => AgentMapper::to_storage(r),
            ResourceDto::Gateway(r) => GatewayMapper::to_storage(r),
            ResourceDto::Peer(r) => PeerMapper::to_storage(r),
            ResourceDto::Number(r) => NumberMapper::to_storage(r),
        }
    }

    pub fn from_storage(kind: Kind, record: &StorageRecord) -> Result<Self, MappingError> {
        Ok(match kind {
            Kind::AccessControlList => {
                ResourceDto::AccessControlList(AccessControlListMapper::from_storage(record)?)
            }
            Kind::Credentials => ResourceDto::Credentials(CredentialsMapper::from_storage(record)?),
            Kind::Domain => ResourceDto::Domain(DomainMapper::from_storage(record)?),
            Kind::Agent => ResourceDto::Agent(AgentMapper::from_storage(record)?),
            Kind::Gateway => ResourceDto::Gateway(GatewayMapper::from_storage(record)?),
            Kind::Peer => ResourceDto::Peer(PeerMapper::from_storage(record)?),
            Kind::Number => ResourceDto::Number(NumberMapper::from_storage(record)?),
        })
    }
}
