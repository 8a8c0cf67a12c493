// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::{envelope_record, envelope_resource, require, ResourceMapper};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::{CredentialsSecret, CredentialsSpec};
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

pub struct CredentialsMapper;

impl ResourceMapper for CredentialsMapper {
    const KIND: Kind = Kind::Credentials;
    type Spec = CredentialsSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        let credentials = &resource.spec.credentials;
        require(!credentials.username.is_empty(), "credentials.username is required")?;
        require(!credentials.password.is_empty(), "credentials.password is required")
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let mut record = envelope_record(resource);
        record.put("username", resource.spec.credentials.username.clone());
        record.put("password", resource.spec.credentials.password.clone());
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = CredentialsSpec {
            credentials: CredentialsSecret {
                username: record.str("username")?,
                password: record.str("password")?,
            },
        };
        Ok(envelope_resource(record, spec))
    }
}
