// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::rules::is_fqdn;
use crate::application::mappers::{
    envelope_record, envelope_resource, require, AccessControlListMapper, ResourceMapper,
};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::DomainSpec;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

const ACCESS_CONTROL_LIST: &str = "accessControlList";

pub struct DomainMapper;

impl ResourceMapper for DomainMapper {
    const KIND: Kind = Kind::Domain;
    type Spec = DomainSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        require(
            is_fqdn(&resource.spec.domain_uri),
            "domainUri must be a valid fully qualified domain name",
        )
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let spec = &resource.spec;
        let mut record = envelope_record(resource);
        record.put("domainUri", spec.domain_uri.clone());
        record.put_ref("accessControlListRef", spec.access_control_list_ref.as_ref());
        record.relate(
            ACCESS_CONTROL_LIST,
            spec.access_control_list
                .as_deref()
                .map(AccessControlListMapper::to_storage)
                .transpose()?,
        );
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = DomainSpec {
            domain_uri: record.str("domainUri")?,
            access_control_list_ref: record.opt_ref("accessControlListRef")?,
            access_control_list: record
                .relation(ACCESS_CONTROL_LIST)
                .map(AccessControlListMapper::from_storage)
                .transpose()?
                .map(Box::new),
        };
        Ok(envelope_resource(record, spec))
    }
}
