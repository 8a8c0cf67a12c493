// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::rules::is_ip_or_cidr;
use crate::application::mappers::{envelope_record, envelope_resource, ResourceMapper};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::{AccessControl, AccessControlListSpec};
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

pub struct AccessControlListMapper;

impl ResourceMapper for AccessControlListMapper {
    const KIND: Kind = Kind::AccessControlList;
    type Spec = AccessControlListSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        let rules = &resource.spec.access_control;
        for (list, entries) in [("allow", &rules.allow), ("deny", &rules.deny)] {
            if let Some(entry) = entries.iter().find(|e| !is_ip_or_cidr(e)) {
                return Err(ResourceError::validation(format!(
                    "{} entry '{}' must be an IP address or CIDR block",
                    list, entry
                )));
            }
        }
        Ok(())
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let mut record = envelope_record(resource);
        record.put_serialized("allow", &resource.spec.access_control.allow)?;
        record.put_serialized("deny", &resource.spec.access_control.deny)?;
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = AccessControlListSpec {
            access_control: AccessControl {
                allow: record.list("allow")?,
                deny: record.list("deny")?,
            },
        };
        Ok(envelope_resource(record, spec))
    }
}
