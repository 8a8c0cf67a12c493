// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::rules::{is_aor, is_host_port};
use crate::application::mappers::{
    envelope_record, envelope_resource, require, AccessControlListMapper, ResourceMapper,
};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::PeerSpec;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

const ACCESS_CONTROL_LIST: &str = "accessControlList";

pub struct PeerMapper;

impl ResourceMapper for PeerMapper {
    const KIND: Kind = Kind::Peer;
    type Spec = PeerSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        let spec = &resource.spec;
        require(!spec.username.trim().is_empty(), "username is required")?;
        require(is_aor(&spec.aor), "aor must be a sip: or backend: address")?;
        if let Some(contact_addr) = &spec.contact_addr {
            require(is_host_port(contact_addr), "contactAddr must be host or host:port")?;
        }
        Ok(())
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let spec = &resource.spec;
        let mut record = envelope_record(resource);
        record.put("username", spec.username.clone());
        record.put("aor", spec.aor.clone());
        record.put_opt("contactAddr", spec.contact_addr.clone());
        record.put("enabled", spec.enabled);
        record.put_ref("credentialsRef", spec.credentials_ref.as_ref());
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
        let spec = PeerSpec {
            username: record.str("username")?,
            aor: record.str("aor")?,
            contact_addr: record.opt_str("contactAddr")?,
            enabled: record.bool("enabled")?,
            credentials_ref: record.opt_ref("credentialsRef")?,
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
