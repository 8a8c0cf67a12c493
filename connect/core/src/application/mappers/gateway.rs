// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::rules::is_host;
use crate::application::mappers::{envelope_record, envelope_resource, require, ResourceMapper};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::GatewaySpec;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

const MAX_PORT: u32 = 65535;

pub struct GatewayMapper;

impl ResourceMapper for GatewayMapper {
    const KIND: Kind = Kind::Gateway;
    type Spec = GatewaySpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        let spec = &resource.spec;
        require(
            is_host(&spec.host),
            "host must be a valid hostname, fully qualified domain name or IP address",
        )?;
        if let Some(port) = spec.port {
            require((1..=MAX_PORT).contains(&port), "port must be between 1 and 65535")?;
        }
        Ok(())
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let spec = &resource.spec;
        let mut record = envelope_record(resource);
        record.put("host", spec.host.clone());
        record.put_opt("port", spec.port);
        record.put_serialized("transport", &spec.transport)?;
        record.put_ref("credentialsRef", spec.credentials_ref.as_ref());
        record.put_opt("expires", spec.expires);
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = GatewaySpec {
            host: record.str("host")?,
            port: record.opt_u32("port")?,
            transport: record.deserialized("transport")?,
            credentials_ref: record.opt_ref("credentialsRef")?,
            expires: record.opt_u32("expires")?,
        };
        Ok(envelope_resource(record, spec))
    }
}
