// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::{
    envelope_record, envelope_resource, require, DomainMapper, ResourceMapper,
};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::{AgentCredentials, AgentSpec};
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{Kind, Resource};

const DOMAIN: &str = "domain";

pub struct AgentMapper;

impl ResourceMapper for AgentMapper {
    const KIND: Kind = Kind::Agent;
    type Spec = AgentSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        require(
            !resource.spec.credentials.username.trim().is_empty(),
            "credentials.username is required",
        )
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let spec = &resource.spec;
        let mut record = envelope_record(resource);
        record.put("username", spec.credentials.username.clone());
        record.put_opt("secret", spec.credentials.secret.clone());
        record.put_ref("domainRef", spec.domain_ref.as_ref());
        record.put_serialized("privacy", &spec.privacy)?;
        record.put("enabled", spec.enabled);
        record.put_opt("maxContacts", spec.max_contacts);
        record.put_opt("expires", spec.expires);
        record.relate(
            DOMAIN,
            spec.domain.as_deref().map(DomainMapper::to_storage).transpose()?,
        );
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = AgentSpec {
            credentials: AgentCredentials {
                username: record.str("username")?,
                secret: record.opt_str("secret")?,
            },
            domain_ref: record.opt_ref("domainRef")?,
            domain: record
                .relation(DOMAIN)
                .map(DomainMapper::from_storage)
                .transpose()?
                .map(Box::new),
            privacy: record.deserialized("privacy")?,
            enabled: record.bool("enabled")?,
            max_contacts: record.opt_u32("maxContacts")?,
            expires: record.opt_u32("expires")?,
        };
        Ok(envelope_resource(record, spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kinds::{AccessControl, AccessControlListSpec, DomainSpec, Privacy};
    use crate::domain::resource::Ref;

    fn john_doe() -> Resource<AgentSpec> {
        Resource::new(
            "John Doe",
            AgentSpec {
                credentials: AgentCredentials {
                    username: "1001".to_string(),
                    secret: Some("changeit".to_string()),
                },
                domain_ref: Some(Ref::from("domain-01")),
                domain: None,
                privacy: Privacy::Private,
                enabled: true,
                max_contacts: Some(3),
                expires: None,
            },
        )
        .with_ref("agent-01")
    }

    #[test]
    fn test_storage_columns() {
        let record = AgentMapper::to_storage(&john_doe()).unwrap();
        assert_eq!(record.str("username").unwrap(), "1001");
        assert_eq!(record.str("privacy").unwrap(), "PRIVATE");
        assert!(record.bool("enabled").unwrap());
        assert_eq!(record.opt_u32("maxContacts").unwrap(), Some(3));
        assert!(record.column("expires").is_none());
        assert_eq!(AgentMapper::from_storage(&record).unwrap(), john_doe());
    }

    #[test]
    fn test_unknown_privacy_is_a_mapping_error() {
        let mut record = AgentMapper::to_storage(&john_doe()).unwrap();
        record.put("privacy", "SECRET");
        assert!(matches!(
            AgentMapper::from_storage(&record),
            Err(MappingError::InvalidColumn { ref column, .. }) if column == "privacy"
        ));
    }

    #[test]
    fn test_round_trip_with_nested_relations() {
        let acl = Resource::new(
            "Local Network",
            AccessControlListSpec {
                access_control: AccessControl {
                    allow: vec!["192.168.1.0/24".to_string()],
                    deny: vec!["0.0.0.0/0".to_string()],
                },
            },
        )
        .with_ref("acl-01");
        let domain = Resource::new(
            "Local Domain",
            DomainSpec {
                domain_uri: "sip.local".to_string(),
                access_control_list_ref: Some(Ref::from("acl-01")),
                access_control_list: Some(Box::new(acl)),
            },
        )
        .with_ref("domain-01");

        let mut agent = john_doe();
        agent.spec.domain = Some(Box::new(domain));

        let record = AgentMapper::to_storage(&agent).unwrap();
        let domain_record = record.relation("domain").unwrap();
        assert_eq!(domain_record.str("domainUri").unwrap(), "sip.local");
        assert!(domain_record.relation("accessControlList").is_some());

        assert_eq!(AgentMapper::from_storage(&record).unwrap(), agent);
    }
}
