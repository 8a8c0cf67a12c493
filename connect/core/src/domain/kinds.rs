// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Kinds
//!
//! Kind-specific `spec` payloads and the `ResourceDto` tagged union that the
//! resource manager accepts and returns. Documents carry their kind in a
//! top-level `kind` field:
//!
//! ```yaml
//! apiVersion: v2
//! kind: Domain
//! metadata:
//!   name: Local Domain
//! spec:
//!   domainUri: sip.local
//!   accessControlListRef: acl-01
//! ```
//!
//! Fields such as `Domain.spec.accessControlList` hold the referenced
//! resource when the store expanded the relation on read. They are never
//! required on writes.

use serde::{Deserialize, Serialize};

use crate::domain::resource::{Kind, Metadata, Ref, Resource};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlListSpec {
    pub access_control: AccessControl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsSecret {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsSpec {
    pub credentials: CredentialsSecret,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    pub domain_uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list: Option<Box<Resource<AccessControlListSpec>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Privacy {
    #[default]
    None,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCredentials {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub credentials: AgentCredentials,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Box<Resource<DomainSpec>>>,

    #[serde(default)]
    pub privacy: Privacy,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_contacts: Option<u32>,

    /// Registration expiry in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Udp,
    Tcp,
    Tls,
    Ws,
    Wss,
    Sctp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,

    pub transport: Transport,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSpec {
    pub username: String,

    /// Address of record, `sip:` URI or `backend:` reference
    pub aor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_addr: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list: Option<Box<Resource<AccessControlListSpec>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberSpec {
    pub tel_url: String,

    pub aor_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_ref: Option<Ref>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_affinity_header: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_headers: Vec<ExtraHeader>,
}

fn default_true() -> bool {
    true
}

/// Any resource the directory manages, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ResourceDto {
    AccessControlList(Resource<AccessControlListSpec>),
    Credentials(Resource<CredentialsSpec>),
    Domain(Resource<DomainSpec>),
    Agent(Resource<AgentSpec>),
    Gateway(Resource<GatewaySpec>),
    Peer(Resource<PeerSpec>),
    Number(Resource<NumberSpec>),
}

macro_rules! envelope {
    ($dto:expr, $r:ident => $body:expr) => {
        match $dto {
            ResourceDto::AccessControlList($r) => $body,
            ResourceDto::Credentials($r) => $body,
            ResourceDto::Domain($r) => $body,
            ResourceDto::Agent($r) => $body,
            ResourceDto::Gateway($r) => $body,
            ResourceDto::Peer($r) => $body,
            ResourceDto::Number($r) => $body,
        }
    };
}

impl ResourceDto {
    pub fn kind(&self) -> Kind {
        match self {
            ResourceDto::AccessControlList(_) => Kind::AccessControlList,
            ResourceDto::Credentials(_) => Kind::Credentials,
            ResourceDto::Domain(_) => Kind::Domain,
            ResourceDto::Agent(_) => Kind::Agent,
            ResourceDto::Gateway(_) => Kind::Gateway,
            ResourceDto::Peer(_) => Kind::Peer,
            ResourceDto::Number(_) => Kind::Number,
        }
    }

    pub fn reference(&self) -> Option<&Ref> {
        envelope!(self, r => r.reference.as_ref())
    }

    pub fn set_reference(&mut self, reference: Ref) {
        envelope!(self, r => r.reference = Some(reference))
    }

    pub fn metadata(&self) -> &Metadata {
        envelope!(self, r => &r.metadata)
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        envelope!(self, r => &mut r.metadata)
    }

    /// JSON document form, including the `kind` tag
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_document(document: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dto_is_tagged_by_kind() {
        let dto = ResourceDto::Domain(Resource::new(
            "Local Domain",
            DomainSpec {
                domain_uri: "sip.local".to_string(),
                access_control_list_ref: Some(Ref::from("acl-01")),
                access_control_list: None,
            },
        ));

        let document = dto.to_document().unwrap();
        assert_eq!(document["kind"], "Domain");
        assert_eq!(document["spec"]["domainUri"], "sip.local");
        assert_eq!(document["spec"]["accessControlListRef"], "acl-01");
        assert!(document["spec"].get("accessControlList").is_none());

        let parsed = ResourceDto::from_document(document).unwrap();
        assert_eq!(parsed, dto);
    }

    #[test]
    fn test_agent_defaults() {
        let document = json!({
            "apiVersion": "v2",
            "kind": "Agent",
            "metadata": { "name": "John Doe" },
            "spec": { "credentials": { "username": "1001" } }
        });

        let dto = ResourceDto::from_document(document).unwrap();
        let ResourceDto::Agent(agent) = dto else {
            panic!("expected an agent");
        };
        assert!(agent.spec.enabled);
        assert_eq!(agent.spec.privacy, Privacy::None);
        assert_eq!(agent.spec.credentials.username, "1001");
        assert!(agent.reference.is_none());
    }

    #[test]
    fn test_set_reference() {
        let mut dto = ResourceDto::Credentials(Resource::new(
            "Trunk Credentials",
            CredentialsSpec {
                credentials: CredentialsSecret {
                    username: "trunk".to_string(),
                    password: "secret".to_string(),
                },
            },
        ));
        assert!(dto.reference().is_none());
        dto.set_reference(Ref::from("cred-01"));
        assert_eq!(dto.reference(), Some(&Ref::from("cred-01")));
        assert_eq!(dto.kind(), Kind::Credentials);
    }
}
