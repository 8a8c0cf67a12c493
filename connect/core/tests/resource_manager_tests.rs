// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use switchboard_core::domain::kinds::{
    AccessControl, AccessControlListSpec, AgentCredentials, AgentSpec, DomainSpec, Privacy,
};
use switchboard_core::domain::record::StorageRecord;
use switchboard_core::domain::repository::{CollectionStore, RepositoryError};
use switchboard_core::domain::resource::Resource;
use switchboard_core::infrastructure::repositories::InMemoryCollectionStore;
use switchboard_core::infrastructure::schema_validator::JsonSchemaValidator;
use switchboard_core::{Kind, Ref, ResourceDto, ResourceManager, Status};

fn manager() -> ResourceManager {
    ResourceManager::new(
        Arc::new(InMemoryCollectionStore::new()),
        Arc::new(JsonSchemaValidator::new().expect("embedded schemas compile")),
    )
}

fn agent(name: &str, username: &str) -> ResourceDto {
    ResourceDto::Agent(Resource::new(
        name,
        AgentSpec {
            credentials: AgentCredentials {
                username: username.to_string(),
                secret: Some("changeit".to_string()),
            },
            domain_ref: None,
            domain: None,
            privacy: Privacy::None,
            enabled: true,
            max_contacts: None,
            expires: None,
        },
    ))
}

fn acl(name: &str) -> ResourceDto {
    ResourceDto::AccessControlList(Resource::new(
        name,
        AccessControlListSpec {
            access_control: AccessControl {
                allow: vec!["192.168.1.2/31".to_string()],
                deny: vec!["0.0.0.0/1".to_string()],
            },
        },
    ))
}

fn domain(domain_uri: &str, acl_ref: Option<Ref>) -> ResourceDto {
    ResourceDto::Domain(Resource::new(
        "Local Domain",
        DomainSpec {
            domain_uri: domain_uri.to_string(),
            access_control_list_ref: acl_ref,
            access_control_list: None,
        },
    ))
}

async fn count(manager: &ResourceManager, kind: Kind) -> usize {
    manager.find(kind, None).await.result.map(|r| r.len()).unwrap_or(0)
}

async fn insert_ok(manager: &ResourceManager, dto: ResourceDto) -> Ref {
    let response = manager.insert(dto).await;
    assert_eq!(response.status, Status::Created, "{:?}", response.error);
    response.result.expect("created resource has a ref")
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_insert_update_remove_lifecycle() {
    let manager = manager();
    let agents = manager.with_collection(Kind::Agent);
    let initial = count(&manager, Kind::Agent).await;

    let reference = insert_ok(&manager, agent("John Doe", "1001")).await;
    assert!(!reference.is_empty());
    assert_eq!(count(&manager, Kind::Agent).await, initial + 1);

    let mut renamed = agent("Jae Doe", "1001");
    renamed.set_reference(reference.clone());
    let response = manager.update(renamed).await;
    assert_eq!(response.status, Status::Ok);

    let fetched = agents.get(&reference).await.result.unwrap();
    assert_eq!(fetched.metadata().name, "Jae Doe");

    assert_eq!(agents.remove(&reference).await.status, Status::Ok);
    assert_eq!(count(&manager, Kind::Agent).await, initial);
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let manager = manager();
    let reference = insert_ok(&manager, agent("John Doe", "1001")).await;

    let mut dto = agent("John Doe", "1001");
    dto.set_reference(reference.clone());
    assert_eq!(manager.update(dto.clone()).await.status, Status::Ok);
    let first = manager.get(Kind::Agent, &reference).await.result.unwrap();
    assert_eq!(manager.update(dto).await.status, Status::Ok);
    let second = manager.get(Kind::Agent, &reference).await.result.unwrap();

    let strip = |dto: ResourceDto| {
        let mut document = dto.to_document().unwrap();
        document.as_object_mut().unwrap().remove("updatedAt");
        document
    };
    assert_eq!(strip(first), strip(second));
}

#[tokio::test]
async fn test_unknown_refs_are_not_found() {
    let manager = manager();
    let missing = Ref::from("does-not-exist");

    let mut dto = agent("John Doe", "1001");
    dto.set_reference(missing.clone());
    assert_eq!(manager.update(dto).await.status, Status::NotFound);
    assert_eq!(manager.remove(Kind::Agent, &missing).await.status, Status::NotFound);
    assert_eq!(manager.get(Kind::Agent, &missing).await.status, Status::NotFound);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_rejections() {
    let manager = manager();

    let response = manager.insert(agent("", "1001")).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(response.error.as_deref(), Some("name is required"));

    let response = manager.insert(agent("Jo", "1001")).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(
        response.error.as_deref(),
        Some("name must be between 3 and 64 characters")
    );

    let response = manager.update(agent("John Doe", "1001")).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(response.error.as_deref(), Some("reference is required for update"));

    let response = manager.insert(domain("sip-local", None)).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(
        response.error.as_deref(),
        Some("domainUri must be a valid fully qualified domain name")
    );

    assert_eq!(count(&manager, Kind::Agent).await, 0);
    assert_eq!(count(&manager, Kind::Domain).await, 0);
}

#[tokio::test]
async fn test_schema_errors_fail_before_the_store() {
    let manager = manager();
    let response = manager
        .insert_document(json!({
            "apiVersion": "v2",
            "kind": "Gateway",
            "metadata": { "name": "Provider Trunk" },
            "spec": { "host": "sip.provider.net", "transport": "carrier-pigeon" }
        }))
        .await;
    assert_eq!(response.status, Status::BadRequest);
    assert!(response.error.unwrap().starts_with("/spec/transport"));
    assert_eq!(count(&manager, Kind::Gateway).await, 0);

    let response = manager.insert_document(json!({ "apiVersion": "v2", "spec": {} })).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(response.error.as_deref(), Some("kind is required"));
}

#[tokio::test]
async fn test_insert_document() {
    let manager = manager();
    let document: serde_json::Value = serde_yaml::from_str(
        r#"
apiVersion: v2
kind: Number
metadata:
  name: "(785)317-8070"
  geoInfo:
    city: Topeka, KS
    country: USA
    countryIsoCode: US
spec:
  telUrl: tel:+17853178070
  aorLink: sip:1001@sip.local
extended:
  billing: monthly
"#,
    )
    .unwrap();

    let response = manager.insert_document(document).await;
    assert_eq!(response.status, Status::Created, "{:?}", response.error);

    let dids = Kind::from_collection("dids").unwrap();
    let found = manager.with_collection(dids).find(Some("*")).await.result.unwrap();
    assert_eq!(found.len(), 1);
    let document = found[0].to_document().unwrap();
    assert_eq!(document["metadata"]["geoInfo"]["countryIsoCode"], "US");
    assert_eq!(document["extended"]["billing"], "monthly");
}

// ============================================================================
// Filters
// ============================================================================

#[tokio::test]
async fn test_filters() {
    let manager = manager();
    insert_ok(&manager, agent("John Doe", "john")).await;
    insert_ok(&manager, agent("Janie Doe", "janie")).await;
    insert_ok(&manager, agent("Max Doe", "max")).await;
    let agents = manager.with_collection(Kind::Agent);

    let response = agents.find(Some("@.spec.credentials.username=='john'")).await;
    assert_eq!(response.status, Status::Ok);
    let result = response.result.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].metadata().name, "John Doe");

    let response = agents
        .find(Some("@.spec.credentials.username=='john'|| @.spec.credentials.username=='janie'"))
        .await;
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.result.unwrap().len(), 2);

    let response = agents.find(Some("@.spec.credentials.username=='jhon'")).await;
    assert_eq!(response.status, Status::NotFound);

    let response = agents.find(Some("@.spec.credentials.username==jhon'")).await;
    assert_eq!(response.status, Status::BadRequest);

    for everything in [None, Some("*"), Some("   ")] {
        let response = agents.find(everything).await;
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.result.unwrap().len(), 3);
    }
}

#[tokio::test]
async fn test_empty_collection_is_ok() {
    let manager = manager();
    let response = manager.find(Kind::Peer, Some("*")).await;
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.result, Some(Vec::new()));
}

// ============================================================================
// Constraints and relations
// ============================================================================

#[tokio::test]
async fn test_duplicate_username_is_a_conflict() {
    let manager = manager();
    insert_ok(&manager, agent("John Doe", "1001")).await;

    let response = manager.insert(agent("Johnny Doe", "1001")).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(
        response.error.as_deref(),
        Some("entity already exists for field: username")
    );
}

#[tokio::test]
async fn test_missing_reference_is_a_dependency_error() {
    let manager = manager();
    let response = manager.insert(domain("sip.local", Some(Ref::from("acl-missing")))).await;
    assert_eq!(response.status, Status::BadRequest);
    assert_eq!(
        response.error.as_deref(),
        Some("dependent entity doesn't exist for: accessControlListRef")
    );
}

#[tokio::test]
async fn test_acl_is_expanded_and_cleared_on_delete() {
    let manager = manager();
    let acl_ref = insert_ok(&manager, acl("Local Network")).await;
    let domain_ref = insert_ok(&manager, domain("sip.local", Some(acl_ref.clone()))).await;

    let ResourceDto::Domain(stored) = manager.get(Kind::Domain, &domain_ref).await.result.unwrap() else {
        panic!("expected a domain");
    };
    let expanded = stored.spec.access_control_list.clone().expect("ACL is expanded");
    assert_eq!(expanded.reference, Some(acl_ref.clone()));
    assert_eq!(expanded.spec.access_control.allow, vec!["192.168.1.2/31"]);

    // The expanded copy travels back on update without effect
    let response = manager.update(ResourceDto::Domain(Resource {
        spec: DomainSpec {
            access_control_list: Some(expanded),
            ..stored.spec.clone()
        },
        ..stored.clone()
    }))
    .await;
    assert_eq!(response.status, Status::Ok);

    assert_eq!(manager.remove(Kind::AccessControlList, &acl_ref).await.status, Status::Ok);

    let ResourceDto::Domain(stored) = manager.get(Kind::Domain, &domain_ref).await.result.unwrap() else {
        panic!("expected a domain");
    };
    assert!(stored.spec.access_control_list_ref.is_none());
    assert!(stored.spec.access_control_list.is_none());
}

// ============================================================================
// Backend failures
// ============================================================================

struct UnavailableStore;

#[async_trait]
impl CollectionStore for UnavailableStore {
    async fn insert(&self, _kind: Kind, _record: StorageRecord) -> Result<Ref, RepositoryError> {
        Err(RepositoryError::Database {
            code: Some("08006".to_string()),
            field: None,
            message: "connection to server was lost".to_string(),
        })
    }

    async fn update_by_ref(&self, _: Kind, _: &Ref, _: StorageRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unknown("unavailable".to_string()))
    }

    async fn remove_by_ref(&self, _: Kind, _: &Ref) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unknown("unavailable".to_string()))
    }

    async fn find_all(&self, _: Kind) -> Result<Vec<StorageRecord>, RepositoryError> {
        Err(RepositoryError::Unknown("unavailable".to_string()))
    }

    async fn find_by_ref(&self, _: Kind, _: &Ref) -> Result<Option<StorageRecord>, RepositoryError> {
        Err(RepositoryError::Unknown("unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_unclassified_backend_errors_are_internal() {
    let manager = ResourceManager::new(
        Arc::new(UnavailableStore),
        Arc::new(JsonSchemaValidator::new().unwrap()),
    );

    let response = manager.insert(agent("John Doe", "1001")).await;
    assert_eq!(response.status, Status::Internal);
    let error = response.error.unwrap();
    assert_eq!(error, "connection to server was lost");
    assert!(!error.contains("08006"));

    assert_eq!(manager.find(Kind::Agent, None).await.status, Status::Internal);
}
