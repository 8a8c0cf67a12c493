// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Resource Manager Application Service
//!
//! Runs every directory operation through the same pipeline:
//! - Schema validation (DocumentValidator)
//! - Business rules and storage mapping (per-kind mappers)
//! - One call into the CollectionStore
//! - Error translation into the domain taxonomy
//!
//! Every public operation returns a `Response`; nothing is thrown past this
//! boundary. The manager holds no state between calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::error_translation::translate;
use crate::domain::errors::ResourceError;
use crate::domain::filter::FilterExpression;
use crate::domain::kinds::ResourceDto;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::repository::CollectionStore;
use crate::domain::resource::{Kind, Ref};
use crate::domain::response::{Response, Status};
use crate::domain::validation::DocumentValidator;

const OPERATIONS_TOTAL: &str = "switchboard_resource_operations_total";
const UNKNOWN_KIND: &str = "unknown";

/// Filter value meaning "the whole collection"
pub const WILDCARD: &str = "*";

pub struct ResourceManager {
    store: Arc<dyn CollectionStore>,
    validator: Arc<dyn DocumentValidator>,
}

impl ResourceManager {
    pub fn new(store: Arc<dyn CollectionStore>, validator: Arc<dyn DocumentValidator>) -> Self {
        Self { store, validator }
    }

    /// Collection-scoped view of this manager
    pub fn with_collection(&self, kind: Kind) -> CollectionHandle<'_> {
        CollectionHandle { manager: self, kind }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn insert(&self, dto: ResourceDto) -> Response<Ref> {
        let kind = dto.kind();
        let result = match self.check_schema(&dto) {
            Ok(()) => self.create(dto).await,
            Err(e) => Err(e),
        };
        finish(Some(kind), "insert", result, Status::Created)
    }

    /// Insert an untyped document, e.g. a manifest read from disk
    pub async fn insert_document(&self, document: Value) -> Response<Ref> {
        let kind = document_kind(&document);
        let result = match self.admit_document(document) {
            Ok(dto) => self.create(dto).await,
            Err(e) => Err(e),
        };
        finish(kind, "insert", result, Status::Created)
    }

    pub async fn update(&self, dto: ResourceDto) -> Response<Ref> {
        let kind = dto.kind();
        let result = match self.check_schema(&dto) {
            Ok(()) => self.replace(dto).await,
            Err(e) => Err(e),
        };
        finish(Some(kind), "update", result, Status::Ok)
    }

    pub async fn update_document(&self, document: Value) -> Response<Ref> {
        let kind = document_kind(&document);
        let result = match self.admit_document(document) {
            Ok(dto) => self.replace(dto).await,
            Err(e) => Err(e),
        };
        finish(kind, "update", result, Status::Ok)
    }

    pub async fn remove(&self, kind: Kind, reference: &Ref) -> Response<Ref> {
        let result = self.delete(kind, reference).await;
        finish(Some(kind), "remove", result, Status::Ok)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get(&self, kind: Kind, reference: &Ref) -> Response<ResourceDto> {
        let result = self.fetch(kind, reference).await;
        finish(Some(kind), "get", result, Status::Ok)
    }

    /// List a collection. `None`, blank or `*` returns everything; anything
    /// else is parsed as a filter expression.
    pub async fn find(&self, kind: Kind, filter: Option<&str>) -> Response<Vec<ResourceDto>> {
        let result = self.search(kind, filter).await;
        finish(Some(kind), "find", result, Status::Ok)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    fn check_schema(&self, dto: &ResourceDto) -> Result<(), ResourceError> {
        let document = dto
            .to_document()
            .map_err(|e| ResourceError::Internal(e.to_string()))?;
        self.validator
            .validate(dto.kind(), &document)
            .map_err(ResourceError::Validation)
    }

    fn admit_document(&self, document: Value) -> Result<ResourceDto, ResourceError> {
        let kind = match document.get("kind").and_then(Value::as_str) {
            Some(kind) => kind.parse::<Kind>().map_err(ResourceError::Validation)?,
            None => return Err(ResourceError::validation("kind is required")),
        };

        self.validator
            .validate(kind, &document)
            .map_err(ResourceError::Validation)?;

        ResourceDto::from_document(document).map_err(|e| ResourceError::Validation(e.to_string()))
    }

    async fn create(&self, dto: ResourceDto) -> Result<Ref, ResourceError> {
        dto.validate_create()?;

        let kind = dto.kind();
        let record = dto.to_storage().map_err(internal)?;
        let reference = self.store.insert(kind, record).await.map_err(translate)?;

        info!("Created {} '{}' ({})", kind, dto.metadata().name, reference);
        Ok(reference)
    }

    async fn replace(&self, dto: ResourceDto) -> Result<Ref, ResourceError> {
        dto.validate_update()?;

        let kind = dto.kind();
        let reference = dto
            .reference()
            .cloned()
            .ok_or_else(|| ResourceError::validation("reference is required for update"))?;

        self.require_existing(kind, &reference).await?;

        let record = dto.to_storage().map_err(internal)?;
        self.store
            .update_by_ref(kind, &reference, record)
            .await
            .map_err(translate)?;

        info!("Updated {} {}", kind, reference);
        Ok(reference)
    }

    async fn delete(&self, kind: Kind, reference: &Ref) -> Result<Ref, ResourceError> {
        self.require_existing(kind, reference).await?;
        self.store
            .remove_by_ref(kind, reference)
            .await
            .map_err(translate)?;

        info!("Removed {} {}", kind, reference);
        Ok(reference.clone())
    }

    async fn fetch(&self, kind: Kind, reference: &Ref) -> Result<ResourceDto, ResourceError> {
        debug!("Fetching {} {}", kind, reference);
        let record = self.require_existing(kind, reference).await?;
        ResourceDto::from_storage(kind, &record).map_err(internal)
    }

    async fn search(&self, kind: Kind, filter: Option<&str>) -> Result<Vec<ResourceDto>, ResourceError> {
        let filter = match filter.map(str::trim) {
            None | Some("") | Some(WILDCARD) => None,
            Some(expression) => Some(FilterExpression::parse(expression)?),
        };

        let records = self.store.find_all(kind).await.map_err(translate)?;
        debug!("Loaded {} {} record(s)", records.len(), kind.collection());

        let Some(filter) = filter else {
            return records
                .iter()
                .map(|record| ResourceDto::from_storage(kind, record).map_err(internal))
                .collect();
        };

        let mut matches = Vec::new();
        for record in &records {
            let dto = ResourceDto::from_storage(kind, record).map_err(internal)?;
            let document = dto
                .to_document()
                .map_err(|e| ResourceError::Internal(e.to_string()))?;
            if filter.matches(&document) {
                matches.push(dto);
            }
        }

        if matches.is_empty() {
            return Err(ResourceError::NotFound(format!(
                "no {} matched filter: {}",
                kind.collection(),
                filter
            )));
        }

        Ok(matches)
    }

    async fn require_existing(&self, kind: Kind, reference: &Ref) -> Result<StorageRecord, ResourceError> {
        self.store
            .find_by_ref(kind, reference)
            .await
            .map_err(translate)?
            .ok_or_else(|| {
                ResourceError::NotFound(format!("{} with ref {} not found", kind, reference))
            })
    }
}

fn internal(error: MappingError) -> ResourceError {
    ResourceError::Internal(error.to_string())
}

/// Kind named by an untyped document, when it names a known one
fn document_kind(document: &Value) -> Option<Kind> {
    document.get("kind")?.as_str()?.parse().ok()
}

/// Wrap an operation outcome into a response, logging and counting it.
/// `kind` is `None` when a document was rejected before its kind was known.
fn finish<T>(
    kind: Option<Kind>,
    operation: &'static str,
    result: Result<T, ResourceError>,
    success: Status,
) -> Response<T> {
    let kind = kind.map_or(UNKNOWN_KIND, |k| k.as_str());
    if let Err(e) = &result {
        match e.status() {
            Status::Internal => warn!("{} {} failed: {}", operation, kind, e),
            _ => debug!("{} {} rejected: {}", operation, kind, e),
        }
    }

    let response = Response::from_result(result, success);
    metrics::counter!(
        OPERATIONS_TOTAL,
        "kind" => kind,
        "operation" => operation,
        "status" => response.status.as_str()
    )
    .increment(1);
    response
}

// ============================================================================
// Collection Handle
// ============================================================================

/// Operations bound to one collection, e.g. `manager.with_collection(Kind::Agent)`
#[derive(Clone, Copy)]
pub struct CollectionHandle<'a> {
    manager: &'a ResourceManager,
    kind: Kind,
}

impl CollectionHandle<'_> {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub async fn find(&self, filter: Option<&str>) -> Response<Vec<ResourceDto>> {
        self.manager.find(self.kind, filter).await
    }

    pub async fn get(&self, reference: &Ref) -> Response<ResourceDto> {
        self.manager.get(self.kind, reference).await
    }

    pub async fn remove(&self, reference: &Ref) -> Response<Ref> {
        self.manager.remove(self.kind, reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use metrics::{
        Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use serde_json::json;

    use crate::infrastructure::repositories::InMemoryCollectionStore;
    use crate::infrastructure::schema_validator::JsonSchemaValidator;

    type Sink = Arc<Mutex<Vec<Key>>>;

    struct RecordedCounter {
        key: Key,
        sink: Sink,
    }

    impl CounterFn for RecordedCounter {
        fn increment(&self, _value: u64) {
            self.sink.lock().unwrap().push(self.key.clone());
        }

        fn absolute(&self, _value: u64) {}
    }

    #[derive(Default)]
    struct CountingRecorder {
        sink: Sink,
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            Counter::from_arc(Arc::new(RecordedCounter {
                key: key.clone(),
                sink: self.sink.clone(),
            }))
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    fn label<'a>(key: &'a Key, name: &str) -> Option<&'a str> {
        key.labels().find(|l| l.key() == name).map(|l| l.value())
    }

    fn manager() -> ResourceManager {
        ResourceManager::new(
            Arc::new(InMemoryCollectionStore::new()),
            Arc::new(JsonSchemaValidator::new().unwrap()),
        )
    }

    /// Run `operation` against a fresh manager, returning the counter keys it emitted
    fn counted<F, Fut, T>(operation: F) -> (T, Vec<Key>)
    where
        F: FnOnce(ResourceManager) -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let recorder = CountingRecorder::default();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = metrics::with_local_recorder(&recorder, || runtime.block_on(operation(manager())));
        let keys = recorder.sink.lock().unwrap().clone();
        (result, keys)
    }

    #[test]
    fn test_rejected_documents_are_counted() {
        let (response, keys) = counted(|manager| async move {
            manager
                .insert_document(json!({
                    "apiVersion": "v2",
                    "kind": "Gateway",
                    "metadata": { "name": "Provider Trunk" },
                    "spec": { "host": "sip.provider.net", "transport": "carrier-pigeon" }
                }))
                .await
        });
        assert_eq!(response.status, Status::BadRequest);

        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name(), OPERATIONS_TOTAL);
        assert_eq!(label(&keys[0], "kind"), Some("Gateway"));
        assert_eq!(label(&keys[0], "operation"), Some("insert"));
        assert_eq!(label(&keys[0], "status"), Some("BAD_REQUEST"));
    }

    #[test]
    fn test_documents_without_a_known_kind_are_counted() {
        let (responses, keys) = counted(|manager| async move {
            let missing = manager.update_document(json!({ "apiVersion": "v2" })).await;
            let unknown = manager.insert_document(json!({ "kind": "Trunk" })).await;
            (missing, unknown)
        });
        assert_eq!(responses.0.error.as_deref(), Some("kind is required"));
        assert_eq!(responses.1.status, Status::BadRequest);

        let operations: Vec<_> = keys
            .iter()
            .map(|key| (label(key, "kind"), label(key, "operation")))
            .collect();
        assert_eq!(
            operations,
            vec![
                (Some(UNKNOWN_KIND), Some("update")),
                (Some(UNKNOWN_KIND), Some("insert")),
            ]
        );
    }
}
