//! The generic entity-service adapter.
//!
//! One [`EntityService`] per entity kind mediates between calling code and
//! the record store: it restricts reads to the descriptor's readable fields,
//! shapes mutation payloads through [`crate::payload`], unwraps the store's
//! success/failure envelopes, and feeds the user-facing notification
//! channel. The service holds no record state; the store is the sole system
//! of record.
//!
//! Mutations against the same record id are serialized through a per-id
//! async mutex so that rapid repeated writes (a double-clicked status
//! button) resolve in submission order rather than network-arrival order.
//! Reads are not serialized.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{Notification, Notify};
use crate::payload::{build_payload, derive_name, PayloadMode};
use hms_store::{
    Filter, MutateResponse, OrderBy, PagingInfo, QueryRequest, Record, RecordStore,
    ID_FIELD, NAME_FIELD,
};
use hms_types::RecordId;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Default page size when a caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Parameters of a list operation. `Default` gives the per-entity natural
/// order with the default page size.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Extra predicates, combined with AND by the store.
    pub filters: Vec<Filter>,
    /// Quick-search text, expanded to an OR `Contains` group over the
    /// descriptor's search fields.
    pub search: Option<String>,
    /// Overrides the descriptor's natural order.
    pub order: Option<OrderBy>,
    /// Overrides the default page size.
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Serializes mutations per record id.
///
/// The map holds one async mutex per id ever mutated by this service in this
/// process; entries are never evicted, which is fine at console scale.
#[derive(Default)]
struct IdLocks {
    inner: StdMutex<HashMap<RecordId, Arc<AsyncMutex<()>>>>,
}

impl IdLocks {
    async fn acquire(&self, id: RecordId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = match self.inner.lock() {
                Ok(map) => map,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(map.entry(id).or_default())
        };
        lock.lock_owned().await
    }
}

/// The adapter: a uniform CRUD+query surface over one store table.
pub struct EntityService {
    descriptor: &'static EntityDescriptor,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notify>,
    locks: IdLocks,
    page_limit: usize,
}

impl EntityService {
    pub fn new(
        kind: EntityKind,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notify>,
        page_limit: usize,
    ) -> Self {
        Self {
            descriptor: kind.descriptor(),
            store,
            notifier,
            locks: IdLocks::default(),
            page_limit: page_limit.max(1),
        }
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    fn notify_error(&self, message: String) {
        self.notifier.push(Notification::error(message));
    }

    fn notify_success(&self, message: String) {
        self.notifier.push(Notification::success(message));
    }

    fn natural_order(&self) -> OrderBy {
        if self.descriptor.order_descending {
            OrderBy::desc(self.descriptor.order_field)
        } else {
            OrderBy::asc(self.descriptor.order_field)
        }
    }

    /// Lists records matching `query`, restricted to the readable fields.
    ///
    /// # Errors
    ///
    /// `ServiceError::Store` on transport failure, `ServiceError::Rejected`
    /// when the store answers but refuses the query; either way exactly one
    /// "Failed to fetch ..." notification is emitted. An empty result is
    /// `Ok(vec![])`, distinct from failure.
    pub async fn list(&self, query: ListQuery) -> ServiceResult<Vec<Record>> {
        let mut where_clauses = Vec::new();
        let mut where_groups = Vec::new();
        for filter in query.filters {
            match filter {
                Filter::Match(m) => where_clauses.push(m),
                group @ Filter::Group(_) => where_groups.push(group),
            }
        }
        if let Some(needle) = query.search.as_deref().map(str::trim) {
            if !needle.is_empty() {
                where_groups.push(Filter::any_contains(self.descriptor.search_fields, needle));
            }
        }

        let request = QueryRequest {
            fields: self
                .descriptor
                .readable_fields
                .iter()
                .map(|f| (*f).to_owned())
                .collect(),
            where_clauses,
            where_groups,
            order_by: Some(query.order.unwrap_or_else(|| self.natural_order())),
            paging_info: PagingInfo {
                // A per-request limit cannot exceed the bound that startup
                // configuration already enforces on the default.
                limit: query
                    .limit
                    .unwrap_or(self.page_limit)
                    .min(crate::config::MAX_PAGE_LIMIT),
                offset: query.offset,
            },
        };

        let response = match self.store.query(self.descriptor.table, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, error = %e, "list query failed");
                self.notify_error(format!("Failed to fetch {}", self.descriptor.plural));
                return Err(e.into());
            }
        };

        if !response.success {
            self.notify_error(format!("Failed to fetch {}", self.descriptor.plural));
            return Err(ServiceError::Rejected {
                entity: self.descriptor.singular,
                operation: "query",
            });
        }

        Ok(response.data)
    }

    /// Fetches one record by id. `Ok(None)` means the id does not exist;
    /// transport and store failures are reported as errors, not conflated
    /// with not-found.
    pub async fn get(&self, id: RecordId) -> ServiceResult<Option<Record>> {
        let response = match self
            .store
            .get_one(self.descriptor.table, id, self.descriptor.readable_fields)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, %id, error = %e, "get failed");
                self.notify_error(format!("Failed to fetch {}", self.descriptor.singular));
                return Err(e.into());
            }
        };

        if !response.success {
            self.notify_error(format!("Failed to fetch {}", self.descriptor.singular));
            return Err(ServiceError::Rejected {
                entity: self.descriptor.singular,
                operation: "fetch",
            });
        }

        Ok(response.data)
    }

    /// Creates one record from a partial field map.
    ///
    /// Non-writable fields are dropped, blank inputs give way to descriptor
    /// defaults, and a derived `Name` is filled in — see [`crate::payload`].
    /// Returns the record as the store created it, id included.
    pub async fn create(&self, input: Record) -> ServiceResult<Record> {
        let payload = build_payload(self.descriptor, input, PayloadMode::Create);

        let response = match self
            .store
            .mutate_create(self.descriptor.table, vec![payload])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, error = %e, "create failed");
                self.notify_error(format!("Failed to create {}", self.descriptor.singular));
                return Err(e.into());
            }
        };

        self.unwrap_mutation(response, "create", "created")
    }

    /// Updates a record from a partial field map.
    ///
    /// Empty-string values are forwarded (clearing the field). When any
    /// constituent of the derived `Name` is part of the update, the name is
    /// recomputed, pulling the untouched constituents from the stored
    /// record.
    pub async fn update(&self, id: RecordId, input: Record) -> ServiceResult<Record> {
        let mut payload = build_payload(self.descriptor, input, PayloadMode::Update);

        // The lock must cover the name prefetch: the read-merge-write of the
        // derived name and the write itself are one serialized unit, so an
        // earlier-submitted update cannot commit after a later one.
        let _guard = self.locks.acquire(id).await;
        self.refresh_derived_name(id, &mut payload).await;
        payload.insert(ID_FIELD.to_owned(), Value::from(id.as_i64()));

        let response = match self
            .store
            .mutate_update(self.descriptor.table, vec![payload])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, %id, error = %e, "update failed");
                self.notify_error(format!("Failed to update {}", self.descriptor.singular));
                return Err(e.into());
            }
        };

        self.unwrap_mutation(response, "update", "updated")
    }

    /// Deletes a record by id. Succeeds only when the store explicitly
    /// reports the deletion of that id.
    pub async fn remove(&self, id: RecordId) -> ServiceResult<()> {
        let _guard = self.locks.acquire(id).await;
        let response = match self
            .store
            .mutate_delete(self.descriptor.table, vec![id])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, %id, error = %e, "delete failed");
                self.notify_error(format!("Failed to delete {}", self.descriptor.singular));
                return Err(e.into());
            }
        };

        if response.deleted() {
            self.notify_success(format!("{} deleted successfully", self.descriptor.label()));
            Ok(())
        } else {
            self.notify_error(format!("Failed to delete {}", self.descriptor.singular));
            Err(ServiceError::Rejected {
                entity: self.descriptor.singular,
                operation: "delete",
            })
        }
    }

    /// Updates exactly one field — the status-transition and flag-toggle
    /// convenience (confirm an appointment, resolve an emergency, flag a
    /// lab result critical).
    ///
    /// Deliberately permissive: the legal transition graphs are a
    /// calling-convention and this method performs whatever single-field
    /// update is requested.
    pub async fn set_field(
        &self,
        id: RecordId,
        field: &str,
        value: Value,
    ) -> ServiceResult<Record> {
        if !self.descriptor.is_writable(field) {
            self.notify_error(format!("Failed to update {}", self.descriptor.singular));
            return Err(ServiceError::NotWritable {
                entity: self.descriptor.singular,
                field: field.to_owned(),
            });
        }

        let mut input = Record::new();
        input.insert(field.to_owned(), value.clone());
        let mut payload = build_payload(self.descriptor, input, PayloadMode::Update);
        payload.insert(ID_FIELD.to_owned(), Value::from(id.as_i64()));

        let _guard = self.locks.acquire(id).await;
        let response = match self
            .store
            .mutate_update(self.descriptor.table, vec![payload])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(table = self.descriptor.table, %id, error = %e, "set_field failed");
                self.notify_error(format!("Failed to update {}", self.descriptor.singular));
                return Err(e.into());
            }
        };

        let message = match (field, value.as_str()) {
            ("status", Some(status)) => {
                format!("{} {status} successfully", self.descriptor.label())
            }
            _ => format!("{} updated successfully", self.descriptor.label()),
        };
        self.unwrap_mutation_with(response, "update", message)
    }

    /// Recomputes the derived `Name` for an update payload that touches any
    /// of its constituents, unless the caller supplied `Name` directly.
    /// Constituents not in this update fall back to their stored values; if
    /// the fetch fails the name is derived from what the payload carries.
    async fn refresh_derived_name(&self, id: RecordId, payload: &mut Record) {
        if payload.contains_key(NAME_FIELD) {
            return;
        }
        let parts = self.descriptor.name_template.parts;
        if !parts.iter().any(|part| payload.contains_key(*part)) {
            return;
        }

        let mut merged = payload.clone();
        let needs_fetch = parts.iter().any(|part| !payload.contains_key(*part));
        if needs_fetch {
            match self
                .store
                .get_one(self.descriptor.table, id, parts)
                .await
            {
                Ok(response) => {
                    if let Some(current) = response.data {
                        for (field, value) in current {
                            merged.entry(field).or_insert(value);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        table = self.descriptor.table,
                        %id,
                        error = %e,
                        "could not fetch current record for name derivation"
                    );
                }
            }
        }

        payload.insert(
            NAME_FIELD.to_owned(),
            Value::from(derive_name(self.descriptor, &merged)),
        );
    }

    fn unwrap_mutation(
        &self,
        response: MutateResponse,
        operation: &'static str,
        past_tense: &str,
    ) -> ServiceResult<Record> {
        let message = format!("{} {past_tense} successfully", self.descriptor.label());
        self.unwrap_mutation_with(response, operation, message)
    }

    /// Unwraps a single-record mutation envelope: per-field validation
    /// errors each get their own notification, generic refusals get one.
    fn unwrap_mutation_with(
        &self,
        response: MutateResponse,
        operation: &'static str,
        success_message: String,
    ) -> ServiceResult<Record> {
        let result = response.into_single();

        if result.success {
            if let Some(record) = result.data {
                self.notify_success(success_message);
                return Ok(record);
            }
        }

        if result.errors.is_empty() {
            self.notify_error(format!(
                "Failed to {operation} {}",
                self.descriptor.singular
            ));
            return Err(ServiceError::Rejected {
                entity: self.descriptor.singular,
                operation,
            });
        }

        for error in &result.errors {
            self.notify_error(format!("{}: {}", error.field_label, error.message));
        }
        Err(ServiceError::Validation {
            entity: self.descriptor.singular,
            errors: result.errors,
        })
    }
}

/// A typed view over an [`EntityService`], decoding records into `E`.
pub struct Typed<E> {
    inner: Arc<EntityService>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Typed<E> {
    pub fn new(inner: Arc<EntityService>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    fn decode(&self, record: Record) -> ServiceResult<E> {
        serde_json::from_value(Value::Object(record)).map_err(|source| ServiceError::Decode {
            entity: self.inner.descriptor.singular,
            source,
        })
    }

    pub async fn list(&self, query: ListQuery) -> ServiceResult<Vec<E>> {
        self.inner
            .list(query)
            .await?
            .into_iter()
            .map(|record| self.decode(record))
            .collect()
    }

    pub async fn get(&self, id: RecordId) -> ServiceResult<Option<E>> {
        match self.inner.get(id).await? {
            Some(record) => self.decode(record).map(Some),
            None => Ok(None),
        }
    }

    pub async fn create(&self, input: Record) -> ServiceResult<E> {
        let record = self.inner.create(input).await?;
        self.decode(record)
    }

    pub async fn update(&self, id: RecordId, input: Record) -> ServiceResult<E> {
        let record = self.inner.update(id, input).await?;
        self.decode(record)
    }

    pub async fn remove(&self, id: RecordId) -> ServiceResult<()> {
        self.inner.remove(id).await
    }

    pub async fn set_field(&self, id: RecordId, field: &str, value: Value) -> ServiceResult<E> {
        let record = self.inner.set_field(id, field, value).await?;
        self.decode(record)
    }
}

/// One service per entity kind, sharing a store client and notifier.
///
/// Built once at startup from [`crate::config::ConsoleConfig`]; the store
/// client is injected rather than constructed inside each service, so tests
/// swap in stubs trivially.
pub struct ServiceRegistry {
    services: HashMap<EntityKind, Arc<EntityService>>,
}

impl ServiceRegistry {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notify>,
        page_limit: usize,
    ) -> Self {
        let services = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    Arc::new(EntityService::new(
                        kind,
                        Arc::clone(&store),
                        Arc::clone(&notifier),
                        page_limit,
                    )),
                )
            })
            .collect();
        Self { services }
    }

    pub fn service(&self, kind: EntityKind) -> Arc<EntityService> {
        Arc::clone(
            self.services
                .get(&kind)
                .unwrap_or_else(|| unreachable!("registry covers every EntityKind")),
        )
    }

    pub fn typed<E: Entity>(&self) -> Typed<E> {
        Typed::new(self.service(E::KIND))
    }
}
