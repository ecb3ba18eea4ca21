//! # HMS Store
//!
//! The remote record-store boundary for the HMS workspace.
//!
//! The hospital console persists every entity (patients, appointments,
//! invoices, ...) in a remote tabular store that speaks five primitives:
//! `query`, `getOne`, `mutateCreate`, `mutateUpdate` and `mutateDelete`.
//! This crate owns that boundary:
//!
//! - wire types for requests and responses ([`protocol`])
//! - filter expression construction ([`filter`])
//! - the [`RecordStore`] trait abstracting the transport
//! - an HTTP implementation ([`http::HttpRecordStore`])
//! - an in-memory implementation ([`memory::MemoryStore`]) used for dev mode
//!   and tests
//!
//! **No business logic**: field whitelisting, defaults and notifications
//! belong in `hms-core`. This crate moves records, it does not interpret
//! them.

pub mod error;
pub mod filter;
pub mod http;
pub mod memory;
pub mod protocol;

pub use error::{StoreError, StoreResult};
pub use filter::{BoolOp, FieldMatch, Filter, FilterGroup, FilterOp};
pub use http::HttpRecordStore;
pub use memory::MemoryStore;
pub use protocol::{
    DeleteResponse, DeleteResult, FieldError, GetOneResponse, MutateResponse, OrderBy,
    PagingInfo, QueryRequest, QueryResponse, Record, RecordResult, SortDirection, ID_FIELD,
    NAME_FIELD,
};

use hms_types::RecordId;

/// The five-primitive record-store protocol.
///
/// Every adapter operation in `hms-core` maps 1:1 onto exactly one of these
/// calls with a single-element `records`/`record_ids` array; batching across
/// ids is deliberately not part of the design.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call
/// concurrently; the store itself is externally owned and provides at least
/// monotonic read-after-write consistency within one client session.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads records from `table`, restricted to the requested fields.
    async fn query(&self, table: &str, request: QueryRequest) -> StoreResult<QueryResponse>;

    /// Reads a single record by id, restricted to the requested fields.
    async fn get_one(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> StoreResult<GetOneResponse>;

    /// Creates the given records; the store assigns ids.
    async fn mutate_create(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse>;

    /// Updates the given records; each must carry its `Id`.
    async fn mutate_update(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse>;

    /// Deletes records by id.
    async fn mutate_delete(
        &self,
        table: &str,
        record_ids: Vec<RecordId>,
    ) -> StoreResult<DeleteResponse>;
}
