//! Service-level error taxonomy.
//!
//! The failure classes match what the console surfaces: the transport
//! failed, the store rejected the record with field detail, the store
//! rejected the operation without detail, or the caller asked for something
//! the whitelist forbids. "No matching record" is
//! deliberately *not* an error: reads return `Ok(None)` / an empty list so
//! callers can tell an empty result from a failed query.

use hms_store::{FieldError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The store could not be reached or answered with garbage.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store answered but refused the operation without field detail.
    #[error("the record store rejected the {operation} of a {entity}")]
    Rejected {
        entity: &'static str,
        operation: &'static str,
    },

    /// The caller asked to write a field outside the entity's whitelist.
    /// Raised before the store is contacted; a caller mistake, not a store
    /// failure.
    #[error("field {field:?} of a {entity} is not writable")]
    NotWritable {
        entity: &'static str,
        field: String,
    },

    /// The store rejected one or more fields on create/update.
    #[error("validation failed for {entity}: {} field error(s)", errors.len())]
    Validation {
        entity: &'static str,
        errors: Vec<FieldError>,
    },

    /// A record came back in a shape the typed layer could not decode.
    #[error("failed to decode {entity} record: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
