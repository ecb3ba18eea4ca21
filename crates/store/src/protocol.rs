//! Wire types for the five store primitives.
//!
//! Requests and responses serialize with the camelCase keys the store
//! expects. `records` and `recordIds` arrays are single-element in practice
//! (the console never batches), but the wire shape allows more.

use crate::filter::{FieldMatch, Filter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record as it travels over the wire: a flat map from field name to
/// scalar or date-string value. Carries `Id` for update/delete targeting;
/// omits it on create.
pub type Record = serde_json::Map<String, Value>;

/// Field name of the store-assigned record identifier.
pub const ID_FIELD: &str = "Id";

/// Field name of the human-readable display name every record carries.
pub const NAME_FIELD: &str = "Name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort key for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }
}

/// Paging bounds for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    pub limit: usize,
    pub offset: usize,
}

/// Body of a `query` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub fields: Vec<String>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<FieldMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    pub paging_info: PagingInfo,
}

/// Response of a `query` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Record>,
}

/// Response of a `getOne` call. `data: None` with `success: true` means the
/// id does not exist.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetOneResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Record>,
}

/// A field-level rejection reported by the store on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

/// Per-record outcome of a create/update mutation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Record>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// Response of a `mutateCreate`/`mutateUpdate` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MutateResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<RecordResult>,
}

/// Per-id outcome of a delete.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteResult {
    pub success: bool,
}

/// Response of a `mutateDelete` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<DeleteResult>,
}

impl MutateResponse {
    /// Unwraps the single-record result the console's one-record mutations
    /// produce. A response with no results counts as a failed result.
    pub fn into_single(mut self) -> RecordResult {
        if self.results.is_empty() {
            return RecordResult {
                success: false,
                data: None,
                errors: Vec::new(),
            };
        }
        self.results.swap_remove(0)
    }
}

impl DeleteResponse {
    /// True only if the store explicitly reported success for the first
    /// (and only) id. Partial batch failure reduces to total failure here
    /// because deletes are always single-id.
    pub fn deleted(&self) -> bool {
        self.success && self.results.first().is_some_and(|r| r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, FilterOp};
    use serde_json::json;

    #[test]
    fn query_request_uses_store_key_names() {
        let request = QueryRequest {
            fields: vec!["Id".into(), "Name".into()],
            where_clauses: vec![FieldMatch::new("status", FilterOp::ExactMatch, "active")],
            where_groups: vec![Filter::any_contains(&["Name"], "doe")],
            order_by: Some(OrderBy::desc("date")),
            paging_info: PagingInfo {
                limit: 50,
                offset: 0,
            },
        };

        let json = serde_json::to_value(&request).expect("should serialize");
        assert!(json.get("where").is_some(), "flat matches go under 'where'");
        assert!(json.get("whereGroups").is_some());
        assert_eq!(json["orderBy"]["direction"], "desc");
        assert_eq!(json["pagingInfo"], json!({"limit": 50, "offset": 0}));
    }

    #[test]
    fn empty_filter_lists_are_omitted_from_the_wire() {
        let request = QueryRequest {
            fields: vec!["Id".into()],
            where_clauses: Vec::new(),
            where_groups: Vec::new(),
            order_by: None,
            paging_info: PagingInfo {
                limit: 10,
                offset: 0,
            },
        };
        let json = serde_json::to_value(&request).expect("should serialize");
        assert!(json.get("where").is_none());
        assert!(json.get("whereGroups").is_none());
        assert!(json.get("orderBy").is_none());
    }

    #[test]
    fn mutate_response_with_no_results_unwraps_to_failure() {
        let response = MutateResponse {
            success: true,
            results: Vec::new(),
        };
        let result = response.into_single();
        assert!(!result.success);
        assert!(result.data.is_none());
    }

    #[test]
    fn delete_response_requires_explicit_per_id_success() {
        let ok = DeleteResponse {
            success: true,
            results: vec![DeleteResult { success: true }],
        };
        assert!(ok.deleted());

        let partial = DeleteResponse {
            success: true,
            results: vec![DeleteResult { success: false }],
        };
        assert!(!partial.deleted());

        let empty = DeleteResponse {
            success: true,
            results: Vec::new(),
        };
        assert!(!empty.deleted());
    }

    #[test]
    fn field_errors_deserialize_from_camel_case() {
        let result: RecordResult = serde_json::from_value(json!({
            "success": false,
            "errors": [{"fieldLabel": "Email", "message": "invalid address"}]
        }))
        .expect("should deserialize");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field_label, "Email");
    }
}
