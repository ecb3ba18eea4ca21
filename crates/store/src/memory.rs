//! In-memory implementation of the record-store protocol.
//!
//! The original console could run its screens off mock arrays instead of the
//! remote store; this is that mode. The binaries fall back to it when no
//! store URL is configured, and the test suites use it as a faithful stand-in
//! that actually evaluates filters, ordering and paging.
//!
//! Semantics mirror the remote store: ids are assigned sequentially on
//! create, audit timestamps (`created_at`, `updated_at`) are stamped by the
//! store, updates merge fields into the existing record, and deletes report
//! per-id success.

use crate::error::StoreResult;
use crate::filter::{BoolOp, FieldMatch, Filter, FilterOp};
use crate::protocol::{
    DeleteResponse, DeleteResult, GetOneResponse, MutateResponse, OrderBy, QueryRequest,
    QueryResponse, Record, RecordResult, SortDirection, ID_FIELD,
};
use crate::RecordStore;
use hms_types::RecordId;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{self, AtomicI64};
use tokio::sync::RwLock;

/// A record store held entirely in process memory.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        // Relaxed is fine: the counter only needs uniqueness, not ordering
        // against table contents.
        self.next_id.fetch_add(1, atomic::Ordering::Relaxed)
    }

    fn timestamp() -> Value {
        Value::String(chrono::Utc::now().to_rfc3339())
    }
}

fn record_id(record: &Record) -> Option<i64> {
    record.get(ID_FIELD).and_then(Value::as_i64)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ordering between two field values: numbers numerically, everything else
/// lexicographically on the string form. Absent values sort first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(nx), Some(ny)) => nx.partial_cmp(&ny).unwrap_or(Ordering::Equal),
            _ => text_of(x).cmp(&text_of(y)),
        },
    }
}

fn matches_field(record: &Record, m: &FieldMatch) -> bool {
    let actual = record.get(&m.field);
    m.values.iter().any(|wanted| match m.operator {
        FilterOp::ExactMatch => actual == Some(wanted),
        FilterOp::Contains => actual.is_some_and(|v| {
            text_of(v)
                .to_lowercase()
                .contains(&text_of(wanted).to_lowercase())
        }),
        FilterOp::GreaterThanOrEqualTo => {
            compare_values(actual, Some(wanted)) != Ordering::Less
        }
        FilterOp::LessThanOrEqualTo => {
            compare_values(actual, Some(wanted)) != Ordering::Greater
        }
        FilterOp::RelativeMatch => actual.is_some_and(|v| {
            let haystack = text_of(v).to_lowercase();
            text_of(wanted)
                .to_lowercase()
                .split_whitespace()
                .all(|token| haystack.contains(token))
        }),
    })
}

fn matches_filter(record: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::Match(m) => matches_field(record, m),
        Filter::Group(group) => match group.boolean_op {
            BoolOp::And => group.members.iter().all(|f| matches_filter(record, f)),
            BoolOp::Or => group.members.iter().any(|f| matches_filter(record, f)),
        },
    }
}

fn sort_records(records: &mut [Record], order: &OrderBy) {
    records.sort_by(|a, b| {
        let cmp = compare_values(a.get(&order.field), b.get(&order.field));
        match order.direction {
            SortDirection::Asc => cmp,
            SortDirection::Desc => cmp.reverse(),
        }
    });
}

/// Projects a record onto the requested fields. `Id` always survives so the
/// caller can target follow-up mutations.
fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    let mut out = Record::new();
    if let Some(id) = record.get(ID_FIELD) {
        out.insert(ID_FIELD.to_owned(), id.clone());
    }
    for field in fields {
        if let Some(value) = record.get(field) {
            out.insert(field.clone(), value.clone());
        }
    }
    out
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, table: &str, request: QueryRequest) -> StoreResult<QueryResponse> {
        let tables = self.tables.read().await;
        let mut matched: Vec<Record> = tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        request
                            .where_clauses
                            .iter()
                            .all(|m| matches_field(r, m))
                            && request.where_groups.iter().all(|f| matches_filter(r, f))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &request.order_by {
            sort_records(&mut matched, order);
        }

        let data = matched
            .into_iter()
            .skip(request.paging_info.offset)
            .take(request.paging_info.limit)
            .map(|r| project(&r, &request.fields))
            .collect();

        Ok(QueryResponse {
            success: true,
            data,
        })
    }

    async fn get_one(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> StoreResult<GetOneResponse> {
        let tables = self.tables.read().await;
        let owned: Vec<String> = fields.iter().map(|f| (*f).to_owned()).collect();
        let data = tables
            .get(table)
            .and_then(|records| records.iter().find(|r| record_id(r) == Some(id.as_i64())))
            .map(|r| project(r, &owned));

        Ok(GetOneResponse {
            success: true,
            data,
        })
    }

    async fn mutate_create(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse> {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_owned()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for mut record in records {
            let id = self.allocate_id();
            record.insert(ID_FIELD.to_owned(), Value::from(id));
            record.insert("created_at".to_owned(), Self::timestamp());
            record.insert("updated_at".to_owned(), Self::timestamp());
            stored.push(record.clone());
            results.push(RecordResult {
                success: true,
                data: Some(record),
                errors: Vec::new(),
            });
        }

        Ok(MutateResponse {
            success: true,
            results,
        })
    }

    async fn mutate_update(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse> {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_owned()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let Some(id) = record_id(&record) else {
                results.push(RecordResult {
                    success: false,
                    data: None,
                    errors: Vec::new(),
                });
                continue;
            };

            match stored.iter_mut().find(|r| record_id(r) == Some(id)) {
                Some(existing) => {
                    for (field, value) in record {
                        existing.insert(field, value);
                    }
                    existing.insert("updated_at".to_owned(), Self::timestamp());
                    results.push(RecordResult {
                        success: true,
                        data: Some(existing.clone()),
                        errors: Vec::new(),
                    });
                }
                None => results.push(RecordResult {
                    success: false,
                    data: None,
                    errors: Vec::new(),
                }),
            }
        }

        Ok(MutateResponse {
            success: true,
            results,
        })
    }

    async fn mutate_delete(
        &self,
        table: &str,
        record_ids: Vec<RecordId>,
    ) -> StoreResult<DeleteResponse> {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_owned()).or_default();

        let mut results = Vec::with_capacity(record_ids.len());
        for id in record_ids {
            let before = stored.len();
            stored.retain(|r| record_id(r) != Some(id.as_i64()));
            results.push(DeleteResult {
                success: stored.len() < before,
            });
        }

        Ok(DeleteResponse {
            success: true,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PagingInfo;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for (name, status) in [
            ("Ada Lovelace", "pending"),
            ("Grace Hopper", "confirmed"),
            ("Alan Turing", "pending"),
        ] {
            store
                .mutate_create(
                    "appointments",
                    vec![record(&[
                        ("Name", json!(name)),
                        ("status", json!(status)),
                    ])],
                )
                .await
                .expect("create should succeed");
        }
        store
    }

    fn all_fields_query() -> QueryRequest {
        QueryRequest {
            fields: Vec::new(),
            where_clauses: Vec::new(),
            where_groups: Vec::new(),
            order_by: None,
            paging_info: PagingInfo {
                limit: 100,
                offset: 0,
            },
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_audit_timestamps() {
        let store = MemoryStore::new();
        let response = store
            .mutate_create("patients", vec![record(&[("Name", json!("Ada"))])])
            .await
            .expect("create should succeed");

        let created = response.into_single().data.expect("should return record");
        assert!(created.get(ID_FIELD).and_then(Value::as_i64).is_some());
        assert!(created.contains_key("created_at"));
        assert!(created.contains_key("updated_at"));
    }

    #[tokio::test]
    async fn exact_match_and_contains_filters_select_rows() {
        let store = seeded_store().await;

        let mut query = all_fields_query();
        query.where_clauses = vec![FieldMatch::new("status", FilterOp::ExactMatch, "pending")];
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        assert_eq!(response.data.len(), 2);

        let mut query = all_fields_query();
        query.where_groups = vec![Filter::contains("Name", "lovelace")];
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        assert_eq!(response.data.len(), 1);
    }

    #[tokio::test]
    async fn or_group_matches_any_member() {
        let store = seeded_store().await;
        let mut query = all_fields_query();
        query.where_groups = vec![Filter::any_contains(&["Name"], "hopper")];
        // OR over a second never-matching field should not shrink results.
        if let Filter::Group(group) = &mut query.where_groups[0] {
            group.members.push(Filter::contains("status", "no-such"));
        }
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        assert_eq!(response.data.len(), 1);
    }

    #[tokio::test]
    async fn relative_match_requires_every_token() {
        let store = seeded_store().await;
        let mut query = all_fields_query();
        query.where_clauses = vec![FieldMatch::new(
            "Name",
            FilterOp::RelativeMatch,
            "lovelace ada",
        )];
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        assert_eq!(response.data.len(), 1, "both tokens appear in 'Ada Lovelace'");
    }

    #[tokio::test]
    async fn ordering_and_paging_are_applied_after_filtering() {
        let store = seeded_store().await;
        let mut query = all_fields_query();
        query.order_by = Some(OrderBy::asc("Name"));
        query.paging_info = PagingInfo {
            limit: 2,
            offset: 1,
        };
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        let names: Vec<_> = response
            .data
            .iter()
            .map(|r| r["Name"].as_str().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(names, vec!["Alan Turing", "Grace Hopper"]);
    }

    #[tokio::test]
    async fn projection_keeps_id_and_requested_fields_only() {
        let store = seeded_store().await;
        let mut query = all_fields_query();
        query.fields = vec!["Name".into()];
        let response = store
            .query("appointments", query)
            .await
            .expect("query should succeed");
        let first = &response.data[0];
        assert!(first.contains_key(ID_FIELD));
        assert!(first.contains_key("Name"));
        assert!(!first.contains_key("status"));
    }

    #[tokio::test]
    async fn update_merges_fields_and_missing_id_fails() {
        let store = seeded_store().await;
        let response = store
            .mutate_update(
                "appointments",
                vec![record(&[
                    (ID_FIELD, json!(1)),
                    ("status", json!("confirmed")),
                ])],
            )
            .await
            .expect("update should succeed");
        let updated = response.into_single().data.expect("should return record");
        assert_eq!(updated["status"], "confirmed");
        assert_eq!(updated["Name"], "Ada Lovelace", "untouched fields survive");

        let response = store
            .mutate_update(
                "appointments",
                vec![record(&[(ID_FIELD, json!(999))])],
            )
            .await
            .expect("call should succeed");
        assert!(!response.into_single().success);
    }

    #[tokio::test]
    async fn delete_reports_per_id_success() {
        let store = seeded_store().await;
        let response = store
            .mutate_delete("appointments", vec![RecordId::new(2)])
            .await
            .expect("delete should succeed");
        assert!(response.deleted());

        let response = store
            .mutate_delete("appointments", vec![RecordId::new(2)])
            .await
            .expect("delete should succeed");
        assert!(!response.deleted(), "second delete of same id fails");

        let remaining = store
            .get_one("appointments", RecordId::new(2), &[])
            .await
            .expect("get should succeed");
        assert!(remaining.data.is_none());
    }
}
