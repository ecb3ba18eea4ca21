//! HTTP implementation of the record-store protocol.
//!
//! One endpoint per primitive under `/v1/tables/{table}`:
//!
//! ```text
//! POST   /v1/tables/{table}/query          query
//! GET    /v1/tables/{table}/records/{id}   getOne   (?fields=a,b,c)
//! POST   /v1/tables/{table}/records        mutateCreate
//! PUT    /v1/tables/{table}/records        mutateUpdate
//! DELETE /v1/tables/{table}/records        mutateDelete
//! ```
//!
//! Authentication is a bearer token supplied once at construction. The
//! client performs no retries and sets no timeout of its own; it relies on
//! `reqwest`'s defaults, which callers can tune via environment if needed.

use crate::error::{StoreError, StoreResult};
use crate::protocol::{
    DeleteResponse, GetOneResponse, MutateResponse, QueryRequest, QueryResponse, Record,
};
use crate::RecordStore;
use hms_types::{NonEmptyText, RecordId};
use serde::de::DeserializeOwned;
use serde_json::json;

/// A record-store client over HTTP/JSON.
pub struct HttpRecordStore {
    base_url: String,
    token: Option<NonEmptyText>,
    client: reqwest::Client,
}

impl HttpRecordStore {
    /// Creates a client for the store at `base_url`. `token: None` means
    /// the store is unauthenticated; a blank token cannot be represented.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::BaseUrl` if the URL is blank or lacks a scheme.
    pub fn new(base_url: &str, token: Option<NonEmptyText>) -> StoreResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() || !trimmed.contains("://") {
            return Err(StoreError::BaseUrl(base_url.to_owned()));
        }
        Ok(Self {
            base_url: trimmed.to_owned(),
            token,
            client: reqwest::Client::new(),
        })
    }

    fn table_url(&self, table: &str, tail: &str) -> String {
        format!("{}/v1/tables/{}/{}", self.base_url, table, tail)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: String,
        request: reqwest::RequestBuilder,
    ) -> StoreResult<T> {
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%endpoint, %status, "record store rejected request");
            return Err(StoreError::Status { endpoint, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(StoreError::Decode)
    }
}

#[async_trait::async_trait]
impl RecordStore for HttpRecordStore {
    async fn query(&self, table: &str, request: QueryRequest) -> StoreResult<QueryResponse> {
        let url = self.table_url(table, "query");
        tracing::debug!(table, limit = request.paging_info.limit, "store query");
        self.dispatch(url.clone(), self.client.post(url).json(&request))
            .await
    }

    async fn get_one(
        &self,
        table: &str,
        id: RecordId,
        fields: &[&str],
    ) -> StoreResult<GetOneResponse> {
        let url = self.table_url(table, &format!("records/{id}"));
        let request = self.client.get(&url).query(&[("fields", fields.join(","))]);
        self.dispatch(url, request).await
    }

    async fn mutate_create(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse> {
        let url = self.table_url(table, "records");
        let body = json!({ "records": records });
        self.dispatch(url.clone(), self.client.post(url).json(&body))
            .await
    }

    async fn mutate_update(&self, table: &str, records: Vec<Record>) -> StoreResult<MutateResponse> {
        let url = self.table_url(table, "records");
        let body = json!({ "records": records });
        self.dispatch(url.clone(), self.client.put(url).json(&body))
            .await
    }

    async fn mutate_delete(
        &self,
        table: &str,
        record_ids: Vec<RecordId>,
    ) -> StoreResult<DeleteResponse> {
        let url = self.table_url(table, "records");
        let body = json!({ "recordIds": record_ids });
        self.dispatch(url.clone(), self.client.delete(url).json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_or_schemeless_urls() {
        assert!(HttpRecordStore::new("", None).is_err());
        assert!(HttpRecordStore::new("store.example.com", None).is_err());
        assert!(HttpRecordStore::new("https://store.example.com/", None).is_ok());
    }

    #[test]
    fn trailing_slash_is_normalised_out_of_endpoints() {
        let store = HttpRecordStore::new("https://store.example.com/", None)
            .expect("should accept valid URL");
        assert_eq!(
            store.table_url("patients", "query"),
            "https://store.example.com/v1/tables/patients/query"
        );
    }

    #[test]
    fn token_is_kept_as_supplied() {
        let token = NonEmptyText::new("s3cret").expect("token is not blank");
        let store = HttpRecordStore::new("https://store.example.com", Some(token))
            .expect("should accept valid URL");
        assert_eq!(
            store.token.as_ref().map(NonEmptyText::as_str),
            Some("s3cret")
        );
    }
}
