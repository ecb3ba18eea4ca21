//! REST API for the hospital administration console.
//!
//! One set of generic routes serves all seven entity kinds; the entity slug
//! in the URL (`patients`, `appointments`, `lab-results`, ...) selects the
//! adapter out of the [`ServiceRegistry`]. Handlers are thin: parse, call
//! the service, map the result — every rule about whitelisting, defaults and
//! derived names lives in `hms-core`.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use hms_core::{EntityKind, ListQuery, ServiceError, ServiceRegistry};
use hms_store::{Filter, Record};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_records,
        create_record,
        get_record,
        update_record,
        delete_record,
        set_record_field,
    ),
    components(schemas(HealthRes, ErrorBody, FieldErrorBody))
)]
struct ApiDoc;

/// Builds the console router over the given registry.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/:entity", get(list_records).post(create_record))
        .route(
            "/api/:entity/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/api/:entity/:id/fields/:field", put(set_record_field))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldErrorBody>>,
}

/// REST-level error: a status code plus a JSON body.
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    fields: None,
                },
            ),
            Self::NotFound(error) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error,
                    fields: None,
                },
            ),
            Self::Service(ServiceError::Validation { entity, errors }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: format!("validation failed for {entity}"),
                    fields: Some(
                        errors
                            .into_iter()
                            .map(|e| FieldErrorBody {
                                field: e.field_label,
                                message: e.message,
                            })
                            .collect(),
                    ),
                },
            ),
            // Raised before the store is contacted; the caller named a field
            // outside the whitelist, which is their error, not the gateway's.
            Self::Service(e @ ServiceError::NotWritable { .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: e.to_string(),
                    fields: None,
                },
            ),
            Self::Service(e) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: e.to_string(),
                    fields: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_entity(slug: &str) -> Result<EntityKind, ApiError> {
    slug.parse()
        .map_err(|_| ApiError::NotFound(format!("unknown entity kind {slug:?}")))
}

fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    RecordId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn into_record(body: Value) -> Result<Record, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "request body must be a JSON object".into(),
        )),
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health check response", body = HealthRes))
)]
/// Health check endpoint used by monitoring and load balancers.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "HMS REST API is alive".into(),
    })
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Quick-search text, matched against the entity's search fields.
    pub search: Option<String>,
    /// Exact-match filter on the status field.
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/{entity}",
    params(("entity" = String, Path, description = "Entity slug"), ListParams),
    responses(
        (status = 200, description = "Matching records", body = Object),
        (status = 404, description = "Unknown entity kind", body = ErrorBody),
        (status = 502, description = "Record store failure", body = ErrorBody)
    )
)]
/// Lists records of one entity kind, newest first.
async fn list_records(
    State(state): State<AppState>,
    AxumPath(entity): AxumPath<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let kind = parse_entity(&entity)?;
    let mut filters = Vec::new();
    if let Some(status) = params.status.filter(|s| !s.is_empty()) {
        filters.push(Filter::equals("status", status));
    }

    let records = state
        .registry
        .service(kind)
        .list(ListQuery {
            filters,
            search: params.search,
            order: None,
            limit: params.limit,
            offset: params.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/api/{entity}",
    params(("entity" = String, Path, description = "Entity slug")),
    request_body = Object,
    responses(
        (status = 201, description = "Created record", body = Object),
        (status = 422, description = "Field-level validation failure", body = ErrorBody)
    )
)]
/// Creates a record from a partial field map; defaults and the derived
/// display name are filled in server-side.
async fn create_record(
    State(state): State<AppState>,
    AxumPath(entity): AxumPath<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let kind = parse_entity(&entity)?;
    let payload = into_record(body)?;
    let created = state.registry.service(kind).create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity slug"),
        ("id" = i64, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "The record", body = Object),
        (status = 404, description = "No such record", body = ErrorBody)
    )
)]
/// Fetches a single record by id.
async fn get_record(
    State(state): State<AppState>,
    AxumPath((entity, id)): AxumPath<(String, String)>,
) -> Result<Json<Record>, ApiError> {
    let kind = parse_entity(&entity)?;
    let id = parse_id(&id)?;
    match state.registry.service(kind).get(id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!(
            "no {} with id {id}",
            kind.descriptor().singular
        ))),
    }
}

#[utoipa::path(
    put,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity slug"),
        ("id" = i64, Path, description = "Record id")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated record", body = Object),
        (status = 422, description = "Field-level validation failure", body = ErrorBody)
    )
)]
/// Updates a record from a partial field map. Empty-string values clear
/// their fields; absent fields are left untouched.
async fn update_record(
    State(state): State<AppState>,
    AxumPath((entity, id)): AxumPath<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let kind = parse_entity(&entity)?;
    let id = parse_id(&id)?;
    let payload = into_record(body)?;
    let updated = state.registry.service(kind).update(id, payload).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity slug"),
        ("id" = i64, Path, description = "Record id")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 502, description = "Store refused the deletion", body = ErrorBody)
    )
)]
/// Deletes a record by id.
async fn delete_record(
    State(state): State<AppState>,
    AxumPath((entity, id)): AxumPath<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_entity(&entity)?;
    let id = parse_id(&id)?;
    state.registry.service(kind).remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/{entity}/{id}/fields/{field}",
    params(
        ("entity" = String, Path, description = "Entity slug"),
        ("id" = i64, Path, description = "Record id"),
        ("field" = String, Path, description = "Writable field name")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated record", body = Object),
        (status = 502, description = "Field is not writable or store refused", body = ErrorBody)
    )
)]
/// Sets a single field — the status-transition and flag-toggle endpoint
/// behind the confirm/complete/cancel/resolve buttons.
async fn set_record_field(
    State(state): State<AppState>,
    AxumPath((entity, id, field)): AxumPath<(String, String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let kind = parse_entity(&entity)?;
    let id = parse_id(&id)?;
    let updated = state
        .registry
        .service(kind)
        .set_field(id, &field, value)
        .await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use hms_core::{LogNotifier, Notify, ServiceRegistry};
    use hms_store::{MemoryStore, RecordStore};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::util::ServiceExt;

    fn test_router() -> Router {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let notifier: Arc<dyn Notify> = Arc::new(LogNotifier);
        let registry = Arc::new(ServiceRegistry::new(store, notifier, 50));
        router(AppState { registry })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_response()).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/patients")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"first_name": "Ada", "last_name": "Lovelace"}).to_string(),
                    ))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response.into_response()).await;
        assert_eq!(created["Name"], "Ada Lovelace");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/patients?search=lovelace")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response.into_response()).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn unknown_entity_is_a_404() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/wards")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn setting_a_non_writable_field_is_a_400_not_a_gateway_error() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/patients/1/fields/created_at")
                    .header("content-type", "application/json")
                    .body(Body::from(json!("2030-01-01").to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_record_is_a_404_distinct_from_store_failure() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/patients/999")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
