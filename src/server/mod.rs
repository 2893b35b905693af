//! HTTP server for the creature catalog
//!
//! Exposes the coordinator over a small REST API.
//!
//! # Routes
//!
//! - `GET /health` - Liveness check
//! - `GET /pokemon` - List every creature (cached)
//! - `POST /pokemon` - Create a creature
//! - `POST /pokemon/initialize` - Clear the catalog and re-seed it
//! - `GET /pokemon/{id}` - Fetch one creature
//! - `PUT /pokemon/{id}` - Partially update a creature
//! - `DELETE /pokemon/{id}` - Delete a creature
//!
//! Bodies use camelCase keys: `{"name": ..., "types": [...], "imageUrl": ...}`.

use crate::catalog::{
    validate_new, validate_patch, CatalogCoordinator, CreaturePatch, NewCreature, ValidationError,
};
use crate::CatalogError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared server state
struct AppState {
    catalog: Arc<CatalogCoordinator>,
}

/// HTTP server for the catalog
pub struct CatalogServer {
    state: Arc<AppState>,
}

impl CatalogServer {
    pub fn new(catalog: Arc<CatalogCoordinator>) -> Self {
        Self {
            state: Arc::new(AppState { catalog }),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Self::build_router(self.state.clone())
    }

    fn build_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/pokemon", get(list_creatures).post(create_creature))
            .route("/pokemon/initialize", post(reinitialize))
            .route(
                "/pokemon/{id}",
                get(get_creature).put(update_creature).delete(delete_creature),
            )
            .with_state(state)
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> crate::Result<()> {
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(addr = addr, "Catalog server listening");

        axum::serve(listener, Self::build_router(self.state)).await?;
        Ok(())
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details: Vec::new(),
        }),
    )
}

impl From<CatalogError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err.to_string()),
            CatalogError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    details,
                }),
            ),
            other => {
                tracing::error!(error = %other, "Request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid ID format: {}", raw),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_creatures(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_all().await?))
}

async fn get_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.get(id).await?))
}

async fn create_creature(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreaturePatch>,
) -> Result<impl IntoResponse, ApiError> {
    // Missing fields arrive as empty values so they are reported per field
    let input = NewCreature {
        name: body.name.unwrap_or_default(),
        types: body.types.unwrap_or_default(),
        image_url: body.image_url.unwrap_or_default(),
    };
    validate_new(&input).map_err(CatalogError::Validation)?;

    let created = state.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<CreaturePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    validate_patch(&patch).map_err(CatalogError::Validation)?;

    Ok(Json(state.catalog.update(id, patch).await?))
}

async fn delete_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.delete(id).await?))
}

async fn reinitialize(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let ack = state.catalog.reinitialize().await.map_err(|e| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to reinitialize Pokemon data: {}", e),
        )
    })?;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::IngestConfig;
    use crate::ingest::{CreatureDetail, CreatureSummary, IngestionSource, SourceError};
    use crate::storage::SqliteStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct StaticSource {
        fail: bool,
    }

    #[async_trait]
    impl IngestionSource for StaticSource {
        async fn list_summaries(&self, _limit: u32) -> Result<Vec<CreatureSummary>, SourceError> {
            if self.fail {
                return Err(SourceError::Timeout);
            }
            Ok(vec![CreatureSummary::new("eevee", "133")])
        }

        async fn fetch_detail(&self, _url: &str) -> Result<CreatureDetail, SourceError> {
            Ok(CreatureDetail {
                types: vec!["normal".to_string()],
                image_url: Some("https://img.example/133.png".to_string()),
            })
        }
    }

    fn create_test_server(fail_source: bool) -> CatalogServer {
        let catalog = CatalogCoordinator::new(
            Arc::new(SqliteStore::in_memory().unwrap()),
            Arc::new(MemoryCache::default()),
            Arc::new(StaticSource { fail: fail_source }),
            IngestConfig::default(),
        );
        CatalogServer::new(Arc::new(catalog))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_server(false).router();

        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let server = create_test_server(false);

        let body = serde_json::json!({
            "name": "pikachu",
            "types": ["electric"],
            "imageUrl": "https://img.example/25.png"
        });
        let response = server
            .router()
            .oneshot(json_request("POST", "/pokemon", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["id"], 1);

        let response = server
            .router()
            .oneshot(empty_request("GET", "/pokemon/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "pikachu");
        assert_eq!(fetched["imageUrl"], "https://img.example/25.png");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let app = create_test_server(false).router();

        let body = serde_json::json!({ "name": "", "types": [], "imageUrl": "not a url" });
        let response = app
            .oneshot(json_request("POST", "/pokemon", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        let fields: Vec<_> = error["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"types".to_string()));
        assert!(fields.contains(&"imageUrl".to_string()));
    }

    #[tokio::test]
    async fn test_missing_id_is_404() {
        let server = create_test_server(false);

        let response = server
            .router()
            .oneshot(empty_request("GET", "/pokemon/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Pokemon with ID 42 not found"
        );

        let response = server
            .router()
            .oneshot(empty_request("DELETE", "/pokemon/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = server
            .router()
            .oneshot(json_request(
                "PUT",
                "/pokemon/42",
                serde_json::json!({ "name": "mew" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_integer_id_is_400() {
        let app = create_test_server(false).router();

        let response = app
            .oneshot(empty_request("GET", "/pokemon/pikachu"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = create_test_server(false);
        let body = serde_json::json!({
            "name": "charmander",
            "types": ["fire"],
            "imageUrl": "https://img.example/4.png"
        });
        server
            .router()
            .oneshot(json_request("POST", "/pokemon", body))
            .await
            .unwrap();

        let response = server
            .router()
            .oneshot(json_request(
                "PUT",
                "/pokemon/1",
                serde_json::json!({ "name": "charmeleon" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["name"], "charmeleon");
        assert_eq!(updated["types"][0], "fire");

        let response = server
            .router()
            .oneshot(empty_request("DELETE", "/pokemon/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Pokemon 1 successfully deleted"
        );

        let response = server
            .router()
            .oneshot(empty_request("GET", "/pokemon"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_initialize_endpoint() {
        let response = create_test_server(false)
            .router()
            .oneshot(empty_request("POST", "/pokemon/initialize"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ingested"], 1);

        let response = create_test_server(true)
            .router()
            .oneshot(empty_request("POST", "/pokemon/initialize"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
