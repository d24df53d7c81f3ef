//! HTTP surface.
//!
//! - `POST /api/extract`: extract sections from `{ title?, summary?, body? }`
//! - `GET /api/categories`: the active category configuration
//! - `GET /health`
//!
//! Anything else falls through to the static asset directory when one is configured.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use medex_common::api::{CategoryListResponse, ErrorResponse, ExtractParams};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, warn};

use crate::assist::ModelError;
use crate::service::{to_document, ExtractionService};

pub fn router(service: ExtractionService, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api/extract", post(extract))
        .route("/api/categories", get(categories))
        .route("/health", get(health))
        .with_state(Arc::new(service));

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            // Path only: request bodies carry clinical text.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}

async fn extract(
    State(service): State<Arc<ExtractionService>>,
    Json(params): Json<ExtractParams>,
) -> Response {
    let document = to_document(params);
    match service.extract(&document).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!(error = %e, "model extraction failed");
            let status = match e {
                ModelError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ModelError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            };
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

async fn categories(State(service): State<Arc<ExtractionService>>) -> Json<CategoryListResponse> {
    Json(service.categories())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "NLP processing failed.".to_string(),
        }),
    )
        .into_response()
}
