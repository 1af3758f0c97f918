//! HTTP boundary: request validation and JSON response shaping.
//!
//! A thin axum layer over [`crate::process`]. The interesting error handling
//! lives below this module; here the taxonomy is simple:
//!
//! * malformed/missing request fields → 400, never retried
//! * "no dishes found" → 200 with `success: false` (a defined outcome)
//! * a panic anywhere in a handler → 500 with a uniform `{"error"}` body,
//!   detail echoed only outside production
//! * unknown routes → 404 with the same uniform body shape
//!
//! Clients are constructed once at startup, owned by [`AppState`], and shared
//! by reference into handlers; no module-level singletons.

use crate::config::ServiceConfig;
use crate::error::Menu2IngredientsError;
use crate::process::{process_ocr_text, Clients};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub clients: Clients,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(clients: Clients, config: ServiceConfig) -> Self {
        Self {
            clients,
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProcessOcrRequest {
    ocr_text: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    spoonacular_configured: bool,
    openai_configured: bool,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let production = state.config.environment.is_production();

    Router::new()
        .route("/api/process-ocr", post(process_ocr))
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| panic_response(err, production),
        ))
        .layer(TraceLayer::new_for_http())
        // CORS wide open for mobile-app clients.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<(), Menu2IngredientsError> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Menu2IngredientsError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

    info!(%addr, "menu2ingredients API listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| Menu2IngredientsError::Internal(e.to_string()))
}

async fn process_ocr(
    State(state): State<AppState>,
    payload: Result<Json<ProcessOcrRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return bad_request(&rejection.body_text());
        }
    };

    let ocr_text = request.ocr_text.trim();
    if ocr_text.is_empty() {
        return bad_request("ocr_text cannot be empty");
    }

    info!(
        preview = %ocr_text.chars().take(100).collect::<String>(),
        "processing OCR text"
    );

    let output = process_ocr_text(&state.clients, ocr_text).await;
    (StatusCode::OK, Json(output)).into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "healthy",
        message: "OCR Processing API is running",
        spoonacular_configured: state.config.spoonacular_api_key.is_some(),
        openai_configured: state.config.openai_api_key.is_some(),
    })
    .into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Uniform 500 body for handler panics. Detail is suppressed in production.
fn panic_response(err: Box<dyn Any + Send + 'static>, production: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(detail = %detail, "request handler panicked");

    let body = if production {
        json!({ "error": "Internal server error" })
    } else {
        json!({ "error": "Internal server error", "details": detail })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
