//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router carries the kiosk websocket channel plus the small HTTP
//! surface around it: content lookup, coordinate ingest, and namespace
//! status for operators.

pub mod content;
pub mod coordinates;
pub mod ws;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::choreography::NamespaceStatus;
use crate::services::relay::RelaySummary;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/content/{key}", get(content::get_content))
        .route("/api/coordinates", post(coordinates::receive_coordinates))
        .route("/api/namespaces", get(namespaces))
        .route("/api/status", get(status))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn namespaces(State(state): State<AppState>) -> Json<Vec<NamespaceStatus>> {
    Json(state.relay.lock().await.status())
}

async fn status(State(state): State<AppState>) -> Json<RelaySummary> {
    Json(state.relay.lock().await.summary())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
