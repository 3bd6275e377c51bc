//! `GET /api/content/{key}`: one stored record by country or page key.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::services::content::ContentError;
use crate::state::AppState;

pub async fn get_content(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.content.read(&key).await {
        Ok(record) => Json(record).into_response(),
        Err(ContentError::NotFound(_) | ContentError::InvalidKey(_)) => {
            debug!(%key, "content: miss");
            (StatusCode::NOT_FOUND, Json(json!({"error": "Content not found", "requested": key}))).into_response()
        }
        Err(e) => {
            warn!(%key, error = %e, code = e.error_code(), "content: read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string(), "code": e.error_code()})))
                .into_response()
        }
    }
}
