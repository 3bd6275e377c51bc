//! `POST /api/coordinates`: globe position pushed over HTTP by the
//! controller board.
//!
//! Field checks run before the token check, so a caller learns about a
//! malformed body even with a bad token. A successful ingest is relayed as
//! stable coordinates, which resets the start flag.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frames::Coordinates;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::state::AppState;

/// Fields stay untyped so a wrong type is answered with the same JSON
/// `{message}` shape as a missing field.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    lat: Option<Value>,
    #[serde(alias = "long")]
    lon: Option<Value>,
    token: Option<Value>,
}

enum Field {
    Missing,
    Invalid,
    Number(f64),
}

pub async fn receive_coordinates(State(state): State<AppState>, Json(body): Json<IngestBody>) -> Response {
    let lat = match field(body.lat.as_ref()) {
        Field::Number(lat) => lat,
        Field::Missing => return reject(StatusCode::BAD_REQUEST, "Latitude is not provided"),
        Field::Invalid => return reject(StatusCode::BAD_REQUEST, "Latitude is not a number"),
    };
    let lon = match field(body.lon.as_ref()) {
        Field::Number(lon) => lon,
        Field::Missing => return reject(StatusCode::BAD_REQUEST, "Longitude is not provided"),
        Field::Invalid => return reject(StatusCode::BAD_REQUEST, "Longitude is not a number"),
    };

    let given = body.token.as_ref().and_then(Value::as_str);
    let authorized = matches!(
        (state.config.ingest_token.as_deref(), given),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        warn!("ingest: token mismatch");
        return reject(StatusCode::FORBIDDEN, "Permission denied");
    }

    let delivery = state.relay.lock().await.stable(Coordinates { lat, lon }, None);
    info!(lat, lon, delivered = delivery.delivered, "ingest: coordinates received");
    Json(json!({"message": "Coordinates received", "lat": lat, "lon": lon})).into_response()
}

/// A coordinate sent as a JSON number or a numeric string. `null` counts
/// as missing.
fn field(value: Option<&Value>) -> Field {
    let parsed = match value {
        None | Some(Value::Null) => return Field::Missing,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    parsed.filter(|n| n.is_finite()).map_or(Field::Invalid, Field::Number)
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}
