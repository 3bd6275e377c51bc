//! Event envelope shared by the relay, display clients, and the controller.
//!
//! This crate owns the wire representation of every message on the kiosk
//! channel. On the wire an [`Envelope`] is a flat JSON object
//! `{kind, namespace?, payload?, error?}`. Internally every envelope is
//! decoded once, at the boundary, into the typed [`Event`] union so nothing
//! downstream branches on ad hoc optional fields.

pub mod control;

pub use control::{ControlCode, Direction, Letter, Page};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// KINDS
// =============================================================================

/// Envelope `kind` tags.
pub mod kind {
    pub const CONNECTED: &str = "connected";
    pub const SUBSCRIBE: &str = "subscribe";
    pub const REQUEST_DATA: &str = "request-data";
    pub const DATA: &str = "data";
    pub const LOADING: &str = "loading";
    pub const CONTROL: &str = "control";
    pub const COORDINATES_PENDING: &str = "coordinates-pending";
    pub const COORDINATES_STABLE: &str = "coordinates-stable";
    pub const START: &str = "start";
    pub const ERROR: &str = "error";
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned by [`decode`] and by `Event::try_from(Envelope)`.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a JSON envelope.
    #[error("invalid envelope json: {0}")]
    Json(#[from] serde_json::Error),
    /// The `kind` tag is not part of the protocol.
    #[error("unknown event kind: {0}")]
    UnknownKind(String),
    /// A field required by the given kind is absent or has the wrong type.
    #[error("`{kind}` envelope missing field `{field}`")]
    MissingField { kind: &'static str, field: &'static str },
}

impl CodecError {
    /// Grepable code used when the relay reports the error back to a sender.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E_INVALID_JSON",
            Self::UnknownKind(_) => "E_UNKNOWN_KIND",
            Self::MissingField { .. } => "E_MISSING_FIELD",
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// A single message on the wire. Absent `namespace` means broadcast-to-all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Globe position reported by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    /// Older controller firmware reports this as `long`.
    #[serde(alias = "long")]
    pub lon: f64,
}

/// Result carried by a `data` event. An error always wins over a payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Payload(Value),
    Error(Value),
}

/// Typed view of an [`Envelope`], one variant per kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Relay → client greeting carrying the assigned connection id.
    Connected { connection_id: String },
    /// Display → relay: join the group for `namespace`.
    Subscribe { namespace: String },
    /// Relay → producers: push content for `namespace`.
    RequestData { namespace: String },
    Data { namespace: Option<String>, content: Content },
    Loading { namespace: Option<String> },
    /// Raw control code; see [`ControlCode::parse`].
    Control { action: String },
    CoordinatesPending(Coordinates),
    CoordinatesStable(Coordinates),
    Start { start: bool },
    /// Relay → sender report for an envelope it could not use.
    Error { code: String, message: String },
}

impl Event {
    /// Wire `kind` tag for this event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => kind::CONNECTED,
            Self::Subscribe { .. } => kind::SUBSCRIBE,
            Self::RequestData { .. } => kind::REQUEST_DATA,
            Self::Data { .. } => kind::DATA,
            Self::Loading { .. } => kind::LOADING,
            Self::Control { .. } => kind::CONTROL,
            Self::CoordinatesPending(_) => kind::COORDINATES_PENDING,
            Self::CoordinatesStable(_) => kind::COORDINATES_STABLE,
            Self::Start { .. } => kind::START,
            Self::Error { .. } => kind::ERROR,
        }
    }

    /// Namespace this event is addressed to, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Subscribe { namespace } | Self::RequestData { namespace } => Some(namespace),
            Self::Data { namespace, .. } | Self::Loading { namespace } => namespace.as_deref(),
            _ => None,
        }
    }

    /// Convenience constructor for a successful `data` event.
    #[must_use]
    pub fn data(namespace: impl Into<String>, payload: Value) -> Self {
        Self::Data { namespace: Some(namespace.into()), content: Content::Payload(payload) }
    }

    /// Convenience constructor for a `data` event carrying an error.
    #[must_use]
    pub fn data_error(namespace: impl Into<String>, error: Value) -> Self {
        Self::Data { namespace: Some(namespace.into()), content: Content::Error(error) }
    }

    #[must_use]
    pub fn control(code: &ControlCode) -> Self {
        Self::Control { action: code.as_str().to_owned() }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<&Event> for Envelope {
    fn from(event: &Event) -> Self {
        let mut envelope = Envelope { kind: event.kind().to_owned(), ..Envelope::default() };
        match event {
            Event::Connected { connection_id } => {
                envelope.payload = Some(single("connectionId", Value::String(connection_id.clone())));
            }
            Event::Subscribe { namespace } | Event::RequestData { namespace } => {
                envelope.namespace = Some(namespace.clone());
            }
            Event::Data { namespace, content } => {
                envelope.namespace.clone_from(namespace);
                match content {
                    Content::Payload(payload) => envelope.payload = Some(payload.clone()),
                    Content::Error(error) => envelope.error = Some(error.clone()),
                }
            }
            Event::Loading { namespace } => envelope.namespace.clone_from(namespace),
            Event::Control { action } => {
                envelope.payload = Some(single("action", Value::String(action.clone())));
            }
            Event::CoordinatesPending(coords) | Event::CoordinatesStable(coords) => {
                envelope.payload = serde_json::to_value(coords).ok();
            }
            Event::Start { start } => envelope.payload = Some(single("start", Value::Bool(*start))),
            Event::Error { code, message } => {
                let mut map = Map::new();
                map.insert("code".into(), Value::String(code.clone()));
                map.insert("message".into(), Value::String(message.clone()));
                envelope.payload = Some(Value::Object(map));
            }
        }
        envelope
    }
}

impl TryFrom<Envelope> for Event {
    type Error = CodecError;

    fn try_from(envelope: Envelope) -> Result<Self, CodecError> {
        let Envelope { kind, namespace, payload, error } = envelope;
        match kind.as_str() {
            kind::CONNECTED => {
                let connection_id = payload_str(payload.as_ref(), "connectionId")
                    .ok_or(CodecError::MissingField { kind: kind::CONNECTED, field: "connectionId" })?;
                Ok(Self::Connected { connection_id })
            }
            kind::SUBSCRIBE => {
                let namespace = namespace
                    .or_else(|| payload_str(payload.as_ref(), "namespace"))
                    .ok_or(CodecError::MissingField { kind: kind::SUBSCRIBE, field: "namespace" })?;
                Ok(Self::Subscribe { namespace })
            }
            kind::REQUEST_DATA => {
                let namespace = namespace
                    .or_else(|| payload_str(payload.as_ref(), "namespace"))
                    .ok_or(CodecError::MissingField { kind: kind::REQUEST_DATA, field: "namespace" })?;
                Ok(Self::RequestData { namespace })
            }
            kind::DATA => decode_data(namespace, payload, error),
            kind::LOADING => Ok(Self::Loading { namespace }),
            kind::CONTROL => {
                let action = payload_str(payload.as_ref(), "action")
                    .ok_or(CodecError::MissingField { kind: kind::CONTROL, field: "action" })?;
                Ok(Self::Control { action })
            }
            kind::COORDINATES_PENDING => Ok(Self::CoordinatesPending(decode_coordinates(
                kind::COORDINATES_PENDING,
                payload,
            )?)),
            kind::COORDINATES_STABLE => Ok(Self::CoordinatesStable(decode_coordinates(
                kind::COORDINATES_STABLE,
                payload,
            )?)),
            kind::START => {
                let start = payload
                    .as_ref()
                    .and_then(|p| p.get("start"))
                    .and_then(Value::as_bool)
                    .ok_or(CodecError::MissingField { kind: kind::START, field: "start" })?;
                Ok(Self::Start { start })
            }
            kind::ERROR => Ok(Self::Error {
                code: payload_str(payload.as_ref(), "code").unwrap_or_default(),
                message: payload_str(payload.as_ref(), "message").unwrap_or_default(),
            }),
            _ => Err(CodecError::UnknownKind(kind)),
        }
    }
}

/// `data` envelopes: an error wins over a payload, and a payload flagged
/// `"loading": true` is a loading announcement rather than content. Older
/// ingestion flows name the namespace in `payload.type` instead of the
/// envelope.
fn decode_data(namespace: Option<String>, payload: Option<Value>, error: Option<Value>) -> Result<Event, CodecError> {
    let namespace = namespace.or_else(|| payload_str(payload.as_ref(), "type"));

    if let Some(error) = error.filter(|e| !e.is_null()) {
        return Ok(Event::Data { namespace, content: Content::Error(error) });
    }

    let Some(payload) = payload.filter(|p| !p.is_null()) else {
        return Err(CodecError::MissingField { kind: kind::DATA, field: "payload" });
    };

    if payload.get("loading").and_then(Value::as_bool) == Some(true) {
        return Ok(Event::Loading { namespace });
    }

    Ok(Event::Data { namespace, content: Content::Payload(payload) })
}

fn decode_coordinates(kind: &'static str, payload: Option<Value>) -> Result<Coordinates, CodecError> {
    let payload = payload.ok_or(CodecError::MissingField { kind, field: "payload" })?;
    let lat = payload
        .get("lat")
        .and_then(Value::as_f64)
        .ok_or(CodecError::MissingField { kind, field: "lat" })?;
    let lon = payload
        .get("lon")
        .or_else(|| payload.get("long"))
        .and_then(Value::as_f64)
        .ok_or(CodecError::MissingField { kind, field: "lon" })?;
    Ok(Coordinates { lat, lon })
}

fn payload_str(payload: Option<&Value>, key: &str) -> Option<String> {
    payload
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode an event as envelope JSON text.
#[must_use]
pub fn encode(event: &Event) -> String {
    // Serializing a struct of strings and `Value`s cannot fail.
    serde_json::to_string(&Envelope::from(event)).unwrap_or_default()
}

/// Decode envelope JSON text into a typed event.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for text that is not an envelope,
/// [`CodecError::UnknownKind`] for unrecognised tags, and
/// [`CodecError::MissingField`] when the kind's required fields are absent.
pub fn decode(text: &str) -> Result<Event, CodecError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    Event::try_from(envelope)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
