//! Read-only JSON content store.
//!
//! Records live as `<dir>/<key>.json`. Lookup keys arrive in whatever form
//! the ingestion flow uses ("South Africa", "southAfrica", "south-africa")
//! and are normalised to snake case before touching the filesystem.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use std::path::PathBuf;

use serde_json::Value;

use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no content for {0}")]
    NotFound(String),
    #[error("invalid content key: {0}")]
    InvalidKey(String),
    #[error("content read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("content is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for ContentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CONTENT_NOT_FOUND",
            Self::InvalidKey(_) => "E_INVALID_KEY",
            Self::Io(_) => "E_IO",
            Self::Json(_) => "E_INVALID_JSON",
        }
    }
}

/// Normalise a lookup key: runs of whitespace and dashes become `_`, a
/// lower-case letter or digit followed by an upper-case letter is split with
/// `_`, and the result is lower-cased.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut in_separator = false;
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                out.push('_');
                in_separator = true;
            }
            prev = Some(c);
            continue;
        }
        in_separator = false;
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the record for `raw_key`.
    ///
    /// # Errors
    ///
    /// [`ContentError::InvalidKey`] for keys that could escape the content
    /// directory, [`ContentError::NotFound`] when no file exists, and
    /// [`ContentError::Io`] / [`ContentError::Json`] for unreadable records.
    pub async fn read(&self, raw_key: &str) -> Result<Value, ContentError> {
        let key = normalize_key(raw_key);
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(ContentError::InvalidKey(raw_key.to_owned()));
        }

        let path = self.dir.join(format!("{key}.json"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound(raw_key.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
