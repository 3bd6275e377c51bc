//! Error code contract shared by relay errors.

/// Errors reported to clients carry a stable, grepable code next to the
/// human-readable message.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

