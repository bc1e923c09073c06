//! Common error types for event-tap-platform.

use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] event_tap_core::CoreError),
    #[error("recording not found: {0}")]
    NotFound(String),
    #[error("input feed is full")]
    FeedFull,
    #[error("input feed is closed")]
    FeedClosed,
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
