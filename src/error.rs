use thiserror::Error;

/// Application-wide error type
///
/// The layout subsystem itself never fails; these variants cover the
/// surrounding surface (configuration files, JSON payloads, CLI input).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, AppError>;
