//! Error type shared by every overload_core operation.
//!
//! The progression engine itself never fails; errors come from persistence
//! or from editing the plan.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the CLI
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Rotation state or WAL line
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Config file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rotation operation that cannot be applied to the current plan
    #[error("Rotation error: {0}")]
    Rotation(String),

    /// A day or exercise that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
