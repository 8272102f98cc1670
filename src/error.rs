//! Lorekeeper error types

use thiserror::Error;

/// Lorekeeper error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stats snapshot is missing or carries an unusable field
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A read against the lore store failed
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Lorekeeper operations
pub type Result<T> = std::result::Result<T, Error>;
