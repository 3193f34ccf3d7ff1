//! Error types for TraceVeil Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid pattern in rule '{rule}': {reason}")]
    InvalidPattern { rule: String, reason: String },

    #[error("Invalid category key: {0}")]
    InvalidCategory(String),

    #[error("No preset resolved for product '{0}' and no default configured")]
    NoPresetResolved(String),

    #[error("Unknown rule referenced by preset '{preset}': {rule_id}")]
    UnknownRule { preset: String, rule_id: String },

    #[error("Masked value collision in category '{category}': '{masked}' already maps a different original")]
    HashCollision { category: String, masked: String },

    #[error("Cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration not found")]
    ConfigNotFound,

    // Mapping store errors
    #[error("Mapping store error: {0}")]
    MappingStore(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
