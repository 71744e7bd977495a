//! Error types for docstorm

use thiserror::Error;

/// Result type alias for docstorm operations
pub type Result<T> = std::result::Result<T, StormError>;

/// Unified error type for all docstorm operations
#[derive(Error, Debug, Clone)]
pub enum StormError {
    /// A delete was attempted on a record whose identifier is empty
    #[error("No id specified")]
    MissingId,

    /// The driver answered a write with a non-success status
    #[error("MongoDB {operation} error: {status}")]
    WriteFailed {
        operation: &'static str,
        status: String,
    },

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl StormError {
    /// Builds a `WriteFailed` error for the given operation ("Save", "Delete")
    pub fn write_failed(operation: &'static str, status: impl Into<String>) -> Self {
        StormError::WriteFailed {
            operation,
            status: status.into(),
        }
    }

    /// Returns true if the error was raised by this crate rather than passed
    /// through from the driver
    pub fn is_mapping_error(&self) -> bool {
        matches!(self, StormError::MissingId | StormError::WriteFailed { .. })
    }
}

impl From<serde_json::Error> for StormError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            StormError::Deserialization(err.to_string())
        } else {
            StormError::Serialization(err.to_string())
        }
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for StormError {
    fn from(err: mongodb::error::Error) -> Self {
        StormError::MongoDB(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for StormError {
    fn from(err: bson::ser::Error) -> Self {
        StormError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for StormError {
    fn from(err: bson::de::Error) -> Self {
        StormError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::oid::Error> for StormError {
    fn from(err: bson::oid::Error) -> Self {
        StormError::Validation(format!("Invalid ObjectId: {}", err))
    }
}
