//! Collection-level seam between records and the document store

use async_trait::async_trait;
use bson::Document as BsonDocument;

use crate::cursor::Cursor;
use crate::Result;

/// Outcome of a write the server accepted or rejected.
///
/// Transport and protocol failures are returned as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Success,
    Failed(String),
}

impl WriteStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteStatus::Success)
    }
}

impl std::fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStatus::Success => write!(f, "success"),
            WriteStatus::Failed(status) => write!(f, "{}", status),
        }
    }
}

/// An open handle on one collection
#[async_trait]
pub trait CollectionDriver: Send + Sync {
    /// Find documents matching `filter` within the cursor's window
    async fn find(&self, filter: BsonDocument, window: &Cursor) -> Result<Vec<BsonDocument>>;

    /// Upsert a document by its `_id`, inserting when it has none
    async fn save(&self, document: BsonDocument) -> Result<WriteStatus>;

    /// Remove every document matching `filter`
    async fn remove(&self, filter: BsonDocument) -> Result<WriteStatus>;

    /// Release the handle. The record drops it right after.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Something that can open collection handles
#[async_trait]
pub trait Backend: Send + Sync {
    type Collection: CollectionDriver;

    /// Database used when a record does not name one
    fn default_database(&self) -> &str;

    /// Open a handle on `collection` in `database`
    async fn open_collection(&self, database: &str, collection: &str) -> Result<Self::Collection>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_status_display() {
        assert_eq!(WriteStatus::Success.to_string(), "success");
        assert_eq!(
            WriteStatus::Failed("E11000 duplicate key".to_string()).to_string(),
            "E11000 duplicate key"
        );
    }

    #[test]
    fn test_write_status_is_success() {
        assert!(WriteStatus::Success.is_success());
        assert!(!WriteStatus::Failed("x".to_string()).is_success());
    }
}
