use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors reported by a [`DocumentStore`] write or read.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The SQLite backend failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed while opening the store
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// A document body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store refused the write (e.g. injected failure, invalid key)
    #[error("Write rejected for key '{key}': {reason}")]
    Rejected { key: String, reason: String },
}

// ============================================================================
// Store Interface
// ============================================================================

/// Key-value document store with overwrite-by-key writes.
///
/// Implementations must make `put` a full replacement: after it returns
/// `Ok`, the document at `(collection, key)` is exactly `body`, regardless
/// of what was stored there before. Single-document overwrite is the only
/// atomicity guarantee required.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates or fully replaces the document at `(collection, key)`.
    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), StoreError>;

    /// Reads the document at `(collection, key)`, if any.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Number of documents in `collection`.
    async fn count(&self, collection: &str) -> Result<usize, StoreError>;
}
