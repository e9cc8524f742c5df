use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Most ids a single `batch_get_by_ids` call accepts.
pub const MAX_BATCH_SIZE: usize = 10;

/// Most values a single in-set filter accepts.
pub const MAX_IN_FILTER: usize = 10;

/// A persisted record as the store hands it back: server-assigned id,
/// JSON payload, server-stamped timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals the given value.
    FieldEq(String, Value),
    /// Field is one of the given values. At most `MAX_IN_FILTER` values.
    FieldIn(String, Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("Concurrent write on {collection}/{id}")]
    Conflict { collection: String, id: String },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Batch of {got} ids exceeds the limit of {max}")]
    BatchTooLarge { got: usize, max: usize },
    #[error("Malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Persistence seam over the external document database. Implementations must
/// stamp `created_at`/`updated_at` server-side; the update timestamp is the
/// only concurrency token callers rely on.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new record and return its server-assigned id.
    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// Partial update. `fields` must be a JSON object; a null value removes
    /// that field. When `expected_updated_at` is given, the patch applies only
    /// while the stored timestamp still matches, otherwise `Conflict`.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Hard delete. No tombstone is kept; deleting an absent document is a
    /// no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// The envelope timestamps are addressable in `order_by` as `createdAt`
    /// and `updatedAt`.
    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch the given ids in one round trip. Ids that no longer exist are
    /// skipped, not errors. At most `MAX_BATCH_SIZE` ids per call.
    async fn batch_get_by_ids(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Document>, StoreError>;
}
