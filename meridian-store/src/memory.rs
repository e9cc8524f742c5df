//! In-memory document store used by tests and local development. Mirrors the
//! behaviour this workspace relies on from the hosted document database:
//! server-assigned ids, server-stamped timestamps, partial updates with
//! null-deletes-field, and the 10-id caps on batch reads and in-set filters.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use meridian_core::gateway::{
    Document, DocumentStore, Filter, OrderBy, SortDirection, StoreError, MAX_BATCH_SIZE,
    MAX_IN_FILTER,
};

pub struct InMemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_key(doc: &Document, field: &str) -> Value {
    // The envelope timestamps are addressable like data fields.
    match field {
        "createdAt" => Value::String(doc.created_at.to_rfc3339()),
        "updatedAt" => Value::String(doc.updated_at.to_rfc3339()),
        _ => doc.data.get(field).cloned().unwrap_or(Value::Null),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        if !data.is_object() {
            return Err(StoreError::Malformed {
                collection: collection.to_string(),
                id: "(new)".to_string(),
                reason: "payload must be a JSON object".to_string(),
            });
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let document = Document {
            id: id.clone(),
            data,
            created_at: now,
            updated_at: now,
        };

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);

        debug!("Created {}/{}", collection, id);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
        expected_updated_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let patch = match fields.as_object() {
            Some(map) => map.clone(),
            None => {
                return Err(StoreError::Malformed {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    reason: "patch payload must be a JSON object".to_string(),
                })
            }
        };

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let Some(expected) = expected_updated_at {
            if document.updated_at != expected {
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
        }

        let data = document.data.as_object_mut().ok_or_else(|| StoreError::Malformed {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: "stored payload is not a JSON object".to_string(),
        })?;
        for (key, value) in patch {
            if value.is_null() {
                data.remove(&key);
            } else {
                data.insert(key, value);
            }
        }

        // Update timestamps must strictly increase per document.
        let now = Utc::now();
        document.updated_at = if now > document.updated_at {
            now
        } else {
            document.updated_at + Duration::milliseconds(1)
        };

        debug!("Patched {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        debug!("Deleted {}/{}", collection, id);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        if let Some(Filter::FieldIn(_, values)) = &filter {
            if values.len() > MAX_IN_FILTER {
                return Err(StoreError::BatchTooLarge {
                    got: values.len(),
                    max: MAX_IN_FILTER,
                });
            }
        }

        let collections = self.collections.read().await;
        let mut results: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();

        if let Some(filter) = &filter {
            results.retain(|doc| match filter {
                Filter::FieldEq(field, value) => doc.data.get(field) == Some(value),
                Filter::FieldIn(field, values) => doc
                    .data
                    .get(field)
                    .map_or(false, |actual| values.contains(actual)),
            });
        }

        if let Some(order) = &order_by {
            results.sort_by(|a, b| {
                let ordering = compare_values(&sort_key(a, &order.field), &sort_key(b, &order.field));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn batch_get_by_ids(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Document>, StoreError> {
        if ids.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge {
                got: ids.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        Ok(ids.iter().filter_map(|id| docs.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryStore::new();
        let id = store
            .create("bookings", json!({"status": "pending", "customerName": "Amara"}))
            .await
            .unwrap();

        let doc = store.get("bookings", &id).await.unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.data["status"], "pending");
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_non_object_payload() {
        let store = InMemoryStore::new();
        let err = store.create("bookings", json!("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn patch_merges_fields_and_null_removes() {
        let store = InMemoryStore::new();
        let id = store
            .create("bookings", json!({"status": "pending", "alternativeOffer": "old"}))
            .await
            .unwrap();

        store
            .patch(
                "bookings",
                &id,
                json!({"status": "cancelled", "adminNotes": "no stock", "alternativeOffer": null}),
                None,
            )
            .await
            .unwrap();

        let doc = store.get("bookings", &id).await.unwrap();
        assert_eq!(doc.data["status"], "cancelled");
        assert_eq!(doc.data["adminNotes"], "no stock");
        assert!(doc.data.get("alternativeOffer").is_none());
    }

    #[tokio::test]
    async fn patch_bumps_updated_at_strictly() {
        let store = InMemoryStore::new();
        let id = store.create("bookings", json!({"n": 0})).await.unwrap();
        let created = store.get("bookings", &id).await.unwrap().updated_at;

        store.patch("bookings", &id, json!({"n": 1}), None).await.unwrap();
        let first = store.get("bookings", &id).await.unwrap().updated_at;
        store.patch("bookings", &id, json!({"n": 2}), None).await.unwrap();
        let second = store.get("bookings", &id).await.unwrap().updated_at;

        assert!(first > created);
        assert!(second > first);
    }

    #[tokio::test]
    async fn stale_timestamp_is_rejected_with_conflict() {
        let store = InMemoryStore::new();
        let id = store.create("bookings", json!({"status": "pending"})).await.unwrap();
        let stale = store.get("bookings", &id).await.unwrap().updated_at;

        store
            .patch("bookings", &id, json!({"status": "confirmed"}), Some(stale))
            .await
            .unwrap();

        let err = store
            .patch("bookings", &id, json!({"status": "cancelled"}), Some(stale))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let doc = store.get("bookings", &id).await.unwrap();
        assert_eq!(doc.data["status"], "confirmed");
    }

    #[tokio::test]
    async fn patch_on_missing_document_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .patch("bookings", "ghost", json!({"status": "cancelled"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();
        let id = store.create("reviews", json!({"rating": 4})).await.unwrap();

        store.delete("reviews", &id).await.unwrap();
        store.delete("reviews", &id).await.unwrap();

        let err = store.get("reviews", &id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = InMemoryStore::new();
        store
            .create("bookings", json!({"status": "pending", "customerName": "A"}))
            .await
            .unwrap();
        store
            .create("bookings", json!({"status": "confirmed", "customerName": "B"}))
            .await
            .unwrap();
        store
            .create("bookings", json!({"status": "pending", "customerName": "C"}))
            .await
            .unwrap();

        let pending = store
            .query(
                "bookings",
                Some(Filter::FieldEq("status".to_string(), json!("pending"))),
                Some(OrderBy::desc("createdAt")),
                None,
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        // Newest first
        assert_eq!(pending[0].data["customerName"], "C");

        let limited = store
            .query("bookings", None, Some(OrderBy::asc("createdAt")), Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].data["customerName"], "A");
    }

    #[tokio::test]
    async fn oversized_in_filter_is_rejected() {
        let store = InMemoryStore::new();
        let values: Vec<Value> = (0..11).map(|i| json!(format!("v-{}", i))).collect();

        let err = store
            .query(
                "reviews",
                Some(Filter::FieldIn("vehicleId".to_string(), values)),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge { got: 11, max: 10 }));
    }

    #[tokio::test]
    async fn batch_get_caps_at_ten_and_skips_missing() {
        let store = InMemoryStore::new();
        let id = store.create("vehicles", json!({"ownerId": "o-1"})).await.unwrap();

        let too_many: Vec<String> = (0..11).map(|i| format!("id-{}", i)).collect();
        let err = store.batch_get_by_ids("vehicles", &too_many).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge { got: 11, max: 10 }));

        let found = store
            .batch_get_by_ids("vehicles", &[id.clone(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }
}
