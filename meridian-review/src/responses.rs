use std::sync::Arc;

use chrono::Utc;
use meridian_core::cache::RecordCache;
use meridian_core::gateway::{DocumentStore, Filter, OrderBy, StoreError, MAX_IN_FILTER};
use meridian_core::identity::ActorContext;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::moderation::ModerationError;
use crate::models::Review;

/// Owner-side review handling: replying to reviews of the owner's resources.
/// Responses never touch the moderation verdict or visibility.
pub struct ResponseHandler {
    store: Arc<dyn DocumentStore>,
    cache: RecordCache<Review>,
    reviews_collection: String,
    resources_collection: String,
}

impl ResponseHandler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        reviews_collection: impl Into<String>,
        resources_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache: RecordCache::new(),
            reviews_collection: reviews_collection.into(),
            resources_collection: resources_collection.into(),
        }
    }

    /// Write or replace the owner's reply. Allowed whatever the moderation
    /// status; a second call edits the reply rather than threading.
    pub async fn respond(
        &self,
        review: &Review,
        comment_text: &str,
        actor: &ActorContext,
    ) -> Result<Review, ModerationError> {
        let comment = comment_text.trim();
        if comment.is_empty() {
            return Err(ModerationError::ValidationFailed(
                "response text must not be empty".to_string(),
            ));
        }

        let fields = json!({
            "ownerResponse": {
                "comment": comment,
                "respondedAt": Utc::now(),
            }
        });
        let updated = self.apply(review, fields).await?;
        info!("Review {} answered by owner {}", updated.id, actor.actor_id);
        Ok(updated)
    }

    /// Remove the owner's reply entirely.
    pub async fn delete_response(
        &self,
        review: &Review,
        actor: &ActorContext,
    ) -> Result<Review, ModerationError> {
        let fields = json!({ "ownerResponse": Value::Null });

        let updated = self.apply(review, fields).await?;
        info!(
            "Owner {} removed their response on review {}",
            actor.actor_id, updated.id
        );
        Ok(updated)
    }

    /// Every review of every resource the owner holds. Resource ids come from
    /// one ownership query; the review lookup then runs one in-set query per
    /// batch of at most `MAX_IN_FILTER` ids and concatenates the batches.
    pub async fn reviews_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Review>, ModerationError> {
        let resources = self
            .store
            .query(
                &self.resources_collection,
                Some(Filter::FieldEq("ownerId".to_string(), json!(owner_id))),
                None,
                None,
            )
            .await?;
        let resource_ids: Vec<Value> = resources.iter().map(|doc| json!(doc.id)).collect();
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut reviews = Vec::new();
        for chunk in resource_ids.chunks(MAX_IN_FILTER) {
            let docs = self
                .store
                .query(
                    &self.reviews_collection,
                    Some(Filter::FieldIn("vehicleId".to_string(), chunk.to_vec())),
                    Some(OrderBy::desc("createdAt")),
                    None,
                )
                .await?;
            for doc in &docs {
                match Review::from_document(&self.reviews_collection, doc) {
                    Ok(review) => reviews.push(review),
                    Err(e) => warn!("Skipping unreadable review document: {}", e),
                }
            }
        }

        for review in &reviews {
            self.cache.put(&review.id, review.clone()).await;
        }
        Ok(reviews)
    }

    async fn apply(&self, review: &Review, fields: Value) -> Result<Review, ModerationError> {
        let patched = self
            .store
            .patch(&self.reviews_collection, &review.id, fields, None)
            .await;

        match patched {
            Ok(()) => {
                let doc = self.store.get(&self.reviews_collection, &review.id).await?;
                let updated = Review::from_document(&self.reviews_collection, &doc)?;
                self.cache.put(&updated.id, updated.clone()).await;
                Ok(updated)
            }
            Err(StoreError::NotFound { .. }) => {
                self.cache.invalidate(&review.id).await;
                Err(ModerationError::NotFound(review.id.clone()))
            }
            Err(other) => {
                self.cache.invalidate(&review.id).await;
                Err(ModerationError::Store(other))
            }
        }
    }
}
