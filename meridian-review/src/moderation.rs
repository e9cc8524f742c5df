use std::sync::Arc;

use chrono::Utc;
use meridian_core::cache::RecordCache;
use meridian_core::gateway::{DocumentStore, OrderBy, StoreError};
use meridian_core::identity::ActorContext;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::{ModerationAction, Review};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Review not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admin-side moderation over the reviews collection. Re-moderation is always
/// legal; each verdict overwrites the previous one, so writes go out without a
/// concurrency token and the store's last write wins.
pub struct ModerationWorkflow {
    store: Arc<dyn DocumentStore>,
    cache: RecordCache<Review>,
    collection: String,
}

impl ModerationWorkflow {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            cache: RecordCache::new(),
            collection: collection.into(),
        }
    }

    /// Record a verdict. Approval is the only action that makes the review
    /// public; a missing note clears whatever note the previous verdict left.
    pub async fn moderate(
        &self,
        review: &Review,
        action: ModerationAction,
        note: Option<&str>,
        actor: &ActorContext,
    ) -> Result<Review, ModerationError> {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let fields = json!({
            "moderationStatus": action.verdict().as_str(),
            "isPublic": action.makes_public(),
            "moderationNote": note,
            "moderatedBy": actor.actor_id,
            "moderatedAt": Utc::now(),
        });

        let updated = self.apply(review, fields).await?;
        info!(
            "Review {} marked {} by {}",
            updated.id,
            action.verdict().as_str(),
            actor.actor_id
        );
        Ok(updated)
    }

    /// Flip public visibility without disturbing the verdict. Lets an admin
    /// temporarily hide an approved review.
    pub async fn toggle_visibility(
        &self,
        review: &Review,
        actor: &ActorContext,
    ) -> Result<Review, ModerationError> {
        let fields = json!({ "isPublic": !review.is_public });

        let updated = self.apply(review, fields).await?;
        info!(
            "Review {} visibility set to {} by {}",
            updated.id, updated.is_public, actor.actor_id
        );
        Ok(updated)
    }

    /// Remove the review entirely. No tombstone remains and deleting an
    /// already-deleted review is a no-op.
    pub async fn delete_review(
        &self,
        review_id: &str,
        actor: &ActorContext,
    ) -> Result<(), ModerationError> {
        self.store.delete(&self.collection, review_id).await?;
        self.cache.invalidate(review_id).await;
        info!("Review {} deleted by {}", review_id, actor.actor_id);
        Ok(())
    }

    /// Read-through fetch of one review.
    pub async fn get(&self, id: &str) -> Result<Review, ModerationError> {
        if let Some(hit) = self.cache.get(id).await {
            return Ok(hit);
        }

        let doc = self
            .store
            .get(&self.collection, id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ModerationError::NotFound(id.to_string()),
                other => ModerationError::Store(other),
            })?;
        let review = Review::from_document(&self.collection, &doc)?;
        self.cache.put(id, review.clone()).await;
        Ok(review)
    }

    /// The whole moderation window, newest first. Filtering, sorting and
    /// paging happen client-side over this window.
    pub async fn list(&self) -> Result<Vec<Review>, ModerationError> {
        let docs = self
            .store
            .query(
                &self.collection,
                None,
                Some(OrderBy::desc("createdAt")),
                None,
            )
            .await?;

        let mut reviews = Vec::with_capacity(docs.len());
        for doc in &docs {
            match Review::from_document(&self.collection, doc) {
                Ok(review) => reviews.push(review),
                Err(e) => warn!("Skipping unreadable review document: {}", e),
            }
        }
        self.cache
            .replace_all(reviews.iter().map(|r| (r.id.clone(), r.clone())))
            .await;
        Ok(reviews)
    }

    async fn apply(&self, review: &Review, fields: Value) -> Result<Review, ModerationError> {
        let patched = self
            .store
            .patch(&self.collection, &review.id, fields, None)
            .await;

        match patched {
            Ok(()) => {
                let doc = self.store.get(&self.collection, &review.id).await?;
                let updated = Review::from_document(&self.collection, &doc)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModerationStatus;
    use meridian_store::InMemoryStore;
    use serde_json::json;

    async fn seed(store: &InMemoryStore, data: Value) -> String {
        store.create("vehicle_reviews", data).await.unwrap()
    }

    fn workflow(store: Arc<InMemoryStore>) -> ModerationWorkflow {
        ModerationWorkflow::new(store, "vehicle_reviews")
    }

    fn review_data(rating: u8) -> Value {
        json!({
            "vehicleId": "veh-1",
            "customerName": "Ravi",
            "rating": rating,
            "comment": "Brakes felt soft",
        })
    }

    #[tokio::test]
    async fn approving_publishes_and_stamps_the_verdict() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(4)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        let approved = workflow
            .moderate(&review, ModerationAction::Approve, Some("looks genuine"), &admin)
            .await
            .unwrap();

        assert_eq!(approved.moderation_status, ModerationStatus::Approved);
        assert!(approved.is_public);
        assert_eq!(approved.moderated_by.as_deref(), Some("adm-7"));
        assert!(approved.moderated_at.is_some());
        assert_eq!(approved.moderation_note.as_deref(), Some("looks genuine"));
    }

    #[tokio::test]
    async fn rejecting_and_flagging_unpublish() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(1)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        let approved = workflow
            .moderate(&review, ModerationAction::Approve, None, &admin)
            .await
            .unwrap();
        assert!(approved.is_public);

        // Re-review of an already approved record
        let flagged = workflow
            .moderate(&approved, ModerationAction::Flag, Some("reported by owner"), &admin)
            .await
            .unwrap();
        assert_eq!(flagged.moderation_status, ModerationStatus::Flagged);
        assert!(!flagged.is_public);
    }

    #[tokio::test]
    async fn remoderating_with_the_same_action_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(5)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        let first = workflow
            .moderate(&review, ModerationAction::Approve, None, &admin)
            .await
            .unwrap();
        let second = workflow
            .moderate(&first, ModerationAction::Approve, None, &admin)
            .await
            .unwrap();

        assert_eq!(second.moderation_status, first.moderation_status);
        assert_eq!(second.is_public, first.is_public);
        assert!(second.moderated_at >= first.moderated_at);
    }

    #[tokio::test]
    async fn an_absent_note_clears_the_previous_one() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(3)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        let rejected = workflow
            .moderate(&review, ModerationAction::Reject, Some("spam links"), &admin)
            .await
            .unwrap();
        assert_eq!(rejected.moderation_note.as_deref(), Some("spam links"));

        let reflagged = workflow
            .moderate(&rejected, ModerationAction::Flag, None, &admin)
            .await
            .unwrap();
        assert!(reflagged.moderation_note.is_none());
    }

    #[tokio::test]
    async fn toggling_visibility_never_touches_the_verdict() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(4)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        let approved = workflow
            .moderate(&review, ModerationAction::Approve, Some("fine"), &admin)
            .await
            .unwrap();

        let hidden = workflow.toggle_visibility(&approved, &admin).await.unwrap();
        assert!(!hidden.is_public);
        assert_eq!(hidden.moderation_status, ModerationStatus::Approved);
        assert_eq!(hidden.moderation_note.as_deref(), Some("fine"));
        assert_eq!(hidden.moderated_at, approved.moderated_at);

        let shown = workflow.toggle_visibility(&hidden, &admin).await.unwrap();
        assert!(shown.is_public);
    }

    #[tokio::test]
    async fn deleting_is_idempotent_and_later_moderation_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let id = seed(&store, review_data(2)).await;
        let workflow = workflow(store.clone());
        let admin = ActorContext::admin("adm-7", "Trust & Safety");

        let review = workflow.get(&id).await.unwrap();
        workflow.delete_review(&id, &admin).await.unwrap();
        workflow.delete_review(&id, &admin).await.unwrap();

        let err = workflow
            .moderate(&review, ModerationAction::Approve, None, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotFound(_)));
    }
}
