use std::sync::Arc;

use chrono::Utc;
use meridian_core::cache::RecordCache;
use meridian_core::gateway::{DocumentStore, Filter, OrderBy, StoreError};
use meridian_core::identity::ActorContext;
use meridian_core::notify::{NotificationDispatcher, NotificationKind};
use meridian_shared::events::{
    AlternativeOfferEvent, BookingCancelledEvent, BookingConfirmedEvent,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::{BookingDraft, BookingRequest, BookingStatus, BookingStatusKind};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Booking request not found: {0}")]
    NotFound(String),
    #[error("Invalid state transition from {from} to {to}")]
    PreconditionFailed { from: String, to: String },
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Booking {id} was changed concurrently and is now {current}")]
    StaleState { id: String, current: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives booking requests through their workflow against the document store.
///
/// Every transition re-checks its precondition locally, then patches with the
/// record's update timestamp as the concurrency token. A lost race invalidates
/// the cached entry and is reported either as a retryable conflict or, when
/// the precondition no longer holds on the fresh record, as `StaleState`.
pub struct BookingLifecycle {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    cache: RecordCache<BookingRequest>,
    collection: String,
}

impl BookingLifecycle {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            cache: RecordCache::new(),
            collection: collection.into(),
        }
    }

    /// Persist a new request. New requests always enter as pending.
    pub async fn submit(&self, draft: &BookingDraft) -> Result<BookingRequest, LifecycleError> {
        if draft.customer_name.trim().is_empty() {
            return Err(LifecycleError::ValidationFailed(
                "customer name must not be empty".to_string(),
            ));
        }
        if draft.customer_email.expose().trim().is_empty() {
            return Err(LifecycleError::ValidationFailed(
                "customer email must not be empty".to_string(),
            ));
        }
        if draft.return_date < draft.pickup_date {
            return Err(LifecycleError::ValidationFailed(format!(
                "return date {} is before pickup date {}",
                draft.return_date, draft.pickup_date
            )));
        }

        let id = self
            .store
            .create(&self.collection, draft.to_document_data())
            .await?;
        let doc = self.store.get(&self.collection, &id).await?;
        let booking = BookingRequest::from_document(&self.collection, &doc)?;
        self.cache.put(&id, booking.clone()).await;

        info!(
            "Submitted booking request {} for category {}",
            id, booking.category_slug
        );
        Ok(booking)
    }

    /// Accept a pending request and notify the customer.
    pub async fn confirm(
        &self,
        request: &BookingRequest,
        actor: &ActorContext,
    ) -> Result<BookingRequest, LifecycleError> {
        if request.status != BookingStatus::Pending {
            return Err(LifecycleError::PreconditionFailed {
                from: request.status.as_str().to_string(),
                to: BookingStatusKind::Confirmed.as_str().to_string(),
            });
        }

        let now = Utc::now();
        let fields = json!({
            "status": BookingStatusKind::Confirmed.as_str(),
            "confirmedAt": now,
            "alternativeOffer": Value::Null,
        });
        let updated = self
            .guarded_patch(request, fields, BookingStatusKind::Confirmed, |status| {
                *status == BookingStatus::Pending
            })
            .await?;

        info!("Booking {} confirmed by {}", updated.id, actor.actor_id);
        let event = BookingConfirmedEvent {
            booking_id: updated.id.clone(),
            customer_name: updated.customer.name.clone(),
            category_name: updated.category_name.clone(),
            variant_name: updated.variant_name.clone(),
            pickup_location: updated.pickup_location.clone(),
            pickup_date: updated.pickup_date,
            return_date: updated.return_date,
            total_days: updated.total_days,
            estimated_price_cents: updated.estimated_price_cents,
            timestamp: now.timestamp(),
        };
        self.dispatch(&updated, NotificationKind::BookingConfirmed, &event)
            .await;
        Ok(updated)
    }

    /// Counter a pending request with a different vehicle or period. The offer
    /// text is stored alongside the status and travels with it from then on.
    pub async fn offer_alternative(
        &self,
        request: &BookingRequest,
        offer_text: &str,
        actor: &ActorContext,
    ) -> Result<BookingRequest, LifecycleError> {
        let offer = offer_text.trim();
        if offer.is_empty() {
            return Err(LifecycleError::ValidationFailed(
                "alternative offer text must not be empty".to_string(),
            ));
        }
        if request.status != BookingStatus::Pending {
            return Err(LifecycleError::PreconditionFailed {
                from: request.status.as_str().to_string(),
                to: BookingStatusKind::AlternativeOffered.as_str().to_string(),
            });
        }

        let fields = json!({
            "status": BookingStatusKind::AlternativeOffered.as_str(),
            "alternativeOffer": offer,
        });
        let updated = self
            .guarded_patch(
                request,
                fields,
                BookingStatusKind::AlternativeOffered,
                |status| *status == BookingStatus::Pending,
            )
            .await?;

        info!(
            "Booking {} countered with an alternative by {}",
            updated.id, actor.actor_id
        );
        let event = AlternativeOfferEvent {
            booking_id: updated.id.clone(),
            customer_name: updated.customer.name.clone(),
            category_name: updated.category_name.clone(),
            alternative_offer: offer.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        self.dispatch(&updated, NotificationKind::AlternativeOffer, &event)
            .await;
        Ok(updated)
    }

    /// Cancel a request with a reason. Allowed from every state except
    /// completed; cancelling an already cancelled request overwrites the
    /// recorded reason.
    pub async fn cancel(
        &self,
        request: &BookingRequest,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<BookingRequest, LifecycleError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::ValidationFailed(
                "cancellation reason must not be empty".to_string(),
            ));
        }
        if request.status == BookingStatus::Completed {
            return Err(LifecycleError::PreconditionFailed {
                from: request.status.as_str().to_string(),
                to: BookingStatusKind::Cancelled.as_str().to_string(),
            });
        }

        let fields = json!({
            "status": BookingStatusKind::Cancelled.as_str(),
            "adminNotes": reason,
            "alternativeOffer": Value::Null,
        });
        let updated = self
            .guarded_patch(request, fields, BookingStatusKind::Cancelled, |status| {
                *status != BookingStatus::Completed
            })
            .await?;

        info!("Booking {} cancelled by {}", updated.id, actor.actor_id);
        let event = BookingCancelledEvent {
            booking_id: updated.id.clone(),
            customer_name: updated.customer.name.clone(),
            category_name: updated.category_name.clone(),
            reason: reason.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        self.dispatch(&updated, NotificationKind::BookingCancelled, &event)
            .await;
        Ok(updated)
    }

    /// Read-through fetch of one request.
    pub async fn get(&self, id: &str) -> Result<BookingRequest, LifecycleError> {
        if let Some(hit) = self.cache.get(id).await {
            return Ok(hit);
        }

        let doc = self
            .store
            .get(&self.collection, id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => LifecycleError::NotFound(id.to_string()),
                other => LifecycleError::Store(other),
            })?;
        let booking = BookingRequest::from_document(&self.collection, &doc)?;
        self.cache.put(id, booking.clone()).await;
        Ok(booking)
    }

    /// Newest-first listing, optionally narrowed to one status. Documents that
    /// no longer parse are skipped so one bad record cannot hide the rest.
    pub async fn list(
        &self,
        kind: Option<BookingStatusKind>,
    ) -> Result<Vec<BookingRequest>, LifecycleError> {
        let filter = kind.map(|k| Filter::FieldEq("status".to_string(), json!(k.as_str())));
        let docs = self
            .store
            .query(
                &self.collection,
                filter,
                Some(OrderBy::desc("createdAt")),
                None,
            )
            .await?;

        let mut bookings = Vec::with_capacity(docs.len());
        for doc in &docs {
            match BookingRequest::from_document(&self.collection, doc) {
                Ok(booking) => bookings.push(booking),
                Err(e) => warn!("Skipping unreadable booking document: {}", e),
            }
        }

        if kind.is_none() {
            self.cache
                .replace_all(bookings.iter().map(|b| (b.id.clone(), b.clone())))
                .await;
        } else {
            for booking in &bookings {
                self.cache.put(&booking.id, booking.clone()).await;
            }
        }
        Ok(bookings)
    }

    /// Compare-and-set patch keyed on the caller's copy, then re-read so the
    /// returned record carries the new server timestamp.
    async fn guarded_patch<F>(
        &self,
        request: &BookingRequest,
        fields: Value,
        to: BookingStatusKind,
        still_allowed: F,
    ) -> Result<BookingRequest, LifecycleError>
    where
        F: Fn(&BookingStatus) -> bool,
    {
        let patched = self
            .store
            .patch(
                &self.collection,
                &request.id,
                fields,
                Some(request.updated_at),
            )
            .await;

        match patched {
            Ok(()) => {
                let doc = self.store.get(&self.collection, &request.id).await?;
                let updated = BookingRequest::from_document(&self.collection, &doc)?;
                self.cache.put(&updated.id, updated.clone()).await;
                Ok(updated)
            }
            Err(StoreError::Conflict { collection, id }) => {
                self.cache.invalidate(&request.id).await;
                let doc = match self.store.get(&self.collection, &request.id).await {
                    Ok(doc) => doc,
                    Err(StoreError::NotFound { .. }) => {
                        return Err(LifecycleError::NotFound(request.id.clone()))
                    }
                    Err(other) => return Err(LifecycleError::Store(other)),
                };
                let current = BookingRequest::from_document(&self.collection, &doc)?;
                if still_allowed(&current.status) {
                    Err(LifecycleError::Store(StoreError::Conflict {
                        collection,
                        id,
                    }))
                } else {
                    warn!(
                        "Booking {} no longer accepts {} (now {})",
                        request.id,
                        to.as_str(),
                        current.status.as_str()
                    );
                    Err(LifecycleError::StaleState {
                        id: request.id.clone(),
                        current: current.status.as_str().to_string(),
                    })
                }
            }
            Err(StoreError::NotFound { .. }) => {
                self.cache.invalidate(&request.id).await;
                Err(LifecycleError::NotFound(request.id.clone()))
            }
            Err(other) => {
                self.cache.invalidate(&request.id).await;
                Err(LifecycleError::Store(other))
            }
        }
    }

    /// Best-effort customer notification. Failures are logged and swallowed;
    /// the transition has already committed.
    async fn dispatch<E: serde::Serialize>(
        &self,
        booking: &BookingRequest,
        kind: NotificationKind,
        event: &E,
    ) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "Could not encode {:?} payload for booking {}: {}",
                    kind, booking.id, e
                );
                return;
            }
        };
        if let Err(e) = self.notifier.notify(&booking.contact(), kind, payload).await {
            warn!(
                "Notification {:?} for booking {} was not dispatched: {}",
                kind, booking.id, e
            );
        }
    }
}
