use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    BookingConfirmed,
    AlternativeOffer,
    BookingCancelled,
}

/// Outbound customer messaging seam. Implementations must enqueue and return
/// promptly; delivery is best-effort and a failure here never rolls back the
/// transition that triggered it.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        contact: &CustomerContact,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Dispatcher that only logs. Stands in for the real mail/SMS pipeline in
/// local development.
pub struct TracingDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn notify(
        &self,
        contact: &CustomerContact,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Queued {:?} notification for {}: {}",
            kind, contact.email, payload
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub contact: CustomerContact,
    pub kind: NotificationKind,
    pub payload: Value,
}

/// Dispatcher that records every call, for assertions in tests. Constructed
/// with `failing()` it rejects every call instead, to exercise the
/// best-effort path.
pub struct RecordingDispatcher {
    sent: Mutex<Vec<SentNotification>>,
    fail_all: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: true,
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(
        &self,
        contact: &CustomerContact,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_all {
            return Err("dispatcher offline".into());
        }

        let mut guard = match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(SentNotification {
            contact: contact.clone(),
            kind,
            payload,
        });
        Ok(())
    }
}
