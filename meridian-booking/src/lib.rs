pub mod models;
pub mod lifecycle;
pub mod stats;

pub use models::{BookingDraft, BookingRequest, BookingStatus, BookingStatusKind, CustomerDetails};
pub use lifecycle::{BookingLifecycle, LifecycleError};
pub use stats::BookingStats;
