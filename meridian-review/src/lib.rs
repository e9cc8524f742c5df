pub mod models;
pub mod moderation;
pub mod responses;
pub mod filters;
pub mod stats;

pub use models::{ModerationAction, ModerationStatus, OwnerResponse, Review, SubRatings};
pub use moderation::{ModerationError, ModerationWorkflow};
pub use responses::ResponseHandler;
pub use filters::{ReviewFilter, ReviewSort};
pub use stats::{rating_trend, ReviewStats};
