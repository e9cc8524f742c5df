pub mod category;
pub mod quote;
pub mod repository;

pub use category::{AddOn, CategoryVariant, RentalCategory};
pub use quote::{QuoteBreakdown, QuoteConfig, QuoteEngine, QuoteError, QuoteRequest};
pub use repository::{CatalogError, CatalogReader};
