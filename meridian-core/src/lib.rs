pub mod cache;
pub mod gateway;
pub mod identity;
pub mod notify;

pub use gateway::{DocumentStore, StoreError};
