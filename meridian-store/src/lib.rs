pub mod app_config;
pub mod memory;

pub use app_config::Settings;
pub use memory::InMemoryStore;
