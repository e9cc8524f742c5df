use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub collections: CollectionNames,
    #[serde(default)]
    pub quoting: QuotingSettings,
    #[serde(default)]
    pub listing: ListingSettings,
}

/// Collection names in the backing document database. Defaults match the
/// collections the production site writes to.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionNames {
    #[serde(default = "default_bookings")]
    pub bookings: String,
    #[serde(default = "default_reviews")]
    pub reviews: String,
    #[serde(default = "default_resources")]
    pub resources: String,
    #[serde(default = "default_categories")]
    pub categories: String,
    #[serde(default = "default_add_ons")]
    pub add_ons: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuotingSettings {
    #[serde(default = "default_driver_fee")]
    pub driver_fee_cents_per_day: i64,
    #[serde(default = "default_deposit_percentage")]
    pub deposit_percentage: f64,
    #[serde(default)]
    pub tax_rate_percentage: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingSettings {
    #[serde(default = "default_reviews_page_size")]
    pub reviews_page_size: usize,
}

fn default_bookings() -> String {
    "vehicleBookingRequests".to_string()
}

fn default_reviews() -> String {
    "vehicle_reviews".to_string()
}

fn default_resources() -> String {
    "vehicles".to_string()
}

fn default_categories() -> String {
    "vehicleCategories".to_string()
}

fn default_add_ons() -> String {
    "vehicleAddOns".to_string()
}

fn default_driver_fee() -> i64 {
    5_000
}

fn default_deposit_percentage() -> f64 {
    30.0
}

fn default_reviews_page_size() -> usize {
    20
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            bookings: default_bookings(),
            reviews: default_reviews(),
            resources: default_resources(),
            categories: default_categories(),
            add_ons: default_add_ons(),
        }
    }
}

impl Default for QuotingSettings {
    fn default() -> Self {
        Self {
            driver_fee_cents_per_day: default_driver_fee(),
            deposit_percentage: default_deposit_percentage(),
            tax_rate_percentage: 0.0,
        }
    }
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            reviews_page_size: default_reviews_page_size(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collections: CollectionNames::default(),
            quoting: QuotingSettings::default(),
            listing: ListingSettings::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Every file layer is optional; the serde defaults above make the
            // crate usable without a config directory at all.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
