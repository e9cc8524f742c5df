use chrono::NaiveDate;

/// Payloads handed to the notification dispatcher when a booking transition
/// commits. Field names match the variables the customer-facing mail
/// templates interpolate.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmedEvent {
    pub booking_id: String,
    pub customer_name: String,
    pub category_name: String,
    pub variant_name: String,
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub total_days: u32,
    pub estimated_price_cents: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOfferEvent {
    pub booking_id: String,
    pub customer_name: String,
    pub category_name: String,
    pub alternative_offer: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingCancelledEvent {
    pub booking_id: String,
    pub customer_name: String,
    pub category_name: String,
    pub reason: String,
    pub timestamp: i64,
}
