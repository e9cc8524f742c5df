use chrono::{DateTime, NaiveDate, Utc};
use meridian_core::gateway::{Document, StoreError};
use meridian_core::notify::CustomerContact;
use meridian_shared::Masked;
use serde_json::{json, Value};

/// Lifecycle state of a booking request. An alternative offer carries its
/// text on the variant so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    AlternativeOffered { offer: String },
    CustomerModified,
    Paid,
    Completed,
    Cancelled,
}

/// Payload-free view of a status, usable as a query filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatusKind {
    Pending,
    Confirmed,
    AlternativeOffered,
    CustomerModified,
    Paid,
    Completed,
    Cancelled,
}

impl BookingStatusKind {
    /// The string stored in the document's `status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatusKind::Pending => "pending",
            BookingStatusKind::Confirmed => "confirmed",
            BookingStatusKind::AlternativeOffered => "alternative_offered",
            BookingStatusKind::CustomerModified => "customer_modified",
            BookingStatusKind::Paid => "paid",
            BookingStatusKind::Completed => "completed",
            BookingStatusKind::Cancelled => "cancelled",
        }
    }
}

impl BookingStatus {
    pub fn kind(&self) -> BookingStatusKind {
        match self {
            BookingStatus::Pending => BookingStatusKind::Pending,
            BookingStatus::Confirmed => BookingStatusKind::Confirmed,
            BookingStatus::AlternativeOffered { .. } => BookingStatusKind::AlternativeOffered,
            BookingStatus::CustomerModified => BookingStatusKind::CustomerModified,
            BookingStatus::Paid => BookingStatusKind::Paid,
            BookingStatus::Completed => BookingStatusKind::Completed,
            BookingStatus::Cancelled => BookingStatusKind::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }

    /// No transition leaves these states through the normal workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    fn from_doc_fields(
        status: &str,
        alternative_offer: Option<String>,
    ) -> Result<BookingStatus, String> {
        match status {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "alternative_offered" => {
                let offer = alternative_offer
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
                    .ok_or_else(|| "status is alternative_offered but no offer text is stored".to_string())?;
                Ok(BookingStatus::AlternativeOffered { offer })
            }
            "customer_modified" => Ok(BookingStatus::CustomerModified),
            "paid" => Ok(BookingStatus::Paid),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// Who the booking is for and how to reach them. Contact fields and the
/// passport number never appear in logs or debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub passport_number: Masked<String>,
}

/// A submission as it arrives from the request form, before the store has
/// assigned an id or timestamps.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub customer_name: String,
    pub customer_email: Masked<String>,
    pub customer_phone: Masked<String>,
    pub passport_number: Masked<String>,
    pub category_slug: String,
    pub category_name: String,
    pub variant_name: String,
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub with_driver: bool,
    pub selected_add_ons: Vec<String>,
    pub total_days: u32,
    pub estimated_price_cents: i64,
}

impl BookingDraft {
    /// Document body for the initial write. New requests always start pending.
    pub fn to_document_data(&self) -> Value {
        json!({
            "customerName": self.customer_name,
            "customerEmail": self.customer_email,
            "customerPhone": self.customer_phone,
            "passportNumber": self.passport_number,
            "categorySlug": self.category_slug,
            "categoryName": self.category_name,
            "variantName": self.variant_name,
            "pickupLocation": self.pickup_location,
            "pickupDate": self.pickup_date,
            "returnDate": self.return_date,
            "withDriver": self.with_driver,
            "selectedAddOns": self.selected_add_ons,
            "totalDays": self.total_days,
            "estimatedPriceCents": self.estimated_price_cents,
            "status": BookingStatusKind::Pending.as_str(),
        })
    }
}

/// Flat document shape. Everything the form writes plus the fields the
/// workflow stamps later.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingFields {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    passport_number: String,
    category_slug: String,
    category_name: String,
    variant_name: String,
    pickup_location: String,
    pickup_date: NaiveDate,
    return_date: NaiveDate,
    with_driver: bool,
    #[serde(default)]
    selected_add_ons: Vec<String>,
    total_days: u32,
    estimated_price_cents: i64,
    status: Option<String>,
    alternative_offer: Option<String>,
    admin_notes: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
}

/// A booking request as read back from the store, envelope included.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub id: String,
    pub customer: CustomerDetails,
    pub category_slug: String,
    pub category_name: String,
    pub variant_name: String,
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub with_driver: bool,
    pub selected_add_ons: Vec<String>,
    pub total_days: u32,
    pub estimated_price_cents: i64,
    pub status: BookingStatus,
    pub admin_notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRequest {
    pub fn from_document(collection: &str, doc: &Document) -> Result<BookingRequest, StoreError> {
        let malformed = |reason: String| StoreError::Malformed {
            collection: collection.to_string(),
            id: doc.id.clone(),
            reason,
        };
        let fields: BookingFields =
            serde_json::from_value(doc.data.clone()).map_err(|e| malformed(e.to_string()))?;
        let status_str = fields
            .status
            .ok_or_else(|| malformed("document has no status field".to_string()))?;
        let status = BookingStatus::from_doc_fields(&status_str, fields.alternative_offer)
            .map_err(malformed)?;
        Ok(BookingRequest {
            id: doc.id.clone(),
            customer: CustomerDetails {
                name: fields.customer_name,
                email: fields.customer_email.into(),
                phone: fields.customer_phone.into(),
                passport_number: fields.passport_number.into(),
            },
            category_slug: fields.category_slug,
            category_name: fields.category_name,
            variant_name: fields.variant_name,
            pickup_location: fields.pickup_location,
            pickup_date: fields.pickup_date,
            return_date: fields.return_date,
            with_driver: fields.with_driver,
            selected_add_ons: fields.selected_add_ons,
            total_days: fields.total_days,
            estimated_price_cents: fields.estimated_price_cents,
            status,
            admin_notes: fields.admin_notes,
            confirmed_at: fields.confirmed_at,
            paid_at: fields.paid_at,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    /// Contact details for outbound notifications. Exposes the real email
    /// and phone, so the result must not be logged.
    pub fn contact(&self) -> CustomerContact {
        CustomerContact {
            name: self.customer.name.clone(),
            email: self.customer.email.expose().clone(),
            phone: Some(self.customer.phone.expose().clone()),
        }
    }
}
