use chrono::{DateTime, Utc};
use meridian_core::gateway::{Document, StoreError};
use serde::{Deserialize, Serialize};

/// The admin's current verdict on a review. Absent on legacy records, which
/// read as pending everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::Flagged => "flagged",
        }
    }

    fn parse(value: Option<&str>) -> Result<ModerationStatus, String> {
        match value {
            None => Ok(ModerationStatus::Pending),
            Some("pending") => Ok(ModerationStatus::Pending),
            Some("approved") => Ok(ModerationStatus::Approved),
            Some("rejected") => Ok(ModerationStatus::Rejected),
            Some("flagged") => Ok(ModerationStatus::Flagged),
            Some(other) => Err(format!("unknown moderation status '{}'", other)),
        }
    }
}

/// What an admin can do to a review. Any action is legal from any status;
/// re-moderating overwrites the previous verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
    Flag,
}

impl ModerationAction {
    pub fn verdict(&self) -> ModerationStatus {
        match self {
            ModerationAction::Approve => ModerationStatus::Approved,
            ModerationAction::Reject => ModerationStatus::Rejected,
            ModerationAction::Flag => ModerationStatus::Flagged,
        }
    }

    /// Only an approval makes the review publicly visible.
    pub fn makes_public(&self) -> bool {
        matches!(self, ModerationAction::Approve)
    }
}

/// Optional per-aspect scores submitted alongside the overall rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubRatings {
    pub vehicle_condition: Option<u8>,
    pub cleanliness: Option<u8>,
    pub value_for_money: Option<u8>,
    pub owner_communication: Option<u8>,
}

/// The resource owner's reply. Independent of moderation; editing replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub comment: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewFields {
    vehicle_id: String,
    #[serde(default)]
    booking_id: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    customer_name: String,
    rating: u8,
    #[serde(default)]
    vehicle_condition_rating: Option<u8>,
    #[serde(default)]
    cleanliness_rating: Option<u8>,
    #[serde(default)]
    value_for_money_rating: Option<u8>,
    #[serde(default)]
    owner_communication_rating: Option<u8>,
    #[serde(default)]
    title: Option<String>,
    comment: String,
    #[serde(default)]
    photos: Vec<String>,
    #[serde(default)]
    recommend: bool,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    helpful_count: u32,
    #[serde(default)]
    moderation_status: Option<String>,
    #[serde(default)]
    moderation_note: Option<String>,
    #[serde(default)]
    moderated_by: Option<String>,
    #[serde(default)]
    moderated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    owner_response: Option<OwnerResponse>,
}

/// A customer review as read back from the store.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: String,
    pub resource_id: String,
    pub booking_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub rating: u8,
    pub sub_ratings: SubRatings,
    pub title: Option<String>,
    pub comment: String,
    pub photos: Vec<String>,
    pub recommend: bool,
    pub is_verified: bool,
    pub helpful_count: u32,
    pub moderation_status: ModerationStatus,
    pub moderation_note: Option<String>,
    pub moderated_by: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub owner_response: Option<OwnerResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_star_rating(label: &str, value: u8) -> Result<(), String> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} {} is outside 1..=5", label, value))
    }
}

impl Review {
    pub fn from_document(collection: &str, doc: &Document) -> Result<Review, StoreError> {
        let malformed = |reason: String| StoreError::Malformed {
            collection: collection.to_string(),
            id: doc.id.clone(),
            reason,
        };
        let fields: ReviewFields =
            serde_json::from_value(doc.data.clone()).map_err(|e| malformed(e.to_string()))?;

        check_star_rating("rating", fields.rating).map_err(&malformed)?;
        let sub_ratings = SubRatings {
            vehicle_condition: fields.vehicle_condition_rating,
            cleanliness: fields.cleanliness_rating,
            value_for_money: fields.value_for_money_rating,
            owner_communication: fields.owner_communication_rating,
        };
        for (label, value) in [
            ("vehicleConditionRating", sub_ratings.vehicle_condition),
            ("cleanlinessRating", sub_ratings.cleanliness),
            ("valueForMoneyRating", sub_ratings.value_for_money),
            ("ownerCommunicationRating", sub_ratings.owner_communication),
        ] {
            if let Some(value) = value {
                check_star_rating(label, value).map_err(&malformed)?;
            }
        }

        let moderation_status =
            ModerationStatus::parse(fields.moderation_status.as_deref()).map_err(&malformed)?;

        Ok(Review {
            id: doc.id.clone(),
            resource_id: fields.vehicle_id,
            booking_id: fields.booking_id,
            customer_id: fields.customer_id,
            customer_name: fields.customer_name,
            rating: fields.rating,
            sub_ratings,
            title: fields.title,
            comment: fields.comment,
            photos: fields.photos,
            recommend: fields.recommend,
            is_verified: fields.is_verified,
            helpful_count: fields.helpful_count,
            moderation_status,
            moderation_note: fields.moderation_note,
            moderated_by: fields.moderated_by,
            moderated_at: fields.moderated_at,
            is_public: fields.is_public,
            owner_response: fields.owner_response,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}
