use crate::models::{BookingRequest, BookingStatusKind};

/// Dashboard counters. Always recomputed from a freshly fetched window rather
/// than adjusted incrementally, so a lost update can never skew them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub paid: usize,
}

impl BookingStats {
    pub fn compute(bookings: &[BookingRequest]) -> Self {
        let mut stats = BookingStats::default();
        for booking in bookings {
            stats.total += 1;
            match booking.status.kind() {
                BookingStatusKind::Pending => stats.pending += 1,
                BookingStatusKind::Confirmed => stats.confirmed += 1,
                BookingStatusKind::Paid => stats.paid += 1,
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meridian_core::gateway::Document;
    use serde_json::json;

    fn booking(id: &str, status: &str) -> BookingRequest {
        let mut data = json!({
            "customerName": "Ana Byrne",
            "customerEmail": "ana@example.com",
            "customerPhone": "+62 811 000 111",
            "passportNumber": "X1234567",
            "categorySlug": "suv",
            "categoryName": "SUV",
            "variantName": "7 Seater",
            "pickupLocation": "Airport",
            "pickupDate": "2026-09-01",
            "returnDate": "2026-09-04",
            "withDriver": false,
            "totalDays": 3,
            "estimatedPriceCents": 450_000,
            "status": status,
        });
        if status == "alternative_offered" {
            data["alternativeOffer"] = json!("Sedan instead");
        }
        let doc = Document {
            id: id.to_string(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        BookingRequest::from_document("vehicleBookingRequests", &doc).unwrap()
    }

    #[test]
    fn counts_only_the_tracked_statuses() {
        let window = vec![
            booking("b-1", "pending"),
            booking("b-2", "pending"),
            booking("b-3", "confirmed"),
            booking("b-4", "paid"),
            booking("b-5", "cancelled"),
            booking("b-6", "alternative_offered"),
        ];

        let stats = BookingStats::compute(&window);

        assert_eq!(stats.total, 6);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.paid, 1);
    }

    #[test]
    fn empty_window_is_all_zeroes() {
        assert_eq!(BookingStats::compute(&[]), BookingStats::default());
    }
}
