use chrono::{DateTime, Duration, Utc};

use crate::models::{ModerationStatus, Review};

/// Moderation dashboard counters over a fetched window. Recomputed from
/// scratch after every mutation; nothing here is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct ReviewStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub flagged: usize,
    pub average_rating: f64,
}

impl ReviewStats {
    pub fn compute(reviews: &[Review]) -> Self {
        let mut stats = ReviewStats {
            total: reviews.len(),
            ..Default::default()
        };
        let mut rating_sum: u64 = 0;
        for review in reviews {
            rating_sum += u64::from(review.rating);
            match review.moderation_status {
                ModerationStatus::Pending => stats.pending += 1,
                ModerationStatus::Approved => stats.approved += 1,
                ModerationStatus::Rejected => stats.rejected += 1,
                ModerationStatus::Flagged => stats.flagged += 1,
            }
        }
        if stats.total > 0 {
            stats.average_rating = rating_sum as f64 / stats.total as f64;
        }
        stats
    }
}

/// Average rating of the last 30 days minus the average of the 30 days before
/// that. Zero when either window has no reviews, so a single busy month never
/// reads as a swing.
pub fn rating_trend(reviews: &[Review], now: DateTime<Utc>) -> f64 {
    let thirty_days_ago = now - Duration::days(30);
    let sixty_days_ago = now - Duration::days(60);

    let recent: Vec<u8> = reviews
        .iter()
        .filter(|r| r.created_at >= thirty_days_ago)
        .map(|r| r.rating)
        .collect();
    let older: Vec<u8> = reviews
        .iter()
        .filter(|r| r.created_at >= sixty_days_ago && r.created_at < thirty_days_ago)
        .map(|r| r.rating)
        .collect();

    if recent.is_empty() || older.is_empty() {
        return 0.0;
    }

    let avg = |window: &[u8]| {
        window.iter().map(|&r| f64::from(r)).sum::<f64>() / window.len() as f64
    };
    avg(&recent) - avg(&older)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::gateway::Document;
    use serde_json::{json, Value};

    fn review(rating: u8, status: Value, age_days: i64) -> Review {
        let stamp = Utc::now() - Duration::days(age_days);
        let mut data = json!({
            "vehicleId": "veh-1",
            "customerName": "Ravi",
            "rating": rating,
            "comment": "fine",
        });
        if !status.is_null() {
            data["moderationStatus"] = status;
        }
        let doc = Document {
            id: format!("rev-{}", age_days),
            data,
            created_at: stamp,
            updated_at: stamp,
        };
        Review::from_document("vehicle_reviews", &doc).unwrap()
    }

    #[test]
    fn counts_treat_legacy_records_as_pending() {
        let window = vec![
            review(4, Value::Null, 1),
            review(5, json!("approved"), 2),
            review(1, json!("rejected"), 3),
            review(2, json!("flagged"), 4),
            review(3, json!("pending"), 5),
        ];

        let stats = ReviewStats::compute(&window);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.flagged, 1);
        assert!((stats.average_rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_window_has_zero_average() {
        let stats = ReviewStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn trend_compares_the_two_most_recent_months() {
        let now = Utc::now();
        let window = vec![
            review(5, Value::Null, 5),
            review(4, Value::Null, 10),
            review(2, Value::Null, 40),
            review(3, Value::Null, 50),
        ];

        // Recent avg 4.5 against prior avg 2.5
        let trend = rating_trend(&window, now);
        assert!((trend - 2.0).abs() < 1e-9);
    }

    #[test]
    fn trend_is_zero_when_a_window_is_empty() {
        let now = Utc::now();
        let only_recent = vec![review(5, Value::Null, 3)];
        assert_eq!(rating_trend(&only_recent, now), 0.0);

        let only_old = vec![review(5, Value::Null, 45)];
        assert_eq!(rating_trend(&only_old, now), 0.0);

        // Reviews older than both windows are ignored entirely
        let ancient = vec![review(5, Value::Null, 90), review(1, Value::Null, 95)];
        assert_eq!(rating_trend(&ancient, now), 0.0);
    }
}
