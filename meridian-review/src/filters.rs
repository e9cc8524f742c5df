use crate::models::{ModerationStatus, Review};

/// Client-side narrowing of a fetched review window. All criteria must hold;
/// a default filter keeps everything.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub status: Option<ModerationStatus>,
    pub rating: Option<u8>,
    /// `Some(true)` keeps public reviews only, `Some(false)` hidden only.
    pub visibility: Option<bool>,
    pub search: Option<String>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        if let Some(status) = self.status {
            if review.moderation_status != status {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if review.rating != rating {
                return false;
            }
        }
        if let Some(public) = self.visibility {
            if review.is_public != public {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty() {
                let in_comment = review.comment.to_lowercase().contains(&needle);
                let in_title = review
                    .title
                    .as_ref()
                    .map_or(false, |t| t.to_lowercase().contains(&needle));
                let in_name = review.customer_name.to_lowercase().contains(&needle);
                if !in_comment && !in_title && !in_name {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    Newest,
    Oldest,
    HighestRating,
    LowestRating,
}

impl ReviewSort {
    pub fn apply(&self, reviews: &mut [Review]) {
        match self {
            ReviewSort::Newest => reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ReviewSort::Oldest => reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ReviewSort::HighestRating => reviews.sort_by(|a, b| b.rating.cmp(&a.rating)),
            ReviewSort::LowestRating => reviews.sort_by(|a, b| a.rating.cmp(&b.rating)),
        }
    }
}

/// Filter then sort a fetched window, leaving the input untouched.
pub fn filter_and_sort(reviews: &[Review], filter: &ReviewFilter, sort: ReviewSort) -> Vec<Review> {
    let mut out: Vec<Review> = reviews
        .iter()
        .filter(|review| filter.matches(review))
        .cloned()
        .collect();
    sort.apply(&mut out);
    out
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One page of an already filtered and sorted window. Pages are numbered from
/// 1; a page past the end is empty.
pub fn nth_page(reviews: &[Review], page: usize, page_size: usize) -> &[Review] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= reviews.len() {
        return &[];
    }
    let end = (start + page_size).min(reviews.len());
    &reviews[start..end]
}
