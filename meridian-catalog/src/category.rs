use serde::{Deserialize, Serialize};

/// One rentable configuration within a category (e.g. "Prado TX" within the
/// SUV category), priced per rental day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVariant {
    pub name: String,
    pub base_price_cents: i64,
    pub seats: u32,
}

/// A rentable category as the catalog editor defines it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalCategory {
    pub slug: String,
    pub name: String,
    pub variants: Vec<CategoryVariant>,
    pub features: Vec<String>,
    pub ideal_for: Vec<String>,
    pub is_active: bool,
    pub display_order: u32,
}

impl RentalCategory {
    pub fn variant(&self, name: &str) -> Option<&CategoryVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn is_bookable(&self) -> bool {
        self.is_active && !self.variants.is_empty()
    }
}

/// An optional extra on a rental. Per-day add-ons multiply by rental days;
/// flat add-ons charge once per rental.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    /// Store-assigned document id, not part of the stored body.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub per_day: bool,
    pub is_active: bool,
    /// Category slugs this add-on may be booked with. Empty means all.
    pub applicable_categories: Vec<String>,
}

impl AddOn {
    pub fn applies_to(&self, category_slug: &str) -> bool {
        self.applicable_categories.is_empty()
            || self.applicable_categories.iter().any(|s| s == category_slug)
    }
}
