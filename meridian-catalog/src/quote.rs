use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::AddOn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Daily fee added when the rental includes a driver (in cents).
    pub driver_fee_cents_per_day: i64,

    /// Share of the total collected up front, in percent.
    pub deposit_percentage: f64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            driver_fee_cents_per_day: 5_000,
            deposit_percentage: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

/// Percentage applied to the subtotal during high or low season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalPricing {
    pub percentage: f64,
    pub direction: AdjustmentDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoDiscount {
    Percentage(f64),
    FixedCents(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub discount: PromoDiscount,
    /// Rentals shorter than this many days do not qualify.
    pub minimum_days: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AddOnSelection {
    pub add_on: AddOn,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub category_slug: String,
    pub base_price_cents: i64,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub with_driver: bool,
    pub add_ons: Vec<AddOnSelection>,
    pub seasonal: Option<SeasonalPricing>,
    pub promo: Option<PromoCode>,
    pub tax_rate_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnLine {
    pub name: String,
    pub total_cents: i64,
}

/// Full price breakdown for a rental window. All amounts are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub total_days: u32,
    pub base_amount_cents: i64,
    pub driver_fee_cents: i64,
    pub add_ons_total_cents: i64,
    pub add_ons_breakdown: Vec<AddOnLine>,
    pub subtotal_before_adjustments_cents: i64,
    pub seasonal_adjustment_cents: i64,
    pub promo_discount_cents: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub deposit_cents: i64,
    pub balance_cents: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Return date {return_date} is before pickup date {pickup_date}")]
    InvalidPeriod {
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    },

    #[error("Add-on is not active: {0}")]
    InactiveAddOn(String),

    #[error("Add-on {name} does not apply to category {category}")]
    InapplicableAddOn { name: String, category: String },
}

/// Computes rental quotes from catalog reference data.
pub struct QuoteEngine {
    config: QuoteConfig,
}

impl QuoteEngine {
    pub fn new(config: QuoteConfig) -> Self {
        Self { config }
    }

    /// Whole rental days between pickup and return, minimum one. Same-day
    /// rentals count as one day.
    pub fn rental_days(pickup: NaiveDate, ret: NaiveDate) -> Result<u32, QuoteError> {
        let span = (ret - pickup).num_days();
        if span < 0 {
            return Err(QuoteError::InvalidPeriod {
                pickup_date: pickup,
                return_date: ret,
            });
        }
        Ok(span.max(1) as u32)
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<QuoteBreakdown, QuoteError> {
        let days = Self::rental_days(request.pickup_date, request.return_date)?;
        let days_i64 = days as i64;

        let base_amount = request.base_price_cents * days_i64;

        let driver_fee = if request.with_driver {
            self.config.driver_fee_cents_per_day * days_i64
        } else {
            0
        };

        let mut add_ons_breakdown = Vec::with_capacity(request.add_ons.len());
        let mut add_ons_total = 0i64;
        for selection in &request.add_ons {
            let add_on = &selection.add_on;
            if !add_on.is_active {
                return Err(QuoteError::InactiveAddOn(add_on.name.clone()));
            }
            if !add_on.applies_to(&request.category_slug) {
                return Err(QuoteError::InapplicableAddOn {
                    name: add_on.name.clone(),
                    category: request.category_slug.clone(),
                });
            }

            let quantity = selection.quantity.max(1) as i64;
            let line_total = if add_on.per_day {
                add_on.price_cents * days_i64 * quantity
            } else {
                add_on.price_cents * quantity
            };
            add_ons_total += line_total;
            add_ons_breakdown.push(AddOnLine {
                name: add_on.name.clone(),
                total_cents: line_total,
            });
        }

        let subtotal_before = base_amount + driver_fee + add_ons_total;

        let seasonal_adjustment = match &request.seasonal {
            Some(seasonal) => {
                let amount = percentage_of(subtotal_before, seasonal.percentage);
                match seasonal.direction {
                    AdjustmentDirection::Increase => amount,
                    AdjustmentDirection::Decrease => -amount,
                }
            }
            None => 0,
        };
        let after_seasonal = subtotal_before + seasonal_adjustment;

        let promo_discount = match &request.promo {
            Some(promo) => {
                let qualifies = promo.minimum_days.map_or(true, |min| days >= min);
                if qualifies {
                    match promo.discount {
                        PromoDiscount::Percentage(pct) => percentage_of(after_seasonal, pct),
                        PromoDiscount::FixedCents(cents) => cents.min(after_seasonal),
                    }
                } else {
                    0
                }
            }
            None => 0,
        };
        let subtotal = after_seasonal - promo_discount;

        let tax = percentage_of(subtotal, request.tax_rate_percentage);
        let total = subtotal + tax;

        let deposit = percentage_of(total, self.config.deposit_percentage);
        let balance = total - deposit;

        Ok(QuoteBreakdown {
            total_days: days,
            base_amount_cents: base_amount,
            driver_fee_cents: driver_fee,
            add_ons_total_cents: add_ons_total,
            add_ons_breakdown,
            subtotal_before_adjustments_cents: subtotal_before,
            seasonal_adjustment_cents: seasonal_adjustment,
            promo_discount_cents: promo_discount,
            subtotal_cents: subtotal,
            tax_cents: tax,
            total_cents: total,
            deposit_cents: deposit,
            balance_cents: balance,
        })
    }
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self::new(QuoteConfig::default())
    }
}

fn percentage_of(amount_cents: i64, percentage: f64) -> i64 {
    (amount_cents as f64 * percentage / 100.0).round() as i64
}
