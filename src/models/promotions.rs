use std::collections::HashMap;

use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    BuyXGetY,
    FreeNights,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuyXGetY {
    pub buy_nights: u32,
    pub get_free_nights: u32,
    pub max_free_nights: Option<u32>,
}

/// Eligibility predicates. Every populated field must hold for the rule to
/// apply; absent fields are unconstrained.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PromotionConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stay_nights: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stay_nights: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_booking_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_booking_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_guests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_guests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rooms: Option<u32>,
    /// Days between booking date and check-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_advance_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_advance_days: Option<i64>,
    /// Allowed check-in days of week (0 = Sunday).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_time_customers_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_customers_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit_per_customer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_coupon_code: Option<bool>,
}

/// Presentation metadata carried through for the booking UI. `priority`
/// breaks ties between promotions yielding the same discount.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DisplaySettings {
    pub title: Option<String>,
    pub badge_text: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromotionRule {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: Option<ObjectId>,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_x_get_y: Option<BuyXGetY>,
    #[serde(default)]
    pub conditions: PromotionConditions,
    #[serde(default)]
    pub display_settings: DisplaySettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Redemptions so far, maintained by the booking flow after confirmation.
    /// The evaluator only reads it.
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// What the booking flow knows about the guest at quote time. Usage counters
/// are tracked externally and keyed by promotion id (hex).
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CustomerContext {
    #[serde(default)]
    pub previous_bookings: u32,
    #[serde(default)]
    pub usage_by_promotion: HashMap<String, u32>,
}

impl CustomerContext {
    pub fn uses_of(&self, promotion_id: &Option<ObjectId>) -> u32 {
        promotion_id
            .as_ref()
            .map(|id| id.to_hex())
            .and_then(|hex| self.usage_by_promotion.get(&hex).copied())
            .unwrap_or(0)
    }
}

fn default_true() -> bool {
    true
}
