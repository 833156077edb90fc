use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response shape of the external dynamic-pricing read endpoint.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DynamicPricingResult {
    pub selected_category: Option<PricedCategory>,
    #[serde(default)]
    pub available_categories: Vec<PricedCategory>,
    #[serde(default)]
    pub active_pricing_factors: Vec<PricingFactor>,
    pub availability_control: Option<AvailabilityControl>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PricedCategory {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PricingFactor {
    pub name: String,
    pub adjustment_percent: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AvailabilityControl {
    #[serde(default)]
    pub blocked_dates: Vec<NaiveDate>,
}
