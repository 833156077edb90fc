use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoomCategory {
    pub id: String,
    pub name: String,
    pub price_per_night: f64,
    pub max_occupancy: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub currency: String,
    pub base_price_per_night: Option<f64>,
    #[serde(default)]
    pub categories: Vec<RoomCategory>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl Property {
    pub fn category_price(&self, category_id: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.price_per_night)
    }
}

/// One entry in a property's unavailability calendar. Dates are inclusive,
/// calendar-day granularity. A missing `category_id` blocks the whole property.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlockedDateRange {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub reason: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl BlockedDateRange {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    pub fn applies_to_category(&self, category_id: Option<&str>) -> bool {
        match &self.category_id {
            None => true,
            Some(block_category) => category_id == Some(block_category.as_str()),
        }
    }
}

fn default_true() -> bool {
    true
}
