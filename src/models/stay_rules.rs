use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Season,
    Demand,
    Occupancy,
    Event,
    Custom,
}

impl TriggerType {
    /// Tie-break order when two matching rules share the same priority:
    /// season, event, demand, occupancy, custom. Lower rank wins.
    pub fn tie_break_rank(self) -> u8 {
        match self {
            TriggerType::Season => 0,
            TriggerType::Event => 1,
            TriggerType::Demand => 2,
            TriggerType::Occupancy => 3,
            TriggerType::Custom => 4,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

/// Variant payload for a rule's trigger. Exactly one field is populated,
/// matching the rule's `trigger_type`; season/event/custom rules carry at
/// most a label.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TriggerCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand_level: Option<DemandLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_label: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StayRule {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: Option<ObjectId>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_stay: u32,
    pub max_stay: Option<u32>,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_condition: TriggerCondition,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl StayRule {
    /// Fallback when no catalog rule matches the candidate's check-in date.
    pub fn default_rule() -> Self {
        Self {
            id: None,
            property_id: None,
            name: "Default stay rule".to_string(),
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            min_stay: 1,
            max_stay: None,
            trigger_type: TriggerType::Custom,
            trigger_condition: TriggerCondition::default(),
            priority: 0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingWindowRule {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: Option<ObjectId>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Minimum days between booking date and check-in.
    pub min_advance_booking: u32,
    pub max_advance_booking: Option<u32>,
    pub last_minute_booking_allowed: bool,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_condition: TriggerCondition,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl BookingWindowRule {
    pub fn default_rule() -> Self {
        Self {
            id: None,
            property_id: None,
            name: "Default booking window".to_string(),
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MAX,
            min_advance_booking: 0,
            max_advance_booking: None,
            last_minute_booking_allowed: true,
            trigger_type: TriggerType::Custom,
            trigger_condition: TriggerCondition::default(),
            priority: 0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

fn default_true() -> bool {
    true
}
