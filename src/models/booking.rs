use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::promotions::CustomerContext;
use crate::models::stay_rules::DemandLevel;

/// The candidate stay all three evaluators operate on.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CandidateBooking {
    pub property_id: ObjectId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
    pub category_id: Option<String>,
}

impl CandidateBooking {
    /// Whole days between check-in and check-out. Negative or zero means the
    /// date range is invalid.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateQuote {
    pub nights: u32,
    pub base_price_per_night: f64,
    pub base_room_total: f64,
    pub extra_guests: u32,
    pub extra_guest_charge: f64,
    pub subtotal: f64,
    pub taxes: f64,
    pub final_total: f64,
    pub is_dynamic_pricing: bool,
}

/// Body of the quote endpoint. Dates that fail parsing are rejected by serde
/// at the boundary, never coerced.
#[derive(Debug, Deserialize, Clone)]
pub struct QuoteRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
    pub category_id: Option<String>,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub customer: CustomerContext,
    pub current_occupancy_percent: Option<f64>,
    pub current_demand_level: Option<DemandLevel>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRequest {
    #[serde(flatten)]
    pub quote: QuoteRequest,
    pub guest_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Total the guest saw. The server recomputes and rejects on mismatch.
    pub expected_total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingDetails {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub reference: String,
    pub guest_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
    pub category_id: Option<String>,
    pub quote: RateQuote,
    pub promotion_id: Option<ObjectId>,
    pub discount_amount: f64,
    pub total_due: f64,
    pub transaction_id: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}
