use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::booking::CandidateBooking;
use crate::models::promotions::{CustomerContext, DiscountType, PromotionRule};

#[derive(Debug, Clone, Serialize)]
pub struct PromotionMatch {
    pub rule: PromotionRule,
    pub discount_amount: f64,
}

pub struct PromotionService;

impl PromotionService {
    /// Best applicable discount for the candidate, or None. Pure and
    /// read-only: usage counters are only checked here, never decremented.
    pub fn find_best_promotion(
        candidate: &CandidateBooking,
        booking_amount: f64,
        catalog: &[PromotionRule],
        customer: &CustomerContext,
        coupon_code: Option<&str>,
        today: NaiveDate,
    ) -> Option<PromotionMatch> {
        catalog
            .iter()
            .filter(|rule| {
                rule.is_active
                    && Self::conditions_met(rule, candidate, booking_amount, customer, coupon_code, today)
            })
            .filter_map(|rule| {
                let discount = Self::discount_amount(rule, candidate.nights(), booking_amount);
                (discount.is_finite() && discount > 0.0).then(|| PromotionMatch {
                    rule: rule.clone(),
                    discount_amount: discount,
                })
            })
            .max_by(|a, b| {
                a.discount_amount
                    .partial_cmp(&b.discount_amount)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        a.rule
                            .display_settings
                            .priority
                            .cmp(&b.rule.display_settings.priority)
                    })
            })
    }

    /// Logical AND over every populated condition.
    fn conditions_met(
        rule: &PromotionRule,
        candidate: &CandidateBooking,
        booking_amount: f64,
        customer: &CustomerContext,
        coupon_code: Option<&str>,
        today: NaiveDate,
    ) -> bool {
        let c = &rule.conditions;
        let nights = candidate.nights();
        let advance_days = (candidate.check_in - today).num_days();

        if c.valid_from.map_or(false, |from| today < from) {
            return false;
        }
        if c.valid_until.map_or(false, |until| today > until) {
            return false;
        }

        if c.min_stay_nights.map_or(false, |min| nights < min as i64) {
            return false;
        }
        if c.max_stay_nights.map_or(false, |max| nights > max as i64) {
            return false;
        }

        if c.min_booking_amount
            .map_or(false, |min| booking_amount < min)
        {
            return false;
        }
        if c.max_booking_amount
            .map_or(false, |max| booking_amount > max)
        {
            return false;
        }

        if c.min_guests.map_or(false, |min| candidate.guests < min) {
            return false;
        }
        if c.max_guests.map_or(false, |max| candidate.guests > max) {
            return false;
        }
        if c.min_rooms.map_or(false, |min| candidate.rooms < min) {
            return false;
        }
        if c.max_rooms.map_or(false, |max| candidate.rooms > max) {
            return false;
        }

        if c.min_advance_days.map_or(false, |min| advance_days < min) {
            return false;
        }
        if c.max_advance_days.map_or(false, |max| advance_days > max) {
            return false;
        }

        if let Some(days) = &c.days_of_week {
            let check_in_day = candidate.check_in.weekday().num_days_from_sunday() as u8;
            if !days.contains(&check_in_day) {
                return false;
            }
        }

        if c.first_time_customers_only.unwrap_or(false) && customer.previous_bookings > 0 {
            return false;
        }
        if c.repeat_customers_only.unwrap_or(false) && customer.previous_bookings == 0 {
            return false;
        }

        if c.requires_coupon_code.unwrap_or(false) {
            let matches = match (&rule.coupon_code, coupon_code) {
                (Some(expected), Some(supplied)) => expected.eq_ignore_ascii_case(supplied),
                _ => false,
            };
            if !matches {
                return false;
            }
        }

        if c.usage_limit_total
            .map_or(false, |limit| rule.usage_count >= limit)
        {
            return false;
        }
        if c.usage_limit_per_customer
            .map_or(false, |limit| customer.uses_of(&rule.id) >= limit)
        {
            return false;
        }

        true
    }

    /// Discount for a rule that already passed its conditions, clamped to
    /// `[0, booking_amount]` for every type.
    fn discount_amount(rule: &PromotionRule, nights: i64, booking_amount: f64) -> f64 {
        if nights <= 0 || !booking_amount.is_finite() || booking_amount <= 0.0 {
            return 0.0;
        }

        let raw = match rule.discount_type {
            DiscountType::Percentage => {
                let mut discount = booking_amount * rule.discount_value / 100.0;
                if let Some(max) = rule.max_discount_amount {
                    discount = discount.min(max);
                }
                if let Some(min) = rule.min_discount_amount {
                    discount = discount.max(min);
                }
                discount
            }
            DiscountType::FixedAmount => rule.discount_value,
            DiscountType::BuyXGetY => match &rule.buy_x_get_y {
                Some(offer) if offer.buy_nights > 0 && nights >= offer.buy_nights as i64 => {
                    let earned = (nights / offer.buy_nights as i64) * offer.get_free_nights as i64;
                    let cap = offer.max_free_nights.map(|m| m as i64).unwrap_or(nights);
                    let free_nights = earned.min(cap).min(nights);
                    free_nights as f64 * (booking_amount / nights as f64)
                }
                _ => 0.0,
            },
            DiscountType::FreeNights => {
                let free_nights = rule.discount_value;
                if free_nights >= 1.0 && nights as f64 >= free_nights {
                    free_nights * (booking_amount / nights as f64)
                } else {
                    0.0
                }
            }
        };

        raw.clamp(0.0, booking_amount)
    }
}
