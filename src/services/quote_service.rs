use chrono::NaiveDate;
use serde::Serialize;

use crate::models::booking::{CandidateBooking, RateQuote};
use crate::models::pricing::DynamicPricingResult;
use crate::models::property::{BlockedDateRange, Property};

/// Tunables for the quote calculator, overridable from the environment.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// Charge per extra guest, per night.
    pub extra_guest_fee_per_night: f64,
    /// Guests included in the room rate before the surcharge kicks in.
    pub guests_included_per_room: u32,
    pub tax_rate: f64,
    /// Optional minimum bookable price used only when neither dynamic pricing
    /// nor the property resolves a rate. Unset by default: an unresolvable
    /// price fails the quote instead of substituting a number.
    pub fallback_price_per_night: Option<f64>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            extra_guest_fee_per_night: 1000.0,
            guests_included_per_room: 2,
            tax_rate: 0.18,
            fallback_price_per_night: None,
        }
    }
}

impl QuoteConfig {
    /// Create config from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            extra_guest_fee_per_night: std::env::var("QUOTE_EXTRA_GUEST_FEE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.extra_guest_fee_per_night),
            guests_included_per_room: std::env::var("QUOTE_GUESTS_PER_ROOM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.guests_included_per_room),
            tax_rate: std::env::var("QUOTE_TAX_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tax_rate),
            fallback_price_per_night: std::env::var("QUOTE_FALLBACK_PRICE")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Every quote failure is a value returned to the caller; nothing in this
/// module panics or substitutes defaults for bad arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteError {
    InvalidInput { message: String },
    NoPriceAvailable,
    DateBlocked { blocked_dates: Vec<NaiveDate> },
    UpstreamUnavailable { message: String },
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            QuoteError::NoPriceAvailable => write!(f, "No price available for this stay"),
            QuoteError::DateBlocked { blocked_dates } => {
                let days: Vec<String> = blocked_dates.iter().map(|d| d.to_string()).collect();
                write!(f, "Dates unavailable: {}", days.join(", "))
            }
            QuoteError::UpstreamUnavailable { message } => {
                write!(f, "Upstream unavailable: {}", message)
            }
        }
    }
}

pub struct QuoteService;

impl QuoteService {
    /// Price a candidate stay. Pure over its inputs; callers fetch the
    /// property, dynamic pricing and blocked-date calendar and re-run this
    /// whenever any candidate field changes.
    pub fn compute_quote(
        candidate: &CandidateBooking,
        property: &Property,
        dynamic_pricing: Option<&DynamicPricingResult>,
        blocked_ranges: &[BlockedDateRange],
        config: &QuoteConfig,
    ) -> Result<RateQuote, QuoteError> {
        if candidate.guests < 1 {
            return Err(QuoteError::InvalidInput {
                message: "guests must be at least 1".to_string(),
            });
        }
        if candidate.rooms < 1 {
            return Err(QuoteError::InvalidInput {
                message: "rooms must be at least 1".to_string(),
            });
        }

        let nights = candidate.nights();
        if nights <= 0 {
            return Err(QuoteError::InvalidInput {
                message: "check-out must be after check-in".to_string(),
            });
        }
        let nights = nights as u32;

        let base_price = Self::resolve_base_price(candidate, property, dynamic_pricing, config)
            .ok_or(QuoteError::NoPriceAvailable)?;

        let blocked = Self::blocked_days_in_stay(candidate, blocked_ranges, dynamic_pricing);
        if !blocked.is_empty() {
            return Err(QuoteError::DateBlocked {
                blocked_dates: blocked,
            });
        }

        let base_room_total = base_price * nights as f64 * candidate.rooms as f64;

        let included_guests = candidate.rooms * config.guests_included_per_room;
        let extra_guests = candidate.guests.saturating_sub(included_guests);
        let extra_guest_charge =
            extra_guests as f64 * config.extra_guest_fee_per_night * nights as f64;

        let subtotal = base_room_total + extra_guest_charge;
        let taxes = (subtotal * config.tax_rate).round();
        let final_total = subtotal + taxes;

        let quote = RateQuote {
            nights,
            base_price_per_night: base_price,
            base_room_total,
            extra_guests,
            extra_guest_charge,
            subtotal,
            taxes,
            final_total,
            is_dynamic_pricing: dynamic_pricing
                .map(|d| !d.active_pricing_factors.is_empty())
                .unwrap_or(false),
        };

        Self::check_amounts(&quote)?;
        Ok(quote)
    }

    /// Base-rate precedence: dynamic selected category, then the property's
    /// matching category price, then the property's flat rate, then the
    /// configured fallback. Non-finite and non-positive values never resolve.
    fn resolve_base_price(
        candidate: &CandidateBooking,
        property: &Property,
        dynamic_pricing: Option<&DynamicPricingResult>,
        config: &QuoteConfig,
    ) -> Option<f64> {
        let candidates = [
            dynamic_pricing
                .and_then(|d| d.selected_category.as_ref())
                .map(|c| c.price),
            candidate
                .category_id
                .as_deref()
                .and_then(|id| property.category_price(id)),
            property.base_price_per_night,
            config.fallback_price_per_night,
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|p| p.is_finite() && *p > 0.0)
    }

    /// Every day in `[check_in, check_out)` that an active, category-matching
    /// block covers. The full list is returned so the guest can be shown all
    /// conflicting days, not just the first.
    fn blocked_days_in_stay(
        candidate: &CandidateBooking,
        blocked_ranges: &[BlockedDateRange],
        dynamic_pricing: Option<&DynamicPricingResult>,
    ) -> Vec<NaiveDate> {
        let category = candidate.category_id.as_deref();
        let extra_blocked: &[NaiveDate] = dynamic_pricing
            .and_then(|d| d.availability_control.as_ref())
            .map(|a| a.blocked_dates.as_slice())
            .unwrap_or(&[]);

        candidate
            .check_in
            .iter_days()
            .take_while(|day| *day < candidate.check_out)
            .filter(|day| {
                blocked_ranges
                    .iter()
                    .any(|b| b.is_active && b.applies_to_category(category) && b.covers(*day))
                    || extra_blocked.contains(day)
            })
            .collect()
    }

    fn check_amounts(quote: &RateQuote) -> Result<(), QuoteError> {
        let amounts = [
            quote.base_price_per_night,
            quote.base_room_total,
            quote.extra_guest_charge,
            quote.subtotal,
            quote.taxes,
            quote.final_total,
        ];
        if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(QuoteError::InvalidInput {
                message: "quote produced a non-finite or negative amount".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::{AvailabilityControl, PricedCategory, PricingFactor};
    use crate::models::property::RoomCategory;
    use mongodb::bson::oid::ObjectId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn property(base: Option<f64>) -> Property {
        Property {
            id: Some(ObjectId::new()),
            name: "Seaside Inn".to_string(),
            currency: "INR".to_string(),
            base_price_per_night: base,
            categories: vec![RoomCategory {
                id: "deluxe".to_string(),
                name: "Deluxe".to_string(),
                price_per_night: 2500.0,
                max_occupancy: Some(3),
            }],
            created_at: None,
            updated_at: None,
        }
    }

    fn candidate(check_in: NaiveDate, check_out: NaiveDate, guests: u32, rooms: u32) -> CandidateBooking {
        CandidateBooking {
            property_id: ObjectId::new(),
            check_in,
            check_out,
            guests,
            rooms,
            category_id: None,
        }
    }

    #[test]
    fn test_three_night_stay_totals() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 4), 2, 1);
        let quote = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap();

        assert_eq!(quote.nights, 3);
        assert_eq!(quote.base_room_total, 6000.0);
        assert_eq!(quote.extra_guest_charge, 0.0);
        assert_eq!(quote.taxes, 1080.0);
        assert_eq!(quote.final_total, 7080.0);
        assert!(!quote.is_dynamic_pricing);
    }

    #[test]
    fn test_extra_guest_surcharge() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 3), 4, 1);
        let quote = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap();

        assert_eq!(quote.extra_guests, 2);
        assert_eq!(quote.extra_guest_charge, 4000.0);
        assert_eq!(quote.base_room_total, 4000.0);
        assert_eq!(quote.subtotal, 8000.0);
        assert_eq!(quote.taxes, 1440.0);
        assert_eq!(quote.final_total, 9440.0);
    }

    #[test]
    fn test_no_surcharge_when_guests_fit() {
        for (guests, rooms) in [(1u32, 1u32), (2, 1), (4, 2), (6, 3)] {
            let c = candidate(date(2024, 6, 1), date(2024, 6, 3), guests, rooms);
            let quote = QuoteService::compute_quote(
                &c,
                &property(Some(2000.0)),
                None,
                &[],
                &QuoteConfig::default(),
            )
            .unwrap();
            assert_eq!(quote.extra_guest_charge, 0.0);
        }
    }

    #[test]
    fn test_invalid_date_range_rejected() {
        let c = candidate(date(2024, 6, 4), date(2024, 6, 1), 2, 1);
        let err = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));

        let same_day = candidate(date(2024, 6, 1), date(2024, 6, 1), 2, 1);
        assert!(QuoteService::compute_quote(
            &same_day,
            &property(Some(2000.0)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .is_err());
    }

    #[test]
    fn test_no_price_available() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 3), 2, 1);
        let err = QuoteService::compute_quote(
            &c,
            &property(None),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, QuoteError::NoPriceAvailable);
    }

    #[test]
    fn test_nan_price_fails_instead_of_substituting() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 3), 2, 1);
        let err = QuoteService::compute_quote(
            &c,
            &property(Some(f64::NAN)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, QuoteError::NoPriceAvailable);
    }

    #[test]
    fn test_configured_fallback_price() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 3), 2, 1);
        let config = QuoteConfig {
            fallback_price_per_night: Some(1500.0),
            ..QuoteConfig::default()
        };
        let quote =
            QuoteService::compute_quote(&c, &property(None), None, &[], &config).unwrap();
        assert_eq!(quote.base_price_per_night, 1500.0);
    }

    #[test]
    fn test_category_price_precedence() {
        let mut c = candidate(date(2024, 6, 1), date(2024, 6, 3), 2, 1);
        c.category_id = Some("deluxe".to_string());
        let quote = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[],
            &QuoteConfig::default(),
        )
        .unwrap();
        assert_eq!(quote.base_price_per_night, 2500.0);
    }

    #[test]
    fn test_dynamic_price_wins_and_flags_quote() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 3), 2, 1);
        let dynamic = DynamicPricingResult {
            selected_category: Some(PricedCategory {
                id: "deluxe".to_string(),
                name: "Deluxe".to_string(),
                price: 3200.0,
            }),
            available_categories: vec![],
            active_pricing_factors: vec![PricingFactor {
                name: "weekend".to_string(),
                adjustment_percent: 15.0,
            }],
            availability_control: None,
        };
        let quote = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            Some(&dynamic),
            &[],
            &QuoteConfig::default(),
        )
        .unwrap();
        assert_eq!(quote.base_price_per_night, 3200.0);
        assert!(quote.is_dynamic_pricing);
    }

    #[test]
    fn test_blocked_range_lists_every_conflicting_day() {
        // Block [2024-06-10, 2024-06-12] inclusive; stay 06-09 to 06-11
        // touches only 06-10 within [check_in, check_out).
        let c = candidate(date(2024, 6, 9), date(2024, 6, 11), 2, 1);
        let block = BlockedDateRange {
            id: None,
            property_id: c.property_id,
            start_date: date(2024, 6, 10),
            end_date: date(2024, 6, 12),
            category_id: None,
            reason: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let err = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[block.clone()],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuoteError::DateBlocked {
                blocked_dates: vec![date(2024, 6, 10)]
            }
        );

        // A longer stay across the block reports every blocked day.
        let c2 = candidate(date(2024, 6, 9), date(2024, 6, 14), 2, 1);
        let err2 = QuoteService::compute_quote(
            &c2,
            &property(Some(2000.0)),
            None,
            &[block],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err2,
            QuoteError::DateBlocked {
                blocked_dates: vec![date(2024, 6, 10), date(2024, 6, 11), date(2024, 6, 12)]
            }
        );
    }

    #[test]
    fn test_inactive_and_other_category_blocks_ignored() {
        let mut c = candidate(date(2024, 6, 9), date(2024, 6, 11), 2, 1);
        c.category_id = Some("deluxe".to_string());

        let inactive = BlockedDateRange {
            id: None,
            property_id: c.property_id,
            start_date: date(2024, 6, 9),
            end_date: date(2024, 6, 12),
            category_id: None,
            reason: None,
            is_active: false,
            created_at: None,
            updated_at: None,
        };
        let other_category = BlockedDateRange {
            category_id: Some("suite".to_string()),
            is_active: true,
            ..inactive.clone()
        };

        assert!(QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            None,
            &[inactive, other_category],
            &QuoteConfig::default(),
        )
        .is_ok());
    }

    #[test]
    fn test_dynamic_blocked_dates_checked() {
        let c = candidate(date(2024, 6, 9), date(2024, 6, 11), 2, 1);
        let dynamic = DynamicPricingResult {
            selected_category: None,
            available_categories: vec![],
            active_pricing_factors: vec![],
            availability_control: Some(AvailabilityControl {
                blocked_dates: vec![date(2024, 6, 10)],
            }),
        };
        let err = QuoteService::compute_quote(
            &c,
            &property(Some(2000.0)),
            Some(&dynamic),
            &[],
            &QuoteConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuoteError::DateBlocked {
                blocked_dates: vec![date(2024, 6, 10)]
            }
        );
    }

    #[test]
    fn test_quote_is_idempotent() {
        let c = candidate(date(2024, 6, 1), date(2024, 6, 4), 3, 1);
        let p = property(Some(1750.0));
        let config = QuoteConfig::default();
        let first = QuoteService::compute_quote(&c, &p, None, &[], &config).unwrap();
        let second = QuoteService::compute_quote(&c, &p, None, &[], &config).unwrap();
        assert_eq!(first, second);
    }
}
