use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::models::booking::CandidateBooking;
use crate::models::stay_rules::{
    BookingWindowRule, DemandLevel, StayRule, TriggerCondition, TriggerType,
};

/// Live property state supplied by the caller when occupancy/demand rules
/// should be matched against more than their date window.
#[derive(Debug, Clone, Default)]
pub struct LiveContext {
    pub occupancy_percent: Option<f64>,
    pub demand_level: Option<DemandLevel>,
}

/// Accessors shared by the two date-windowed rule catalogs so selection logic
/// is written once.
trait DateWindowRule {
    fn is_active(&self) -> bool;
    fn window(&self) -> (NaiveDate, NaiveDate);
    fn trigger_type(&self) -> TriggerType;
    fn trigger_condition(&self) -> &TriggerCondition;
    fn priority(&self) -> i32;
}

impl DateWindowRule for StayRule {
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
    fn trigger_type(&self) -> TriggerType {
        self.trigger_type
    }
    fn trigger_condition(&self) -> &TriggerCondition {
        &self.trigger_condition
    }
    fn priority(&self) -> i32 {
        self.priority
    }
}

impl DateWindowRule for BookingWindowRule {
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
    fn trigger_type(&self) -> TriggerType {
        self.trigger_type
    }
    fn trigger_condition(&self) -> &TriggerCondition {
        &self.trigger_condition
    }
    fn priority(&self) -> i32 {
        self.priority
    }
}

pub struct StayRuleService;

impl StayRuleService {
    /// Always returns exactly one rule: the highest-priority active rule
    /// whose window contains the check-in date, or the default.
    pub fn select_stay_rule(
        check_in: NaiveDate,
        rules: &[StayRule],
        live: Option<&LiveContext>,
    ) -> StayRule {
        Self::select(check_in, rules, live)
            .cloned()
            .unwrap_or_else(StayRule::default_rule)
    }

    pub fn select_booking_window_rule(
        check_in: NaiveDate,
        rules: &[BookingWindowRule],
        live: Option<&LiveContext>,
    ) -> BookingWindowRule {
        Self::select(check_in, rules, live)
            .cloned()
            .unwrap_or_else(BookingWindowRule::default_rule)
    }

    fn select<'a, R: DateWindowRule>(
        check_in: NaiveDate,
        rules: &'a [R],
        live: Option<&LiveContext>,
    ) -> Option<&'a R> {
        rules
            .iter()
            .filter(|rule| {
                let (start, end) = rule.window();
                rule.is_active()
                    && start <= check_in
                    && check_in <= end
                    && Self::trigger_matches(rule.trigger_type(), rule.trigger_condition(), live)
            })
            .min_by_key(|rule| (Reverse(rule.priority()), rule.trigger_type().tie_break_rank()))
    }

    /// Season/event/custom rules match on their date window alone. Occupancy
    /// and demand rules additionally require the live context to satisfy the
    /// trigger condition, when a context is supplied at all.
    fn trigger_matches(
        trigger_type: TriggerType,
        condition: &TriggerCondition,
        live: Option<&LiveContext>,
    ) -> bool {
        let Some(live) = live else {
            return true;
        };
        match trigger_type {
            TriggerType::Occupancy => match (condition.occupancy_threshold, live.occupancy_percent)
            {
                (Some(threshold), Some(current)) => current > threshold,
                _ => true,
            },
            TriggerType::Demand => match (condition.demand_level, live.demand_level) {
                (Some(required), Some(current)) => required == current,
                _ => true,
            },
            TriggerType::Season | TriggerType::Event | TriggerType::Custom => true,
        }
    }

    /// Check a candidate against the selected stay rule. Returns the violated
    /// constraint as a guest-facing message, or None when the stay is fine.
    pub fn check_stay(candidate: &CandidateBooking, rule: &StayRule) -> Option<String> {
        let nights = candidate.nights();
        if nights < rule.min_stay as i64 {
            return Some(format!(
                "Minimum stay for these dates is {} night(s)",
                rule.min_stay
            ));
        }
        if let Some(max_stay) = rule.max_stay {
            if nights > max_stay as i64 {
                return Some(format!(
                    "Maximum stay for these dates is {} night(s)",
                    max_stay
                ));
            }
        }
        None
    }

    /// Check booking lead time against the selected window rule.
    pub fn check_booking_window(
        candidate: &CandidateBooking,
        rule: &BookingWindowRule,
        today: NaiveDate,
    ) -> Option<String> {
        let advance_days = (candidate.check_in - today).num_days();
        if advance_days < 0 {
            return Some("Check-in date is in the past".to_string());
        }
        if advance_days == 0 && !rule.last_minute_booking_allowed {
            return Some("Same-day bookings are not accepted for these dates".to_string());
        }
        if advance_days > 0 && advance_days < rule.min_advance_booking as i64 {
            return Some(format!(
                "Bookings for these dates must be made at least {} day(s) in advance",
                rule.min_advance_booking
            ));
        }
        if let Some(max_advance) = rule.max_advance_booking {
            if advance_days > max_advance as i64 {
                return Some(format!(
                    "Bookings for these dates open {} day(s) before check-in",
                    max_advance
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stay_rule(
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        min_stay: u32,
        trigger: TriggerType,
        priority: i32,
    ) -> StayRule {
        StayRule {
            id: Some(ObjectId::new()),
            property_id: Some(ObjectId::new()),
            name: name.to_string(),
            start_date: start,
            end_date: end,
            min_stay,
            max_stay: None,
            trigger_type: trigger,
            trigger_condition: TriggerCondition::default(),
            priority,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_highest_priority_rule_wins() {
        let rules = vec![
            stay_rule(
                "base season",
                date(2024, 6, 1),
                date(2024, 8, 31),
                1,
                TriggerType::Season,
                1,
            ),
            stay_rule(
                "festival weekend",
                date(2024, 7, 1),
                date(2024, 7, 7),
                3,
                TriggerType::Event,
                5,
            ),
        ];

        let selected = StayRuleService::select_stay_rule(date(2024, 7, 3), &rules, None);
        assert_eq!(selected.name, "festival weekend");
        assert_eq!(selected.min_stay, 3);
    }

    #[test]
    fn test_priority_tie_broken_by_trigger_order() {
        // Same priority, overlapping windows: season beats event, event
        // beats demand, and so on down to custom.
        let rules = vec![
            stay_rule(
                "custom",
                date(2024, 6, 1),
                date(2024, 6, 30),
                2,
                TriggerType::Custom,
                3,
            ),
            stay_rule(
                "event",
                date(2024, 6, 1),
                date(2024, 6, 30),
                2,
                TriggerType::Event,
                3,
            ),
            stay_rule(
                "season",
                date(2024, 6, 1),
                date(2024, 6, 30),
                2,
                TriggerType::Season,
                3,
            ),
        ];

        let selected = StayRuleService::select_stay_rule(date(2024, 6, 15), &rules, None);
        assert_eq!(selected.name, "season");
    }

    #[test]
    fn test_default_rule_when_nothing_matches() {
        let rules = vec![stay_rule(
            "high season",
            date(2024, 12, 20),
            date(2025, 1, 5),
            4,
            TriggerType::Season,
            10,
        )];

        let selected = StayRuleService::select_stay_rule(date(2024, 6, 15), &rules, None);
        assert!(selected.id.is_none());
        assert_eq!(selected.min_stay, 1);
    }

    #[test]
    fn test_inactive_rules_skipped() {
        let mut rule = stay_rule(
            "disabled",
            date(2024, 6, 1),
            date(2024, 6, 30),
            5,
            TriggerType::Season,
            10,
        );
        rule.is_active = false;

        let selected = StayRuleService::select_stay_rule(date(2024, 6, 15), &[rule], None);
        assert!(selected.id.is_none());
    }

    #[test]
    fn test_occupancy_trigger_needs_threshold_exceeded() {
        let mut rule = stay_rule(
            "busy nights",
            date(2024, 6, 1),
            date(2024, 6, 30),
            2,
            TriggerType::Occupancy,
            10,
        );
        rule.trigger_condition.occupancy_threshold = Some(80.0);

        let below = LiveContext {
            occupancy_percent: Some(60.0),
            demand_level: None,
        };
        let above = LiveContext {
            occupancy_percent: Some(92.0),
            demand_level: None,
        };

        let selected =
            StayRuleService::select_stay_rule(date(2024, 6, 15), &[rule.clone()], Some(&below));
        assert!(selected.id.is_none());

        let selected =
            StayRuleService::select_stay_rule(date(2024, 6, 15), &[rule.clone()], Some(&above));
        assert_eq!(selected.name, "busy nights");

        // Without live context the rule matches on its window alone.
        let selected = StayRuleService::select_stay_rule(date(2024, 6, 15), &[rule], None);
        assert_eq!(selected.name, "busy nights");
    }

    #[test]
    fn test_check_stay_bounds() {
        let mut rule = stay_rule(
            "summer",
            date(2024, 6, 1),
            date(2024, 8, 31),
            3,
            TriggerType::Season,
            1,
        );
        rule.max_stay = Some(7);

        let candidate = |nights: u32| CandidateBooking {
            property_id: ObjectId::new(),
            check_in: date(2024, 6, 10),
            check_out: date(2024, 6, 10) + chrono::Duration::days(nights as i64),
            guests: 2,
            rooms: 1,
            category_id: None,
        };

        assert!(StayRuleService::check_stay(&candidate(2), &rule).is_some());
        assert!(StayRuleService::check_stay(&candidate(3), &rule).is_none());
        assert!(StayRuleService::check_stay(&candidate(7), &rule).is_none());
        assert!(StayRuleService::check_stay(&candidate(8), &rule).is_some());
    }

    #[test]
    fn test_check_booking_window() {
        let mut rule = BookingWindowRule::default_rule();
        rule.min_advance_booking = 2;
        rule.max_advance_booking = Some(90);
        rule.last_minute_booking_allowed = false;

        let today = date(2024, 6, 1);
        let candidate = |check_in: NaiveDate| CandidateBooking {
            property_id: ObjectId::new(),
            check_in,
            check_out: check_in + chrono::Duration::days(2),
            guests: 2,
            rooms: 1,
            category_id: None,
        };

        assert!(
            StayRuleService::check_booking_window(&candidate(date(2024, 6, 1)), &rule, today)
                .is_some()
        );
        assert!(
            StayRuleService::check_booking_window(&candidate(date(2024, 6, 2)), &rule, today)
                .is_some()
        );
        assert!(
            StayRuleService::check_booking_window(&candidate(date(2024, 6, 5)), &rule, today)
                .is_none()
        );
        assert!(
            StayRuleService::check_booking_window(&candidate(date(2024, 9, 15)), &rule, today)
                .is_some()
        );

        let defaults = BookingWindowRule::default_rule();
        assert!(
            StayRuleService::check_booking_window(&candidate(date(2024, 6, 1)), &defaults, today)
                .is_none()
        );
    }
}
