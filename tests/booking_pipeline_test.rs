use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serial_test::serial;

use stayflow_api::models::booking::CandidateBooking;
use stayflow_api::models::promotions::{
    CustomerContext, DiscountType, DisplaySettings, PromotionConditions, PromotionRule,
};
use stayflow_api::models::property::{Property, RoomCategory};
use stayflow_api::models::stay_rules::{StayRule, TriggerCondition, TriggerType};
use stayflow_api::services::promotion_service::PromotionService;
use stayflow_api::services::quote_service::{QuoteConfig, QuoteService};
use stayflow_api::services::stay_rule_service::StayRuleService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn property() -> Property {
    Property {
        id: Some(ObjectId::new()),
        name: "Cedar Lodge".to_string(),
        currency: "INR".to_string(),
        base_price_per_night: Some(2000.0),
        categories: vec![RoomCategory {
            id: "suite".to_string(),
            name: "Suite".to_string(),
            price_per_night: 3500.0,
            max_occupancy: Some(4),
        }],
        created_at: None,
        updated_at: None,
    }
}

fn candidate(check_in: NaiveDate, nights: u32) -> CandidateBooking {
    CandidateBooking {
        property_id: ObjectId::new(),
        check_in,
        check_out: check_in + chrono::Duration::days(nights as i64),
        guests: 2,
        rooms: 1,
        category_id: None,
    }
}

fn coupon_promotion() -> PromotionRule {
    PromotionRule {
        id: Some(ObjectId::new()),
        property_id: None,
        name: "Summer saver".to_string(),
        discount_type: DiscountType::FixedAmount,
        discount_value: 1000.0,
        min_discount_amount: None,
        max_discount_amount: None,
        buy_x_get_y: None,
        conditions: PromotionConditions {
            requires_coupon_code: Some(true),
            min_stay_nights: Some(2),
            ..PromotionConditions::default()
        },
        display_settings: DisplaySettings {
            title: Some("Summer saver".to_string()),
            badge_text: Some("₹1000 off".to_string()),
            priority: 1,
        },
        coupon_code: Some("SUMMER24".to_string()),
        usage_count: 0,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

/// Full evaluator pipeline as the quote route runs it: price the stay, pick
/// the stay rule, apply the best promotion, derive the amount due.
#[test]
fn test_quote_rule_and_promotion_pipeline() {
    let check_in = date(2024, 7, 10);
    let candidate = candidate(check_in, 3);
    let config = QuoteConfig::default();

    let quote =
        QuoteService::compute_quote(&candidate, &property(), None, &[], &config).unwrap();
    assert_eq!(quote.final_total, 7080.0);

    let summer_rule = StayRule {
        id: Some(ObjectId::new()),
        property_id: None,
        name: "Summer minimum".to_string(),
        start_date: date(2024, 7, 1),
        end_date: date(2024, 8, 31),
        min_stay: 2,
        max_stay: Some(14),
        trigger_type: TriggerType::Season,
        trigger_condition: TriggerCondition::default(),
        priority: 5,
        is_active: true,
        created_at: None,
        updated_at: None,
    };
    let selected = StayRuleService::select_stay_rule(check_in, &[summer_rule], None);
    assert_eq!(selected.name, "Summer minimum");
    assert!(StayRuleService::check_stay(&candidate, &selected).is_none());

    let best = PromotionService::find_best_promotion(
        &candidate,
        quote.subtotal,
        &[coupon_promotion()],
        &CustomerContext::default(),
        Some("summer24"),
        date(2024, 7, 1),
    )
    .unwrap();
    assert_eq!(best.discount_amount, 1000.0);

    let total_due = (quote.final_total - best.discount_amount).max(0.0);
    assert_eq!(total_due, 6080.0);
}

#[test]
fn test_two_night_minimum_rejects_single_night() {
    let check_in = date(2024, 7, 10);
    let one_night = candidate(check_in, 1);

    let rule = StayRule {
        id: Some(ObjectId::new()),
        property_id: None,
        name: "Weekend minimum".to_string(),
        start_date: date(2024, 7, 1),
        end_date: date(2024, 8, 31),
        min_stay: 2,
        max_stay: None,
        trigger_type: TriggerType::Season,
        trigger_condition: TriggerCondition::default(),
        priority: 1,
        is_active: true,
        created_at: None,
        updated_at: None,
    };

    let selected = StayRuleService::select_stay_rule(check_in, &[rule], None);
    let violation = StayRuleService::check_stay(&one_night, &selected);
    assert!(violation.unwrap().contains("2 night"));
}

#[test]
fn test_promotion_without_coupon_is_skipped() {
    let candidate = candidate(date(2024, 7, 10), 3);
    let best = PromotionService::find_best_promotion(
        &candidate,
        6000.0,
        &[coupon_promotion()],
        &CustomerContext::default(),
        None,
        date(2024, 7, 1),
    );
    assert!(best.is_none());
}

#[test]
#[serial]
fn test_quote_config_from_env_overrides() {
    std::env::set_var("QUOTE_EXTRA_GUEST_FEE", "750");
    std::env::set_var("QUOTE_TAX_RATE", "0.12");
    std::env::set_var("QUOTE_FALLBACK_PRICE", "1800");

    let config = QuoteConfig::from_env();
    assert_eq!(config.extra_guest_fee_per_night, 750.0);
    assert_eq!(config.tax_rate, 0.12);
    assert_eq!(config.fallback_price_per_night, Some(1800.0));

    std::env::remove_var("QUOTE_EXTRA_GUEST_FEE");
    std::env::remove_var("QUOTE_TAX_RATE");
    std::env::remove_var("QUOTE_FALLBACK_PRICE");

    let config = QuoteConfig::from_env();
    assert_eq!(config.extra_guest_fee_per_night, 1000.0);
    assert_eq!(config.tax_rate, 0.18);
    assert_eq!(config.fallback_price_per_night, None);
}
