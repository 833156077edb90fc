use actix_web::{web, HttpResponse, Responder};
use bson::doc;
use chrono::Utc;
use futures::TryStreamExt;
use log::{error, warn};
use mongodb::{bson::oid::ObjectId, Client};
use std::sync::Arc;

use crate::models::booking::{CandidateBooking, QuoteRequest, RateQuote};
use crate::models::promotions::PromotionRule;
use crate::models::property::{BlockedDateRange, Property};
use crate::models::stay_rules::{BookingWindowRule, StayRule};
use crate::services::pricing_client::PricingClient;
use crate::services::promotion_service::{PromotionMatch, PromotionService};
use crate::services::quote_service::{QuoteConfig, QuoteError, QuoteService};
use crate::services::stay_rule_service::{LiveContext, StayRuleService};

pub(crate) struct EvaluatedCandidate {
    pub property: Property,
    pub candidate: CandidateBooking,
    pub quote: RateQuote,
    pub stay_rule: StayRule,
    pub booking_window_rule: BookingWindowRule,
    pub promotion: Option<PromotionMatch>,
    pub discount_amount: f64,
    pub total_due: f64,
}

/// Fetch everything a candidate stay needs and run the three evaluators.
/// Shared by the quote endpoint and the booking endpoint, which re-quotes
/// server-side before accepting a booking.
pub(crate) async fn evaluate_candidate(
    client: &Client,
    pricing: Option<&PricingClient>,
    config: &QuoteConfig,
    property_id: ObjectId,
    req: &QuoteRequest,
) -> Result<EvaluatedCandidate, HttpResponse> {
    let db = client.database("Stayflow");

    let properties: mongodb::Collection<Property> = db.collection("Properties");
    let property = match properties.find_one(doc! { "_id": property_id }).await {
        Ok(Some(property)) => property,
        Ok(None) => {
            return Err(HttpResponse::NotFound().body("Property not found"));
        }
        Err(err) => {
            error!("Failed to fetch property {}: {:?}", property_id, err);
            return Err(upstream_unavailable("property store unavailable"));
        }
    };

    let blocked: mongodb::Collection<BlockedDateRange> = db.collection("BlockedDates");
    let blocked_ranges = match blocked.find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<BlockedDateRange>>().await {
            Ok(ranges) => ranges,
            Err(err) => {
                error!("Failed to collect blocked dates: {:?}", err);
                return Err(upstream_unavailable("availability calendar unavailable"));
            }
        },
        Err(err) => {
            error!("Failed to fetch blocked dates: {:?}", err);
            return Err(upstream_unavailable("availability calendar unavailable"));
        }
    };

    // A configured dynamic-pricing source that fails is an explicit error,
    // never silently skipped.
    let dynamic_pricing = match pricing {
        Some(pricing) => {
            match pricing
                .fetch(
                    &property_id.to_hex(),
                    req.check_in,
                    req.check_out,
                    req.guests,
                    req.category_id.as_deref(),
                )
                .await
            {
                Ok(result) => Some(result),
                Err(err) => {
                    error!("Dynamic pricing fetch failed: {}", err);
                    return Err(upstream_unavailable("dynamic pricing unavailable"));
                }
            }
        }
        None => None,
    };

    let candidate = CandidateBooking {
        property_id,
        check_in: req.check_in,
        check_out: req.check_out,
        guests: req.guests,
        rooms: req.rooms,
        category_id: req.category_id.clone(),
    };

    let quote = match QuoteService::compute_quote(
        &candidate,
        &property,
        dynamic_pricing.as_ref(),
        &blocked_ranges,
        config,
    ) {
        Ok(quote) => quote,
        Err(err) => return Err(quote_error_response(err)),
    };

    let stay_rules: mongodb::Collection<StayRule> = db.collection("StayRules");
    let stay_catalog = match stay_rules.find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<StayRule>>().await {
            Ok(rules) => rules,
            Err(err) => {
                error!("Failed to collect stay rules: {:?}", err);
                return Err(upstream_unavailable("stay rule catalog unavailable"));
            }
        },
        Err(err) => {
            error!("Failed to fetch stay rules: {:?}", err);
            return Err(upstream_unavailable("stay rule catalog unavailable"));
        }
    };

    let window_rules: mongodb::Collection<BookingWindowRule> =
        db.collection("BookingWindowRules");
    let window_catalog = match window_rules
        .find(doc! { "property_id": property_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<BookingWindowRule>>().await {
            Ok(rules) => rules,
            Err(err) => {
                error!("Failed to collect booking window rules: {:?}", err);
                return Err(upstream_unavailable("booking window catalog unavailable"));
            }
        },
        Err(err) => {
            error!("Failed to fetch booking window rules: {:?}", err);
            return Err(upstream_unavailable("booking window catalog unavailable"));
        }
    };

    let live = LiveContext {
        occupancy_percent: req.current_occupancy_percent,
        demand_level: req.current_demand_level,
    };
    let live = (live.occupancy_percent.is_some() || live.demand_level.is_some()).then_some(live);

    let today = Utc::now().date_naive();
    let stay_rule = StayRuleService::select_stay_rule(req.check_in, &stay_catalog, live.as_ref());
    let booking_window_rule =
        StayRuleService::select_booking_window_rule(req.check_in, &window_catalog, live.as_ref());

    if let Some(violation) = StayRuleService::check_stay(&candidate, &stay_rule) {
        return Err(HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": violation,
            "rule": stay_rule.name,
        })));
    }
    if let Some(violation) =
        StayRuleService::check_booking_window(&candidate, &booking_window_rule, today)
    {
        return Err(HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": violation,
            "rule": booking_window_rule.name,
        })));
    }

    let promotions: mongodb::Collection<PromotionRule> = db.collection("Promotions");
    let promo_catalog = match promotions.find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<PromotionRule>>().await {
            Ok(rules) => rules,
            Err(err) => {
                error!("Failed to collect promotions: {:?}", err);
                return Err(upstream_unavailable("promotion catalog unavailable"));
            }
        },
        Err(err) => {
            error!("Failed to fetch promotions: {:?}", err);
            return Err(upstream_unavailable("promotion catalog unavailable"));
        }
    };

    let promotion = PromotionService::find_best_promotion(
        &candidate,
        quote.subtotal,
        &promo_catalog,
        &req.customer,
        req.coupon_code.as_deref(),
        today,
    );
    if req.coupon_code.is_some() && promotion.is_none() {
        warn!(
            "Coupon {:?} supplied but no promotion applied for property {}",
            req.coupon_code, property_id
        );
    }

    let discount_amount = promotion
        .as_ref()
        .map(|p| p.discount_amount)
        .unwrap_or(0.0);
    let total_due = (quote.final_total - discount_amount).max(0.0);

    Ok(EvaluatedCandidate {
        property,
        candidate,
        quote,
        stay_rule,
        booking_window_rule,
        promotion,
        discount_amount,
        total_due,
    })
}

fn upstream_unavailable(message: &str) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(QuoteError::UpstreamUnavailable {
        message: message.to_string(),
    })
}

fn quote_error_response(err: QuoteError) -> HttpResponse {
    let status = match &err {
        QuoteError::InvalidInput { .. } => actix_web::http::StatusCode::BAD_REQUEST,
        QuoteError::NoPriceAvailable => actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
        QuoteError::DateBlocked { .. } => actix_web::http::StatusCode::CONFLICT,
        QuoteError::UpstreamUnavailable { .. } => actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
    };
    HttpResponse::build(status).json(err)
}

/*
    POST /api/properties/{id}/quote
*/
pub async fn get_quote(
    data: web::Data<Arc<Client>>,
    pricing: web::Data<Option<Arc<PricingClient>>>,
    config: web::Data<QuoteConfig>,
    path: web::Path<String>,
    input: web::Json<QuoteRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    let input = input.into_inner();
    let evaluated = match evaluate_candidate(
        &client,
        pricing.get_ref().as_ref().map(|p| p.as_ref()),
        &config,
        property_id,
        &input,
    )
    .await
    {
        Ok(evaluated) => evaluated,
        Err(response) => return response,
    };

    let promotion = evaluated.promotion.as_ref().map(|p| {
        serde_json::json!({
            "id": p.rule.id.map(|id| id.to_hex()),
            "name": p.rule.name,
            "title": p.rule.display_settings.title,
            "badge_text": p.rule.display_settings.badge_text,
            "discount_amount": p.discount_amount,
        })
    });

    HttpResponse::Ok().json(serde_json::json!({
        "quote": evaluated.quote,
        "currency": evaluated.property.currency,
        "stay_rule": evaluated.stay_rule,
        "booking_window_rule": evaluated.booking_window_rule,
        "promotion": promotion,
        "discount_amount": evaluated.discount_amount,
        "total_due": evaluated.total_due,
    }))
}
