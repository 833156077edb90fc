use actix_web::{web, HttpResponse, Responder};
use bson::{doc, DateTime};
use futures::TryStreamExt;
use log::{error, warn};
use mongodb::{bson::oid::ObjectId, Client};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::booking::{BookingDetails, BookingRequest};
use crate::models::promotions::PromotionRule;
use crate::routes::quote::evaluate_candidate;
use crate::services::payment::gateway::HttpPaymentGateway;
use crate::services::payment::interface::{ChargeRequest, PaymentError, PaymentOperations};
use crate::services::pricing_client::PricingClient;
use crate::services::quote_service::QuoteConfig;

fn booking_reference() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("SF-{}", code.to_uppercase())
}

/*
    POST /api/properties/{id}/bookings

    Recomputes the quote server-side, rejects stale client totals, stores the
    booking and then invokes the payment gateway.
*/
pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    pricing: web::Data<Option<Arc<PricingClient>>>,
    gateway: web::Data<Option<Arc<HttpPaymentGateway>>>,
    config: web::Data<QuoteConfig>,
    path: web::Path<String>,
    input: web::Json<BookingRequest>,
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
        &input.quote,
    )
    .await
    {
        Ok(evaluated) => evaluated,
        Err(response) => return response,
    };

    // The guest confirmed a number on screen; if the catalogs moved since
    // then, surface the new total instead of charging a different amount.
    if (evaluated.total_due - input.expected_total).abs() > 0.01 {
        return HttpResponse::Conflict().json(serde_json::json!({
            "error": "Quoted total has changed, please review before booking",
            "total_due": evaluated.total_due,
        }));
    }

    let collection: mongodb::Collection<BookingDetails> =
        client.database("Stayflow").collection("Bookings");

    let time = DateTime::now();
    let booking = BookingDetails {
        id: None,
        property_id,
        reference: booking_reference(),
        guest_name: input.guest_name,
        email: input.email,
        phone: input.phone,
        check_in: evaluated.candidate.check_in,
        check_out: evaluated.candidate.check_out,
        guests: evaluated.candidate.guests,
        rooms: evaluated.candidate.rooms,
        category_id: evaluated.candidate.category_id.clone(),
        quote: evaluated.quote.clone(),
        promotion_id: evaluated.promotion.as_ref().and_then(|p| p.rule.id),
        discount_amount: evaluated.discount_amount,
        total_due: evaluated.total_due,
        transaction_id: None,
        status: "pending".to_string(),
        created_at: Some(time),
        updated_at: Some(time),
    };

    let insert_result = match collection.insert_one(&booking).await {
        Ok(result) => result,
        Err(err) => {
            error!("Failed to create booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create booking");
        }
    };
    let booking_id = insert_result
        .inserted_id
        .as_object_id()
        .map(|id| id.to_hex())
        .unwrap_or_default();

    let Some(gateway) = gateway.get_ref() else {
        // No gateway configured: leave the booking pending for manual capture.
        return HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "booking_id": booking_id,
            "reference": booking.reference,
            "status": "pending",
            "total_due": booking.total_due,
        }));
    };

    let charge = ChargeRequest {
        idempotency_key: Uuid::new_v4(),
        booking_reference: booking.reference.clone(),
        amount: booking.total_due,
        currency: evaluated.property.currency.clone(),
        email: booking.email.clone(),
    };

    match gateway.charge(charge).await {
        Ok(outcome) => {
            let update = doc! {
                "$set": {
                    "status": "confirmed",
                    "transaction_id": outcome.transaction_id.as_str(),
                    "updated_at": DateTime::now(),
                }
            };
            if let Err(err) = collection
                .update_one(doc! { "_id": insert_result.inserted_id }, update)
                .await
            {
                error!("Payment captured but booking update failed: {:?}", err);
                return HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "warning": "Payment captured but booking status update failed",
                    "booking_id": booking_id,
                    "reference": booking.reference,
                    "transaction_id": outcome.transaction_id,
                }));
            }

            record_promotion_use(&client, &booking).await;

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "booking_id": booking_id,
                "reference": booking.reference,
                "status": "confirmed",
                "transaction_id": outcome.transaction_id,
                "total_due": booking.total_due,
            }))
        }
        Err(PaymentError::Declined) => {
            let update = doc! {
                "$set": { "status": "payment_failed", "updated_at": DateTime::now() }
            };
            let _ = collection
                .update_one(doc! { "_id": insert_result.inserted_id }, update)
                .await;

            HttpResponse::PaymentRequired().json(serde_json::json!({
                "success": false,
                "booking_id": booking_id,
                "reference": booking.reference,
                "error": "Payment was declined",
            }))
        }
        Err(PaymentError::GatewayUnavailable) => {
            warn!(
                "Payment gateway unavailable, booking {} left pending",
                booking.reference
            );
            HttpResponse::Accepted().json(serde_json::json!({
                "success": true,
                "booking_id": booking_id,
                "reference": booking.reference,
                "status": "pending",
                "warning": "Payment could not be processed yet, the booking is held",
            }))
        }
    }
}

/// Usage counters live on the promotion document; they are incremented only
/// once a booking is confirmed.
async fn record_promotion_use(client: &Client, booking: &BookingDetails) {
    let Some(promotion_id) = booking.promotion_id else {
        return;
    };
    let promotions: mongodb::Collection<PromotionRule> =
        client.database("Stayflow").collection("Promotions");
    if let Err(err) = promotions
        .update_one(
            doc! { "_id": promotion_id },
            doc! { "$inc": { "usage_count": 1 } },
        )
        .await
    {
        error!(
            "Failed to record promotion use for booking {}: {:?}",
            booking.reference, err
        );
    }
}

/*
    GET /api/properties/{id}/bookings
*/
pub async fn get_bookings(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.into_inner();
    let property_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    let collection: mongodb::Collection<BookingDetails> =
        client.database("Stayflow").collection("Bookings");

    match collection.find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<BookingDetails>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                error!("Failed to collect bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(err) => {
            error!("Failed to fetch bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

/*
    GET /api/properties/{id}/bookings/{booking_id}
*/
pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let client = data.into_inner();
    let (property_id, booking_id) = path.into_inner();

    let property_id = match ObjectId::parse_str(&property_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };
    let booking_id = match ObjectId::parse_str(&booking_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID"),
    };

    let collection: mongodb::Collection<BookingDetails> =
        client.database("Stayflow").collection("Bookings");

    match collection
        .find_one(doc! { "_id": booking_id, "property_id": property_id })
        .await
    {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            error!("Failed to fetch booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}
