use actix_web::{web, HttpResponse, Responder};
use bson::{doc, DateTime};
use futures::TryStreamExt;
use log::error;
use mongodb::{bson::oid::ObjectId, Client};
use std::sync::Arc;

use crate::models::stay_rules::{BookingWindowRule, StayRule};

fn parse_property_id(raw: &str) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(raw)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid property ID"))
}

/*
    GET /api/properties/{id}/stay-rules
*/
pub async fn get_stay_rules(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match parse_property_id(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let collection: mongodb::Collection<StayRule> =
        client.database("Stayflow").collection("StayRules");

    let cursor = collection
        .find(doc! { "property_id": property_id })
        .sort(doc! { "priority": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<StayRule>>().await {
            Ok(rules) => {
                let active: Vec<StayRule> = rules.into_iter().filter(|r| r.is_active).collect();
                HttpResponse::Ok().json(active)
            }
            Err(err) => {
                error!("Failed to collect stay rules: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve stay rules")
            }
        },
        Err(err) => {
            error!("Failed to fetch stay rules: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch stay rules")
        }
    }
}

/*
    GET /api/properties/{id}/booking-window-rules
*/
pub async fn get_booking_window_rules(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match parse_property_id(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let collection: mongodb::Collection<BookingWindowRule> =
        client.database("Stayflow").collection("BookingWindowRules");

    let cursor = collection
        .find(doc! { "property_id": property_id })
        .sort(doc! { "priority": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<BookingWindowRule>>().await {
            Ok(rules) => {
                let active: Vec<BookingWindowRule> =
                    rules.into_iter().filter(|r| r.is_active).collect();
                HttpResponse::Ok().json(active)
            }
            Err(err) => {
                error!("Failed to collect booking window rules: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve booking window rules")
            }
        },
        Err(err) => {
            error!("Failed to fetch booking window rules: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking window rules")
        }
    }
}

/*
    POST /api/admin/properties/{id}/stay-rules
*/
pub async fn add_stay_rule(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    input: web::Json<StayRule>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match parse_property_id(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut rule = input.into_inner();
    if rule.end_date < rule.start_date {
        return HttpResponse::BadRequest().body("Rule end date is before its start date");
    }

    rule.id = None;
    rule.property_id = Some(property_id);
    let time = DateTime::now();
    rule.created_at = Some(time);
    rule.updated_at = Some(time);

    let collection: mongodb::Collection<StayRule> =
        client.database("Stayflow").collection("StayRules");

    match collection.insert_one(&rule).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "inserted_id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(err) => {
            error!("Failed to add stay rule: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to add stay rule")
        }
    }
}

/*
    POST /api/admin/properties/{id}/booking-window-rules
*/
pub async fn add_booking_window_rule(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    input: web::Json<BookingWindowRule>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match parse_property_id(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut rule = input.into_inner();
    if rule.end_date < rule.start_date {
        return HttpResponse::BadRequest().body("Rule end date is before its start date");
    }

    rule.id = None;
    rule.property_id = Some(property_id);
    let time = DateTime::now();
    rule.created_at = Some(time);
    rule.updated_at = Some(time);

    let collection: mongodb::Collection<BookingWindowRule> =
        client.database("Stayflow").collection("BookingWindowRules");

    match collection.insert_one(&rule).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "inserted_id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(err) => {
            error!("Failed to add booking window rule: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to add booking window rule")
        }
    }
}
