use actix_web::{web, HttpResponse, Responder};
use bson::doc;
use futures::TryStreamExt;
use log::error;
use mongodb::{bson::oid::ObjectId, Client};
use std::sync::Arc;

use crate::models::property::{BlockedDateRange, Property};

/*
    GET /api/properties
*/
pub async fn get_properties(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Stayflow").collection("Properties");

    let cursor = collection
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .limit(100)
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Property>>().await {
            Ok(properties) => HttpResponse::Ok().json(properties),
            Err(err) => {
                error!("Failed to collect properties: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve properties")
            }
        },
        Err(err) => {
            error!("Failed to fetch properties: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch properties")
        }
    }
}

/*
    GET /api/properties/{id}
*/
pub async fn get_by_id(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Stayflow").collection("Properties");

    let id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(property)) => HttpResponse::Ok().json(property),
        Ok(None) => HttpResponse::NotFound().body("Property not found"),
        Err(err) => {
            error!("Failed to retrieve property: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve property")
        }
    }
}

/*
    GET /api/properties/{id}/blocked-dates

    Read-only view of the unavailability calendar; entries are maintained by
    the property-management backend.
*/
pub async fn get_blocked_dates(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<BlockedDateRange> =
        client.database("Stayflow").collection("BlockedDates");

    let id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    match collection.find(doc! { "property_id": id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<BlockedDateRange>>().await {
            Ok(ranges) => {
                let active: Vec<BlockedDateRange> =
                    ranges.into_iter().filter(|r| r.is_active).collect();
                HttpResponse::Ok().json(active)
            }
            Err(err) => {
                error!("Failed to collect blocked dates: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve blocked dates")
            }
        },
        Err(err) => {
            error!("Failed to fetch blocked dates: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch blocked dates")
        }
    }
}
