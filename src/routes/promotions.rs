use actix_web::{web, HttpResponse, Responder};
use bson::{doc, DateTime};
use futures::TryStreamExt;
use log::error;
use mongodb::{bson::oid::ObjectId, Client};
use std::sync::Arc;

use crate::models::promotions::{DiscountType, PromotionRule};

/*
    GET /api/properties/{id}/promotions
*/
pub async fn get_promotions(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    let collection: mongodb::Collection<PromotionRule> =
        client.database("Stayflow").collection("Promotions");

    match collection.find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<PromotionRule>>().await {
            Ok(promotions) => {
                let active: Vec<PromotionRule> =
                    promotions.into_iter().filter(|p| p.is_active).collect();
                HttpResponse::Ok().json(active)
            }
            Err(err) => {
                error!("Failed to collect promotions: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve promotions")
            }
        },
        Err(err) => {
            error!("Failed to fetch promotions: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch promotions")
        }
    }
}

/*
    POST /api/admin/properties/{id}/promotions
*/
pub async fn add_promotion(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    input: web::Json<PromotionRule>,
) -> impl Responder {
    let client = data.into_inner();
    let property_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid property ID"),
    };

    let mut promotion = input.into_inner();

    if !promotion.discount_value.is_finite() {
        return HttpResponse::BadRequest().body("Discount value must be a number");
    }
    if promotion.discount_type == DiscountType::BuyXGetY {
        match &promotion.buy_x_get_y {
            Some(offer) if offer.buy_nights > 0 => {}
            _ => {
                return HttpResponse::BadRequest()
                    .body("buy_x_get_y promotions need a buy_nights of at least 1")
            }
        }
    }
    if promotion
        .conditions
        .requires_coupon_code
        .unwrap_or(false)
        && promotion.coupon_code.is_none()
    {
        return HttpResponse::BadRequest()
            .body("A promotion requiring a coupon code must define one");
    }

    promotion.id = None;
    promotion.property_id = Some(property_id);
    promotion.usage_count = 0;
    let time = DateTime::now();
    promotion.created_at = Some(time);
    promotion.updated_at = Some(time);

    let collection: mongodb::Collection<PromotionRule> =
        client.database("Stayflow").collection("Promotions");

    match collection.insert_one(&promotion).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "inserted_id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(err) => {
            error!("Failed to add promotion: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to add promotion")
        }
    }
}
