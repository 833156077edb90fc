use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(client: web::Data<Arc<Client>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_result = check_mongodb(&client).await;
    health
        .services
        .insert("mongodb".to_string(), mongo_result.clone());

    let pricing_result = check_dynamic_pricing();
    health
        .services
        .insert("dynamic_pricing".to_string(), pricing_result.clone());

    let gateway_result = check_payment_gateway();
    health
        .services
        .insert("payment_gateway".to_string(), gateway_result.clone());

    // Optional integrations report their own status but only MongoDB
    // degrades the service as a whole.
    if mongo_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(client: &web::Data<Arc<Client>>) -> ServiceStatus {
    match client
        .database("Stayflow")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            error!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

fn check_dynamic_pricing() -> ServiceStatus {
    match env::var("DYNAMIC_PRICING_URL") {
        Ok(url) => ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("Dynamic pricing endpoint configured: {}", url)),
        },
        Err(_) => ServiceStatus {
            status: "not_configured".to_string(),
            details: Some("DYNAMIC_PRICING_URL not set, quotes use property pricing".to_string()),
        },
    }
}

fn check_payment_gateway() -> ServiceStatus {
    match env::var("PAYMENT_GATEWAY_URL") {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Payment gateway endpoint configured".to_string()),
        },
        Err(_) => ServiceStatus {
            status: "not_configured".to_string(),
            details: Some("PAYMENT_GATEWAY_URL not set, bookings stay pending".to_string()),
        },
    }
}
