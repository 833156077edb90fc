use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::sync::Arc;

use stayflow_api::db;
use stayflow_api::routes;
use stayflow_api::services::payment::gateway::HttpPaymentGateway;
use stayflow_api::services::pricing_client::PricingClient;
use stayflow_api::services::quote_service::QuoteConfig;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;

    let quote_config = QuoteConfig::from_env();
    info!("Quote calculator configured: {:?}", quote_config);

    let pricing_client = PricingClient::from_env().map(Arc::new);
    if pricing_client.is_none() {
        info!("No dynamic pricing endpoint configured, quotes use property pricing");
    }
    let payment_gateway = HttpPaymentGateway::from_env().map(Arc::new);
    if payment_gateway.is_none() {
        info!("No payment gateway configured, bookings will stay pending");
    }

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(quote_config.clone()))
            .app_data(web::Data::new(pricing_client.clone()))
            .app_data(web::Data::new(payment_gateway.clone()))
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/properties")
                            .route("", web::get().to(routes::property::get_properties))
                            .route("/{id}", web::get().to(routes::property::get_by_id))
                            .route(
                                "/{id}/blocked-dates",
                                web::get().to(routes::property::get_blocked_dates),
                            )
                            .route("/{id}/quote", web::post().to(routes::quote::get_quote))
                            .route(
                                "/{id}/stay-rules",
                                web::get().to(routes::stay_rules::get_stay_rules),
                            )
                            .route(
                                "/{id}/booking-window-rules",
                                web::get().to(routes::stay_rules::get_booking_window_rules),
                            )
                            .route(
                                "/{id}/promotions",
                                web::get().to(routes::promotions::get_promotions),
                            )
                            .route(
                                "/{id}/bookings",
                                web::post().to(routes::booking::create_booking),
                            )
                            .route(
                                "/{id}/bookings",
                                web::get().to(routes::booking::get_bookings),
                            )
                            .route(
                                "/{id}/bookings/{booking_id}",
                                web::get().to(routes::booking::get_booking_by_id),
                            ),
                    )
                    .configure(routes::admin::config),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
