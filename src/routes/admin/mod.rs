use actix_web::web;

use crate::routes::{promotions, stay_rules};

/// Admin rule-builder write surface. Authentication is handled by the
/// upstream session provider before requests reach this service.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route(
                "/properties/{id}/stay-rules",
                web::post().to(stay_rules::add_stay_rule),
            )
            .route(
                "/properties/{id}/booking-window-rules",
                web::post().to(stay_rules::add_booking_window_rule),
            )
            .route(
                "/properties/{id}/promotions",
                web::post().to(promotions::add_promotion),
            ),
    );
}
