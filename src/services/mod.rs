pub mod payment;
pub mod pricing_client;
pub mod promotion_service;
pub mod quote_service;
pub mod stay_rule_service;
