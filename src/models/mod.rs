pub mod booking;
pub mod pricing;
pub mod promotions;
pub mod property;
pub mod stay_rules;
