pub mod admin;
pub mod booking;
pub mod health;
pub mod promotions;
pub mod property;
pub mod quote;
pub mod stay_rules;
