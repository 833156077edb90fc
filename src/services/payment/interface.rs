use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug)]
pub enum PaymentError {
    Declined,
    GatewayUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub idempotency_key: Uuid,
    pub booking_reference: String,
    pub amount: f64,
    pub currency: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeOutcome {
    pub transaction_id: String,
    pub status: String,
}

pub trait PaymentOperations {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, PaymentError>;
}
