use log::{error, warn};

use crate::services::payment::interface::{
    ChargeOutcome, ChargeRequest, PaymentError, PaymentOperations,
};

/// The payment gateway is an opaque external collaborator reached over HTTP.
/// It is invoked only after a booking document exists.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("PAYMENT_GATEWAY_URL").ok().map(Self::new)
    }
}

impl PaymentOperations for HttpPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Payment gateway unreachable: {}", e);
                PaymentError::GatewayUnavailable
            })?;

        if response.status().is_client_error() {
            warn!(
                "Payment declined for booking {} (status {})",
                request.booking_reference,
                response.status()
            );
            return Err(PaymentError::Declined);
        }
        if !response.status().is_success() {
            error!(
                "Payment gateway error for booking {} (status {})",
                request.booking_reference,
                response.status()
            );
            return Err(PaymentError::GatewayUnavailable);
        }

        response.json::<ChargeOutcome>().await.map_err(|e| {
            error!("Malformed payment gateway response: {}", e);
            PaymentError::GatewayUnavailable
        })
    }
}
