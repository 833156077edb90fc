use chrono::NaiveDate;

use crate::models::pricing::DynamicPricingResult;

/// Client for the external dynamic-pricing read endpoint. The response is
/// parsed into typed records at this boundary; nothing downstream touches
/// raw JSON.
#[derive(Debug, Clone)]
pub struct PricingClient {
    base_url: String,
    http: reqwest::Client,
}

impl PricingClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// None when no dynamic-pricing endpoint is configured; quotes then use
    /// property pricing alone.
    pub fn from_env() -> Option<Self> {
        std::env::var("DYNAMIC_PRICING_URL").ok().map(Self::new)
    }

    pub async fn fetch(
        &self,
        property_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
        category_id: Option<&str>,
    ) -> Result<DynamicPricingResult, reqwest::Error> {
        let url = format!("{}/properties/{}/dynamic-pricing", self.base_url, property_id);

        let mut query: Vec<(&str, String)> = vec![
            ("check_in", check_in.to_string()),
            ("check_out", check_out.to_string()),
            ("guests", guests.to_string()),
        ];
        if let Some(category) = category_id {
            query.push(("category_id", category.to_string()));
        }

        self.http
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<DynamicPricingResult>()
            .await
    }
}
