use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{fetch_json, mask_key, FetchError};

const SERVICE: &str = "rugcheck";

// ============================================================================
// RugCheck Client - contract risk analysis
// ============================================================================

#[derive(Clone)]
pub struct RugCheckClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    risk_score: Option<Decimal>,
}

impl RugCheckClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        tracing::info!(
            url = %base_url,
            api_key = %mask_key(api_key),
            "Creating RugCheck client"
        );

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Risk score for a token contract, conventionally 0-100.
    pub async fn risk_score(&self, address: &str) -> Result<Decimal, FetchError> {
        let url = format!("{}/{}", self.base_url, address);
        tracing::debug!(address = %address, "Requesting RugCheck analysis");

        let request = self.client.get(&url).bearer_auth(&self.api_key);
        let body: AnalyzeResponse = fetch_json(SERVICE, request).await?;

        body.risk_score.ok_or(FetchError::MissingField {
            service: SERVICE,
            field: "risk_score",
        })
    }
}
