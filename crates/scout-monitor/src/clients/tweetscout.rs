use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{fetch_json, mask_key, FetchError};

const SERVICE: &str = "tweetscout";

// ============================================================================
// TweetScout Client - social sentiment
// ============================================================================

#[derive(Clone)]
pub struct TweetScoutClient {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    #[serde(default)]
    sentiment: Option<Decimal>,
}

impl TweetScoutClient {
    pub fn new(client: Client, url: &str, api_key: &str) -> Self {
        tracing::info!(
            url = %url,
            api_key = %mask_key(api_key),
            "Creating TweetScout client"
        );

        Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Social sentiment for a ticker symbol, roughly -1..1.
    pub async fn sentiment(&self, symbol: &str) -> Result<Decimal, FetchError> {
        tracing::debug!(symbol = %symbol, "Requesting TweetScout sentiment");

        let request = self
            .client
            .get(&self.url)
            .query(&[("symbol", symbol)])
            .header("X-API-KEY", &self.api_key);
        let body: SentimentResponse = fetch_json(SERVICE, request).await?;

        body.sentiment.ok_or(FetchError::MissingField {
            service: SERVICE,
            field: "sentiment",
        })
    }
}
