//! HTTP clients for the external scoring APIs.
//!
//! Every client returns `Result<Decimal, FetchError>`. Substituting a value
//! for a failed fetch is the caller's decision, see `analyzer`.

pub mod rugcheck;
pub mod tweetscout;

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;

pub use rugcheck::RugCheckClient;
pub use tweetscout::TweetScoutClient;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        source: reqwest::Error,
    },

    #[error("{service} API error {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} response: {source}")]
    Decode {
        service: &'static str,
        source: reqwest::Error,
    },

    #[error("{service} response has no `{field}` field")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// The risk and sentiment clients, sharing one connection pool.
#[derive(Clone)]
pub struct SignalClients {
    pub rugcheck: RugCheckClient,
    pub tweetscout: TweetScoutClient,
}

impl SignalClients {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.endpoints.timeout_seconds))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            rugcheck: RugCheckClient::new(
                http.clone(),
                &config.endpoints.rugcheck_url,
                &config.api_keys.rugcheck,
            ),
            tweetscout: TweetScoutClient::new(
                http,
                &config.endpoints.tweetscout_url,
                &config.api_keys.tweetscout,
            ),
        })
    }
}

/// Short preview of an API key that is safe to log.
pub fn mask_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else if chars.is_empty() {
        "EMPTY".to_string()
    } else {
        "***".to_string()
    }
}

/// Send a request and decode a JSON body, logging the round trip.
async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T, FetchError> {
    let start = Instant::now();

    let response = request.send().await.map_err(|e| {
        tracing::error!(service, error = %e, "Request failed");
        FetchError::Request { service, source: e }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(service, status = %status, body = %body, "API returned an error status");
        return Err(FetchError::Status {
            service,
            status,
            body,
        });
    }

    let parsed = response.json::<T>().await.map_err(|e| {
        tracing::error!(service, error = %e, "Failed to parse response");
        FetchError::Decode { service, source: e }
    })?;

    tracing::debug!(
        service,
        duration_ms = %start.elapsed().as_millis(),
        "Fetched signal"
    );

    Ok(parsed)
}
