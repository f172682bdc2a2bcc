use scout_core::TokenRecord;

use crate::config::MarketConfig;
use crate::error::AppResult;

/// Supplies the token snapshots scored on each monitor cycle.
pub trait MarketDataSource: Send + Sync {
    fn fetch_tokens(&self) -> AppResult<Vec<TokenRecord>>;
}

/// Serves a fixed token list, taken from configuration.
#[derive(Debug, Clone)]
pub struct StaticMarketSource {
    tokens: Vec<TokenRecord>,
}

impl StaticMarketSource {
    pub fn new(tokens: Vec<TokenRecord>) -> Self {
        Self { tokens }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        tracing::debug!(count = config.tokens.len(), "Using static market source");
        Self::new(config.tokens.clone())
    }
}

impl MarketDataSource for StaticMarketSource {
    fn fetch_tokens(&self) -> AppResult<Vec<TokenRecord>> {
        Ok(self.tokens.clone())
    }
}
