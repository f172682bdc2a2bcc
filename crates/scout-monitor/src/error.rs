use scout_core::ScoringError;

use crate::clients::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External API error: {0}")]
    ExternalApi(#[from] FetchError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Raised by live market sources; the static source never fails.
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Stable code attached to log lines for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::Scoring(ScoringError::DivisionByZero { .. }) => "DIVISION_BY_ZERO",
            AppError::Scoring(ScoringError::InvalidInput(_)) => "INVALID_INPUT",
            AppError::MarketData(_) => "MARKET_DATA_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
