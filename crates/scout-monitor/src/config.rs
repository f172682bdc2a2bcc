use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scout_core::{Blacklist, ScoringWeights, TokenRecord};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api_keys: ApiKeysConfig,
    pub endpoints: EndpointsConfig,
    pub blacklists: BlacklistConfig,
    pub thresholds: ThresholdConfig,
    pub weights: ScoringWeights,
    pub signals: SignalConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub market: MarketConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiKeysConfig {
    pub rugcheck: String,
    pub tweetscout: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointsConfig {
    pub rugcheck_url: String,
    pub tweetscout_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BlacklistConfig {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub developers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThresholdConfig {
    /// Composite score a token must strictly exceed to be surfaced.
    /// The composite is not on a 0-100 scale.
    pub risk_score: Decimal,
}

/// Values substituted when a signal fetch fails
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignalConfig {
    pub rugcheck_fallback: Decimal,
    pub sentiment_fallback: Decimal,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketConfig {
    #[serde(default = "default_market_tokens")]
    pub tokens: Vec<TokenRecord>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tokens: default_market_tokens(),
        }
    }
}

/// Stand-in feed used until a live market source is wired up
fn default_market_tokens() -> Vec<TokenRecord> {
    vec![TokenRecord {
        symbol: "MEME".to_string(),
        address: "0x123...".to_string(),
        developer: None,
        price: dec!(0.0012),
        volume_24h: dec!(100000),
        volume_7d: dec!(500000),
    }]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub file_name: String,
}

impl AppConfig {
    /// Load from `config/default`, `config/local` and `SCOUT__*` environment variables.
    pub fn load() -> AppResult<Self> {
        let builder = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        Self::finish(builder)
    }

    /// Load from an explicit file; environment variables still override it.
    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        let builder = defaults()?.add_source(File::from(path.as_ref()).required(true));

        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> AppResult<Self> {
        let config: AppConfig = builder
            // Override with environment variables (SCOUT__THRESHOLDS__RISK_SCORE, etc.)
            .add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("blacklists.tokens")
                    .with_list_parse_key("blacklists.developers"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    ///
    /// Decimal values (weights, thresholds, prices) are written as JSON
    /// strings such as `"0.4"`. Loading accepts either strings or numbers.
    pub fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Check invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> AppResult<()> {
        let mut errors: Vec<String> = Vec::new();

        let urls = [
            ("endpoints.rugcheck_url", &self.endpoints.rugcheck_url),
            ("endpoints.tweetscout_url", &self.endpoints.tweetscout_url),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("{name}: expected an http(s) URL, got {url:?}"));
            }
        }

        if self.endpoints.timeout_seconds == 0 {
            errors.push("endpoints.timeout_seconds: must be greater than zero".into());
        }

        if self.monitor.poll_interval_secs == 0 {
            errors.push("monitor.poll_interval_secs: must be greater than zero".into());
        }

        let weights = [
            ("weights.rugcheck", self.weights.rugcheck),
            ("weights.sentiment", self.weights.sentiment),
            ("weights.volume", self.weights.volume),
        ];
        for (name, weight) in weights {
            if weight < Decimal::ZERO {
                errors.push(format!("{name}: must not be negative, got {weight}"));
            }
        }

        for (i, token) in self.market.tokens.iter().enumerate() {
            if let Err(e) = token.validate() {
                errors.push(format!("market.tokens[{i}]: {e}"));
            }
        }

        if self.logging.file_name.is_empty() {
            errors.push("logging.file_name: must not be empty".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            )))
        }
    }

    pub fn blacklist(&self) -> Blacklist {
        Blacklist::new(
            self.blacklists.tokens.iter().cloned(),
            self.blacklists.developers.iter().cloned(),
        )
    }
}

fn defaults() -> AppResult<ConfigBuilder<DefaultState>> {
    let builder = Config::builder()
        .set_default("api_keys.rugcheck", "")?
        .set_default("api_keys.tweetscout", "")?
        .set_default("endpoints.rugcheck_url", "https://api.rugcheck.xyz/v1/analyze")?
        .set_default("endpoints.tweetscout_url", "https://api.tweetscout.io/v3/sentiment")?
        .set_default("endpoints.timeout_seconds", 10)?
        .set_default("blacklists.tokens", Vec::<String>::new())?
        .set_default("blacklists.developers", Vec::<String>::new())?
        .set_default("thresholds.risk_score", 70)?
        .set_default("weights.rugcheck", 0.4)?
        .set_default("weights.sentiment", 0.3)?
        .set_default("weights.volume", 0.3)?
        .set_default("signals.rugcheck_fallback", 0)?
        .set_default("signals.sentiment_fallback", 0)?
        .set_default("monitor.poll_interval_secs", 60)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.file_name", "scout.log")?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard};

    // Loading reads SCOUT__* from the process environment; tests that load
    // must not overlap with one that sets those variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("scout-config-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    fn write_config(name: &str, body: &str) -> PathBuf {
        let path = temp_path(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_load_from_empty_file() {
        let _env = env_lock();
        let path = write_config("defaults", "{}");
        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.thresholds.risk_score, dec!(70));
        assert_eq!(config.weights, ScoringWeights::default());
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.endpoints.rugcheck_url, "https://api.rugcheck.xyz/v1/analyze");
        assert_eq!(config.signals.rugcheck_fallback, Decimal::ZERO);
        assert_eq!(config.market.tokens.len(), 1);
        assert_eq!(config.market.tokens[0].symbol, "MEME");
        assert!(config.blacklist().is_empty());
    }

    #[test]
    fn test_file_overrides_defaults_and_ignores_unknown_keys() {
        let _env = env_lock();
        let path = write_config(
            "overrides",
            r#"{
                "api_keys": { "rugcheck": "rc-key", "gmgn": "unused" },
                "blacklists": { "tokens": ["0xabc", "0xdef"], "developers": ["0xdev"] },
                "thresholds": { "risk_score": 25, "volume_spike": 3.0 },
                "weights": { "rugcheck": 0.5, "sentiment": 0.25, "volume": 0.25 },
                "monitor": { "poll_interval_secs": 5 }
            }"#,
        );
        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.api_keys.rugcheck, "rc-key");
        assert_eq!(config.api_keys.tweetscout, "");
        assert_eq!(config.thresholds.risk_score, dec!(25));
        assert_eq!(config.weights.rugcheck, dec!(0.5));
        assert!(config.weights.is_normalized());
        assert_eq!(config.monitor.poll_interval_secs, 5);

        let blacklist = config.blacklist();
        assert!(blacklist.tokens.contains("0xabc"));
        assert!(blacklist.developers.contains("0xdev"));
        assert_eq!(blacklist.len(), 3);
    }

    #[test]
    fn test_save_then_load() {
        let _env = env_lock();
        let path = write_config("roundtrip", "{}");
        let mut config = AppConfig::load_from(&path).unwrap();
        config.api_keys.rugcheck = "saved-key".to_string();
        config.blacklists.tokens.push("0xbad".to_string());
        config.thresholds.risk_score = dec!(12.5);

        let saved = temp_path("roundtrip-saved");
        config.save(&saved).unwrap();
        let reloaded = AppConfig::load_from(&saved).unwrap();

        assert_eq!(reloaded.api_keys.rugcheck, "saved-key");
        assert_eq!(reloaded.blacklists.tokens, vec!["0xbad".to_string()]);
        assert_eq!(reloaded.thresholds.risk_score, dec!(12.5));
        assert_eq!(reloaded.market.tokens, config.market.tokens);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
        assert_eq!(written["weights"]["rugcheck"], "0.4");
        assert_eq!(written["thresholds"]["risk_score"], "12.5");
    }

    #[test]
    fn test_validation_collects_errors() {
        let _env = env_lock();
        let path = write_config(
            "invalid",
            r#"{
                "endpoints": { "rugcheck_url": "ftp://nope" },
                "weights": { "rugcheck": -0.1 },
                "monitor": { "poll_interval_secs": 0 }
            }"#,
        );

        match AppConfig::load_from(&path) {
            Err(AppError::Config(msg)) => {
                assert!(msg.contains("3 errors"), "unexpected message: {msg}");
                assert!(msg.contains("endpoints.rugcheck_url"));
                assert!(msg.contains("weights.rugcheck"));
                assert!(msg.contains("monitor.poll_interval_secs"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_bad_market_token() {
        let _env = env_lock();
        let path = write_config(
            "bad-token",
            r#"{
                "market": { "tokens": [
                    { "symbol": "BAD", "address": "0xbad", "price": -1,
                      "volume_24h": 10, "volume_7d": 10 }
                ] }
            }"#,
        );

        match AppConfig::load_from(&path) {
            Err(AppError::Config(msg)) => assert!(msg.contains("market.tokens[0]")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = env_lock();
        let path = write_config(
            "env",
            r#"{
                "blacklists": { "tokens": ["0xfile"] },
                "thresholds": { "risk_score": 25 }
            }"#,
        );

        std::env::set_var("SCOUT__THRESHOLDS__RISK_SCORE", "40");
        std::env::set_var("SCOUT__BLACKLISTS__TOKENS", "0xa,0xb");
        let result = AppConfig::load_from(&path);
        std::env::remove_var("SCOUT__THRESHOLDS__RISK_SCORE");
        std::env::remove_var("SCOUT__BLACKLISTS__TOKENS");

        let config = result.unwrap();
        assert_eq!(config.thresholds.risk_score, dec!(40));
        assert_eq!(
            config.blacklists.tokens,
            vec!["0xa".to_string(), "0xb".to_string()]
        );
        assert!(!config.blacklist().tokens.contains("0xfile"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let _env = env_lock();
        let result = AppConfig::load_from(temp_path("does-not-exist"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
