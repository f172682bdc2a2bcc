//! Data models for token scoring
//!
//! A [`TokenRecord`] comes from the market feed, a [`SignalSet`] is gathered
//! for it from the risk and sentiment APIs plus the record itself, and a
//! [`CompositeScore`] is the weighted sum of those signals. None of these
//! outlive a single polling cycle.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

// =============================================================================
// Market Data
// =============================================================================

/// A raw token snapshot as supplied by the market data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Ticker symbol (e.g. "MEME")
    pub symbol: String,

    /// Contract address, used for risk lookups and blacklisting
    pub address: String,

    /// Deployer address, when the feed provides it
    #[serde(default)]
    pub developer: Option<String>,

    /// Last traded price
    pub price: Decimal,

    /// Trading volume over the last 24 hours
    pub volume_24h: Decimal,

    /// Trading volume over the last 7 days
    pub volume_7d: Decimal,
}

impl TokenRecord {
    /// Check the sign constraints on price and volumes.
    ///
    /// A zero 7d volume is not rejected here; it surfaces as
    /// [`ScoringError::DivisionByZero`] when the spike ratio is computed.
    pub fn validate(&self) -> ScoringResult<()> {
        if self.address.is_empty() {
            return Err(ScoringError::InvalidInput(format!(
                "token {} has an empty address",
                self.symbol
            )));
        }

        let fields = [
            ("price", self.price),
            ("volume_24h", self.volume_24h),
            ("volume_7d", self.volume_7d),
        ];
        for (name, value) in fields {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ScoringError::InvalidInput(format!(
                    "{} is negative ({}) for token {}",
                    name, value, self.address
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Signals
// =============================================================================

/// The three signals combined into a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Rugcheck,
    Sentiment,
    VolumeSpike,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Rugcheck => write!(f, "rugcheck"),
            SignalKind::Sentiment => write!(f, "sentiment"),
            SignalKind::VolumeSpike => write!(f, "volume_spike"),
        }
    }
}

/// A fully populated set of signals for one token.
///
/// The fields live on different scales: rugcheck is conventionally 0-100,
/// sentiment roughly -1..1, and the volume spike ratio has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub rugcheck_score: Decimal,
    pub sentiment_score: Decimal,
    pub volume_spike_ratio: Decimal,
}

/// Signals collected so far for a token. Converts into a [`SignalSet`] only
/// once every field has been supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialSignals {
    pub rugcheck_score: Option<Decimal>,
    pub sentiment_score: Option<Decimal>,
    pub volume_spike_ratio: Option<Decimal>,
}

impl PartialSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: SignalKind, value: Decimal) -> Self {
        match kind {
            SignalKind::Rugcheck => self.rugcheck_score = Some(value),
            SignalKind::Sentiment => self.sentiment_score = Some(value),
            SignalKind::VolumeSpike => self.volume_spike_ratio = Some(value),
        }
        self
    }

    /// Signals that have not been supplied yet
    pub fn missing(&self) -> Vec<SignalKind> {
        let mut missing = Vec::new();
        if self.rugcheck_score.is_none() {
            missing.push(SignalKind::Rugcheck);
        }
        if self.sentiment_score.is_none() {
            missing.push(SignalKind::Sentiment);
        }
        if self.volume_spike_ratio.is_none() {
            missing.push(SignalKind::VolumeSpike);
        }
        missing
    }

    pub fn complete(self) -> ScoringResult<SignalSet> {
        match (
            self.rugcheck_score,
            self.sentiment_score,
            self.volume_spike_ratio,
        ) {
            (Some(rugcheck_score), Some(sentiment_score), Some(volume_spike_ratio)) => {
                Ok(SignalSet {
                    rugcheck_score,
                    sentiment_score,
                    volume_spike_ratio,
                })
            }
            _ => {
                let names: Vec<String> = self.missing().iter().map(|k| k.to_string()).collect();
                Err(ScoringError::InvalidInput(format!(
                    "missing signal(s): {}",
                    names.join(", ")
                )))
            }
        }
    }
}

impl TryFrom<PartialSignals> for SignalSet {
    type Error = ScoringError;

    fn try_from(partial: PartialSignals) -> ScoringResult<Self> {
        partial.complete()
    }
}

// =============================================================================
// Weights & Score
// =============================================================================

/// Linear weights applied to each signal.
///
/// Conventionally these sum to 1.0, but that is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub rugcheck: Decimal,
    pub sentiment: Decimal,
    pub volume: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rugcheck: Decimal::new(4, 1),
            sentiment: Decimal::new(3, 1),
            volume: Decimal::new(3, 1),
        }
    }
}

impl ScoringWeights {
    /// Sum of the weights, saturating at the `Decimal` range.
    pub fn total(&self) -> Decimal {
        self.rugcheck
            .saturating_add(self.sentiment)
            .saturating_add(self.volume)
    }

    pub fn is_normalized(&self) -> bool {
        self.total() == Decimal::ONE
    }

    /// Every weight multiplied by `factor`
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            rugcheck: self.rugcheck.saturating_mul(factor),
            sentiment: self.sentiment.saturating_mul(factor),
            volume: self.volume.saturating_mul(factor),
        }
    }
}

/// Weighted composite of a token's signals.
///
/// Unbounded above because the volume spike ratio is; do not read it as a
/// 0-100 value even though the rugcheck signal usually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeScore(Decimal);

impl CompositeScore {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than `threshold`
    pub fn exceeds(&self, threshold: Decimal) -> bool {
        self.0 > threshold
    }
}

impl fmt::Display for CompositeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

// =============================================================================
// Blacklist
// =============================================================================

/// Which blacklist a token was rejected by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "list", content = "address", rename_all = "snake_case")]
pub enum BlacklistHit {
    Token(String),
    Developer(String),
}

impl fmt::Display for BlacklistHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistHit::Token(address) => write!(f, "token {} is blacklisted", address),
            BlacklistHit::Developer(address) => {
                write!(f, "developer {} is blacklisted", address)
            }
        }
    }
}

/// Known-bad token contracts and deployers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    pub tokens: HashSet<String>,
    pub developers: HashSet<String>,
}

impl Blacklist {
    pub fn new<T, D>(tokens: T, developers: D) -> Self
    where
        T: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        Self {
            tokens: tokens.into_iter().collect(),
            developers: developers.into_iter().collect(),
        }
    }

    /// Returns the matching entry if the record must not be scored.
    /// The token list is checked before the developer list.
    pub fn check(&self, record: &TokenRecord) -> Option<BlacklistHit> {
        if crate::scoring::is_blacklisted(&record.address, &self.tokens) {
            return Some(BlacklistHit::Token(record.address.clone()));
        }

        record
            .developer
            .as_deref()
            .filter(|dev| crate::scoring::is_blacklisted(dev, &self.developers))
            .map(|dev| BlacklistHit::Developer(dev.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len() + self.developers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.developers.is_empty()
    }
}
