//! Composite scoring engine
//!
//! Stateless transforms from a token's raw data and fetched signals to a
//! single composite score. Safe to call from any number of tasks at once.
//!
//! The composite mixes a 0-100 risk score, a roughly -1..1 sentiment score
//! and an unbounded volume ratio under weights that sum to one. The result
//! has no normalized scale; it is kept as a raw weighted sum on purpose and
//! downstream thresholds must not assume a 0-100 range.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::{ScoringError, ScoringResult};
use crate::models::{CompositeScore, ScoringWeights, SignalSet, TokenRecord};

/// Ratio of 24h volume to 7d volume.
pub fn compute_volume_spike(record: &TokenRecord) -> ScoringResult<Decimal> {
    if record.volume_24h.is_sign_negative() && !record.volume_24h.is_zero() {
        return Err(ScoringError::InvalidInput(format!(
            "volume_24h is negative ({}) for token {}",
            record.volume_24h, record.address
        )));
    }
    if record.volume_7d.is_sign_negative() && !record.volume_7d.is_zero() {
        return Err(ScoringError::InvalidInput(format!(
            "volume_7d is negative ({}) for token {}",
            record.volume_7d, record.address
        )));
    }

    if record.volume_7d.is_zero() {
        return Err(ScoringError::DivisionByZero {
            address: record.address.clone(),
        });
    }

    record.volume_24h.checked_div(record.volume_7d).ok_or_else(|| {
        ScoringError::InvalidInput(format!(
            "volume spike ratio overflows for token {} ({} / {})",
            record.address, record.volume_24h, record.volume_7d
        ))
    })
}

/// Weighted sum of the three signals.
///
/// Arithmetic saturates at the `Decimal` range rather than panicking, so
/// this never fails for a populated [`SignalSet`].
pub fn compute_composite(signals: &SignalSet, weights: &ScoringWeights) -> CompositeScore {
    let rugcheck = signals.rugcheck_score.saturating_mul(weights.rugcheck);
    let sentiment = signals.sentiment_score.saturating_mul(weights.sentiment);
    let volume = signals.volume_spike_ratio.saturating_mul(weights.volume);

    CompositeScore::new(rugcheck.saturating_add(sentiment).saturating_add(volume))
}

/// Set membership check used to gate tokens before any API call.
pub fn is_blacklisted(address: &str, blacklist: &HashSet<String>) -> bool {
    blacklist.contains(address)
}
