//! Per-token analysis: blacklist gate, signal gathering, composite score.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scout_core::{
    compute_composite, compute_volume_spike, Blacklist, BlacklistHit, CompositeScore,
    PartialSignals, ScoringWeights, SignalKind, SignalSet, TokenRecord,
};
use serde::Serialize;

use crate::clients::{FetchError, SignalClients};
use crate::config::{AppConfig, SignalConfig};
use crate::error::AppResult;

/// A scored token together with the signals that produced the score.
#[derive(Debug, Clone, Serialize)]
pub struct TokenAnalysis {
    pub token: TokenRecord,
    pub signals: SignalSet,
    pub score: CompositeScore,
    /// Signals whose fetch failed and were replaced by the configured fallback
    pub fallbacks: Vec<SignalKind>,
    pub analyzed_at: DateTime<Utc>,
}

impl TokenAnalysis {
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Rejected before any API call or scoring
    Blacklisted(BlacklistHit),
    Scored(TokenAnalysis),
}

pub struct TokenAnalyzer {
    clients: SignalClients,
    blacklist: Blacklist,
    weights: ScoringWeights,
    fallback: SignalConfig,
}

impl TokenAnalyzer {
    pub fn new(
        clients: SignalClients,
        blacklist: Blacklist,
        weights: ScoringWeights,
        fallback: SignalConfig,
    ) -> Self {
        Self {
            clients,
            blacklist,
            weights,
            fallback,
        }
    }

    pub fn from_config(clients: SignalClients, config: &AppConfig) -> Self {
        Self::new(
            clients,
            config.blacklist(),
            config.weights,
            config.signals.clone(),
        )
    }

    /// Score one token.
    ///
    /// Blacklisted tokens short-circuit before anything else. The spike ratio
    /// is computed before the network calls so a token with no 7d volume
    /// fails without spending API requests.
    pub async fn analyze(&self, token: &TokenRecord) -> AppResult<AnalysisOutcome> {
        if let Some(hit) = self.blacklist.check(token) {
            return Ok(AnalysisOutcome::Blacklisted(hit));
        }

        token.validate()?;
        let volume_spike = compute_volume_spike(token)?;

        let mut fallbacks = Vec::new();
        let rugcheck = with_fallback(
            SignalKind::Rugcheck,
            self.clients.rugcheck.risk_score(&token.address).await,
            self.fallback.rugcheck_fallback,
            &mut fallbacks,
        );
        let sentiment = with_fallback(
            SignalKind::Sentiment,
            self.clients.tweetscout.sentiment(&token.symbol).await,
            self.fallback.sentiment_fallback,
            &mut fallbacks,
        );

        let signals = PartialSignals::new()
            .with(SignalKind::Rugcheck, rugcheck)
            .with(SignalKind::Sentiment, sentiment)
            .with(SignalKind::VolumeSpike, volume_spike)
            .complete()?;
        let score = compute_composite(&signals, &self.weights);

        tracing::debug!(
            symbol = %token.symbol,
            address = %token.address,
            rugcheck = %signals.rugcheck_score,
            sentiment = %signals.sentiment_score,
            volume_spike = %signals.volume_spike_ratio,
            score = %score,
            fallbacks = ?fallbacks,
            "Token scored"
        );

        Ok(AnalysisOutcome::Scored(TokenAnalysis {
            token: token.clone(),
            signals,
            score,
            fallbacks,
            analyzed_at: Utc::now(),
        }))
    }
}

fn with_fallback(
    kind: SignalKind,
    fetched: Result<Decimal, FetchError>,
    fallback: Decimal,
    used: &mut Vec<SignalKind>,
) -> Decimal {
    match fetched {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                signal = %kind,
                error = %e,
                fallback = %fallback,
                "Signal unavailable, using fallback"
            );
            used.push(kind);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::mock_signal_clients;
    use crate::error::AppError;
    use rust_decimal_macros::dec;
    use scout_core::ScoringError;
    use std::sync::atomic::Ordering;

    fn token(address: &str, volume_7d: Decimal) -> TokenRecord {
        TokenRecord {
            symbol: "MEME".to_string(),
            address: address.to_string(),
            developer: Some("0xdev".to_string()),
            price: dec!(0.0012),
            volume_24h: dec!(100000),
            volume_7d,
        }
    }

    fn fallback(rugcheck: Decimal, sentiment: Decimal) -> SignalConfig {
        SignalConfig {
            rugcheck_fallback: rugcheck,
            sentiment_fallback: sentiment,
        }
    }

    #[tokio::test]
    async fn test_scores_with_fetched_signals() {
        let (clients, hits) = mock_signal_clients(Some(80.0), Some(0.6)).await;
        let analyzer = TokenAnalyzer::new(
            clients,
            Blacklist::default(),
            ScoringWeights::default(),
            fallback(Decimal::ZERO, Decimal::ZERO),
        );

        let outcome = analyzer.analyze(&token("0x123", dec!(500000))).await.unwrap();
        let AnalysisOutcome::Scored(analysis) = outcome else {
            panic!("expected a scored token");
        };

        // 80*0.4 + 0.6*0.3 + 0.2*0.3
        assert_eq!(analysis.signals.volume_spike_ratio, dec!(0.2));
        assert_eq!(analysis.score.value(), dec!(32.24));
        assert!(!analysis.used_fallback());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_uses_and_records_fallback() {
        let (clients, _) = mock_signal_clients(None, Some(0.5)).await;
        let analyzer = TokenAnalyzer::new(
            clients,
            Blacklist::default(),
            ScoringWeights::default(),
            fallback(dec!(50), Decimal::ZERO),
        );

        let AnalysisOutcome::Scored(analysis) =
            analyzer.analyze(&token("0x123", dec!(500000))).await.unwrap()
        else {
            panic!("expected a scored token");
        };

        assert_eq!(analysis.signals.rugcheck_score, dec!(50));
        assert_eq!(analysis.signals.sentiment_score, dec!(0.5));
        assert_eq!(analysis.fallbacks, vec![SignalKind::Rugcheck]);
    }

    #[tokio::test]
    async fn test_blacklisted_token_never_scored_or_fetched() {
        let (clients, hits) = mock_signal_clients(Some(80.0), Some(0.6)).await;
        let blacklist = Blacklist::new(vec!["0xabc".to_string()], vec!["0xdev".to_string()]);
        let analyzer = TokenAnalyzer::new(
            clients,
            blacklist,
            ScoringWeights::default(),
            fallback(Decimal::ZERO, Decimal::ZERO),
        );

        let outcome = analyzer.analyze(&token("0xabc", dec!(500000))).await.unwrap();
        assert!(matches!(
            outcome,
            AnalysisOutcome::Blacklisted(BlacklistHit::Token(ref a)) if a == "0xabc"
        ));

        // Developer list applies to otherwise unknown contracts
        let outcome = analyzer.analyze(&token("0x777", dec!(500000))).await.unwrap();
        assert!(matches!(
            outcome,
            AnalysisOutcome::Blacklisted(BlacklistHit::Developer(_))
        ));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_weekly_volume_is_division_error() {
        let (clients, hits) = mock_signal_clients(Some(80.0), Some(0.6)).await;
        let analyzer = TokenAnalyzer::new(
            clients,
            Blacklist::default(),
            ScoringWeights::default(),
            fallback(Decimal::ZERO, Decimal::ZERO),
        );

        let err = analyzer.analyze(&token("0x123", Decimal::ZERO)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Scoring(ScoringError::DivisionByZero { .. })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
