//! Polling loop: pull tokens, analyze each, surface those above threshold.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::analyzer::{AnalysisOutcome, TokenAnalyzer};
use crate::error::AppResult;
use crate::market::MarketDataSource;
use crate::sink::ResultSink;

/// Counts for one pass over the market feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub scanned: usize,
    pub blacklisted: usize,
    /// Tokens dropped because they could not be scored
    pub skipped: usize,
    pub scored: usize,
    pub qualified: usize,
    /// Scored tokens that needed at least one fallback signal
    pub with_fallbacks: usize,
}

pub struct Monitor {
    analyzer: TokenAnalyzer,
    source: Box<dyn MarketDataSource>,
    sink: Box<dyn ResultSink>,
    threshold: Decimal,
    poll_interval: Duration,
}

impl Monitor {
    pub fn new(
        analyzer: TokenAnalyzer,
        source: Box<dyn MarketDataSource>,
        sink: Box<dyn ResultSink>,
        threshold: Decimal,
        poll_interval: Duration,
    ) -> Self {
        Self {
            analyzer,
            source,
            sink,
            threshold,
            poll_interval,
        }
    }

    /// Run one polling cycle.
    ///
    /// Per-token failures are logged and counted; only a market source
    /// failure fails the whole cycle.
    pub async fn run_cycle(&self) -> AppResult<CycleReport> {
        let tokens = self.source.fetch_tokens()?;
        let mut report = CycleReport {
            scanned: tokens.len(),
            ..Default::default()
        };

        for token in &tokens {
            match self.analyzer.analyze(token).await {
                Ok(AnalysisOutcome::Blacklisted(hit)) => {
                    report.blacklisted += 1;
                    tracing::debug!(symbol = %token.symbol, reason = %hit, "Skipping blacklisted token");
                }
                Ok(AnalysisOutcome::Scored(analysis)) => {
                    report.scored += 1;
                    if analysis.used_fallback() {
                        report.with_fallbacks += 1;
                    }
                    if analysis.score.exceeds(self.threshold) {
                        report.qualified += 1;
                        self.sink.publish(&analysis);
                    }
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!(
                        symbol = %token.symbol,
                        address = %token.address,
                        error = %e,
                        error_code = e.error_code(),
                        "Skipping token"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Poll until `cancel` fires. Cancellation interrupts both an in-flight
    /// cycle and the wait between cycles. Returns the number of cycles run.
    pub async fn run(&self, cancel: CancellationToken) -> u64 {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            threshold = %self.threshold,
            "Monitor started"
        );

        let mut cycles: u64 = 0;
        loop {
            let start = Instant::now();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.run_cycle() => {
                    cycles += 1;
                    match result {
                        Ok(report) => tracing::info!(
                            cycle = cycles,
                            scanned = report.scanned,
                            blacklisted = report.blacklisted,
                            skipped = report.skipped,
                            scored = report.scored,
                            qualified = report.qualified,
                            with_fallbacks = report.with_fallbacks,
                            duration_ms = %start.elapsed().as_millis(),
                            "Cycle complete"
                        ),
                        Err(e) => tracing::error!(
                            cycle = cycles,
                            error = %e,
                            error_code = e.error_code(),
                            "Cycle failed"
                        ),
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!(cycles, "Monitor stopped");
        cycles
    }
}
