use tokio::sync::mpsc;

use crate::analyzer::TokenAnalysis;

/// Receives tokens whose composite score cleared the alert threshold.
pub trait ResultSink: Send + Sync {
    fn publish(&self, analysis: &TokenAnalysis);
}

/// Logs each qualifying token with the columns of the monitoring table.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn publish(&self, analysis: &TokenAnalysis) {
        tracing::info!(
            symbol = %analysis.token.symbol,
            address = %analysis.token.address,
            price = %analysis.token.price,
            volume_24h = %analysis.token.volume_24h,
            score = %analysis.score,
            fallbacks = ?analysis.fallbacks,
            "Token above threshold"
        );
    }
}

/// Forwards qualifying tokens over an unbounded channel, e.g. to a UI task.
// The binary only logs; embedders and tests consume the channel.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<TokenAnalysis>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TokenAnalysis>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ResultSink for ChannelSink {
    fn publish(&self, analysis: &TokenAnalysis) {
        if self.sender.send(analysis.clone()).is_err() {
            tracing::warn!(symbol = %analysis.token.symbol, "Result receiver dropped");
        }
    }
}
