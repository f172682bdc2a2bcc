mod analyzer;
mod clients;
mod config;
mod error;
mod logging;
mod market;
mod monitor;
mod sink;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::analyzer::TokenAnalyzer;
use crate::clients::{mask_key, SignalClients};
use crate::config::AppConfig;
use crate::market::StaticMarketSource;
use crate::monitor::Monitor;
use crate::sink::TracingSink;

use crate::error::AppResult;

const USAGE: &str = r#"Token Scout - token risk/sentiment monitor

USAGE:
    scout [run]                 Poll the market feed until Ctrl-C
    scout once                  Run a single cycle and print its report as JSON
    scout write-config <PATH>   Write the effective configuration as JSON

CONFIGURATION:
    config/default.*, config/local.*   Optional config files
    SCOUT_CONFIG=<PATH>                Load this file instead
    SCOUT__<SECTION>__<KEY>=<VALUE>    Override any key, e.g. SCOUT__THRESHOLDS__RISK_SCORE=40
"#;

enum Command {
    Run,
    Once,
    WriteConfig(String),
    Help,
}

/// Resolve the command line before any config is loaded or logging starts.
fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args.get(1).map(String::as_str).unwrap_or("run") {
        "run" => Ok(Command::Run),
        "once" => Ok(Command::Once),
        "write-config" => match args.get(2) {
            Some(path) => Ok(Command::WriteConfig(path.clone())),
            None => anyhow::bail!("write-config needs a target path\n\n{USAGE}"),
        },
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => anyhow::bail!("Unknown command: {other}\n\n{USAGE}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = parse_command(&args)?;

    if matches!(command, Command::Help) {
        eprintln!("{USAGE}");
        return Ok(());
    }

    let config = match std::env::var("SCOUT_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => AppConfig::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    let _log_guard = logging::init_tracing(&config.logging)?;

    match command {
        Command::Run => run(config).await,
        Command::Once => once(config).await,
        Command::WriteConfig(path) => {
            config.save(&path)?;
            println!("Configuration written to {}", path);
            Ok(())
        }
        Command::Help => Ok(()),
    }
}

fn build_monitor(config: &AppConfig) -> AppResult<Monitor> {
    tracing::info!(
        rugcheck_url = %config.endpoints.rugcheck_url,
        rugcheck_key = %mask_key(&config.api_keys.rugcheck),
        tweetscout_url = %config.endpoints.tweetscout_url,
        tweetscout_key = %mask_key(&config.api_keys.tweetscout),
        blacklist_entries = config.blacklist().len(),
        threshold = %config.thresholds.risk_score,
        tokens = config.market.tokens.len(),
        "Configuration loaded"
    );

    if !config.weights.is_normalized() {
        tracing::warn!(
            total = %config.weights.total(),
            "Scoring weights do not sum to 1; composite scores are not comparable to defaults"
        );
    }
    if config.api_keys.rugcheck.is_empty() || config.api_keys.tweetscout.is_empty() {
        tracing::warn!("API key missing - set SCOUT__API_KEYS__RUGCHECK / SCOUT__API_KEYS__TWEETSCOUT");
    }

    let clients = SignalClients::new(config)?;
    let analyzer = TokenAnalyzer::from_config(clients, config);

    Ok(Monitor::new(
        analyzer,
        Box::new(StaticMarketSource::from_config(&config.market)),
        Box::new(TracingSink),
        config.thresholds.risk_score,
        Duration::from_secs(config.monitor.poll_interval_secs),
    ))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    println!("================================================");
    println!("            TOKEN SCOUT - Starting Up           ");
    println!("================================================");

    let monitor = build_monitor(&config)?;
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { monitor.run(cancel).await }
    });

    println!("  Polling every {}s - press Ctrl-C to stop", config.monitor.poll_interval_secs);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    cancel.cancel();

    let cycles = handle.await?;
    println!("Stopped after {} cycle(s)", cycles);
    Ok(())
}

async fn once(config: AppConfig) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    let report = monitor.run_cycle().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("scout")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command(&args(&[])), Ok(Command::Run)));
        assert!(matches!(parse_command(&args(&["once"])), Ok(Command::Once)));
        assert!(matches!(
            parse_command(&args(&["write-config", "out.json"])),
            Ok(Command::WriteConfig(ref p)) if p == "out.json"
        ));
        assert!(matches!(parse_command(&args(&["--help"])), Ok(Command::Help)));
    }

    #[test]
    fn test_bad_command_line_is_an_error() {
        let err = parse_command(&args(&["scan"])).err().unwrap();
        assert!(err.to_string().contains("Unknown command: scan"));

        assert!(parse_command(&args(&["write-config"])).is_err());
    }
}
