//! RSI signal evaluation

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;

use crate::cli::formatters;
use crate::config::Config;
use crate::holdings::{normalize_symbol, HoldingsStore};
use crate::portfolio::consolidate;
use crate::pricing::YahooProvider;
use crate::signals::{evaluate, Signal};

pub async fn dispatch_signals(symbol: Option<&str>, json_output: bool) -> Result<()> {
    let config = Config::load()?;

    let symbols: BTreeSet<String> = match symbol {
        Some(symbol) => [normalize_symbol(symbol)].into_iter().collect(),
        None => {
            let store = HoldingsStore::open(None)?;
            if store.is_empty() {
                if !json_output {
                    println!("{}", formatters::format_empty_portfolio());
                }
                return Ok(());
            }
            consolidate(store.list_transactions())
                .positions
                .iter()
                .map(|p| p.symbol.clone())
                .collect()
        }
    };

    tracing::info!("Evaluating signals for {} symbols", symbols.len());
    let provider = YahooProvider::new(Some(config.symbol_suffix.clone()))?;

    let mut signals: Vec<Signal> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for symbol in &symbols {
        match provider.fetch_history(symbol, config.rsi.history_days).await {
            Ok(history) => {
                let closes: Vec<_> = history.iter().map(|h| h.close).collect();
                match evaluate(symbol, &closes, &config.rsi) {
                    Some(signal) => signals.push(signal),
                    None => {
                        tracing::warn!("Not enough history for {} to compute RSI", symbol);
                        failed.push(symbol.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("History fetch failed for {}: {}", symbol, e);
                failed.push(symbol.clone());
            }
        }
    }

    if json_output {
        let summary = serde_json::json!({
            "signals": signals,
            "unavailable": failed,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if signals.is_empty() {
        println!("{} No signals available", "ℹ".blue().bold());
    } else {
        println!("{}", formatters::format_signals_table(&signals));
    }
    if !failed.is_empty() {
        println!(
            "{} No history for: {}",
            "⚠".yellow().bold(),
            failed.join(", ")
        );
    }
    Ok(())
}
