//! Price cache management

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;

use crate::cli::{formatters, PriceCommands};
use crate::config::Config;
use crate::holdings::HoldingsStore;
use crate::portfolio::consolidate;

pub async fn dispatch_prices(action: &PriceCommands, json_output: bool) -> Result<()> {
    match action {
        PriceCommands::Update => dispatch_prices_update(json_output).await,
        PriceCommands::Show => dispatch_prices_show(json_output).await,
    }
}

async fn dispatch_prices_update(json_output: bool) -> Result<()> {
    let config = Config::load()?;
    let store = HoldingsStore::open(None)?;

    if store.is_empty() {
        if !json_output {
            println!("{}", formatters::format_empty_portfolio());
        }
        return Ok(());
    }

    let symbols: BTreeSet<String> = consolidate(store.list_transactions())
        .positions
        .iter()
        .map(|p| p.symbol.clone())
        .collect();

    tracing::info!("Refreshing prices for {} symbols", symbols.len());

    let bar = if json_output {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(symbols.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        bar
    };

    let mut resolver = super::build_resolver(&config)?;
    let snapshot = resolver
        .refresh_with_progress(&symbols, |symbol| {
            bar.set_message(symbol.to_string());
            bar.inc(1);
        })
        .await?;
    bar.finish_and_clear();

    let fetched = snapshot.len();
    let missed: Vec<&String> = symbols.iter().filter(|s| !snapshot.contains(s)).collect();

    if json_output {
        let summary = serde_json::json!({
            "requested": symbols.len(),
            "fetched": fetched,
            "missing": missed,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} Updated {}/{} prices",
        "✓".green().bold(),
        fetched,
        symbols.len()
    );
    if !missed.is_empty() {
        println!(
            "{} No quote for: {}",
            "⚠".yellow().bold(),
            missed
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

async fn dispatch_prices_show(json_output: bool) -> Result<()> {
    let config = Config::load()?;
    let resolver = super::build_resolver(&config)?;

    let mut entries: Vec<(String, crate::pricing::CacheEntry)> = resolver
        .cache()
        .entries()
        .map(|(symbol, entry)| (symbol.to_string(), entry.clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", formatters::format_cached_prices(&entries));
    Ok(())
}
