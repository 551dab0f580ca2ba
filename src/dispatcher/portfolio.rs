//! Portfolio display - the one code path that computes a ValuationReport

use anyhow::Result;
use std::collections::BTreeSet;

use crate::cli::{formatters, PortfolioCommands};
use crate::config::Config;
use crate::holdings::HoldingsStore;
use crate::portfolio::{consolidate, value};
use crate::stocks::StockDatabase;

pub async fn dispatch_portfolio(action: &PortfolioCommands, json_output: bool) -> Result<()> {
    match action {
        PortfolioCommands::Show { offline } => dispatch_portfolio_show(*offline, json_output).await,
    }
}

async fn dispatch_portfolio_show(offline: bool, json_output: bool) -> Result<()> {
    tracing::info!("Generating portfolio report");

    let config = Config::load()?;
    let store = HoldingsStore::open(None)?;

    if store.is_empty() {
        if !json_output {
            println!("{}", formatters::format_empty_portfolio());
        }
        return Ok(());
    }

    let consolidation = consolidate(store.list_transactions());

    let symbols: BTreeSet<String> = consolidation
        .positions
        .iter()
        .map(|p| p.symbol.clone())
        .collect();

    let mut resolver = super::build_resolver(&config)?;
    let snapshot = if offline || super::skip_price_fetch() {
        tracing::debug!("Using cached prices only");
        resolver.snapshot_offline(&symbols)
    } else {
        resolver.snapshot(&symbols).await?
    };

    // Every display surface below renders from this single report
    let report = value(&consolidation.positions, &snapshot);

    if json_output {
        println!("{}", formatters::format_portfolio_json(&report));
        return Ok(());
    }

    if consolidation.has_rejections() {
        println!("{}", formatters::format_rejected_warning(&consolidation.rejected));
    }

    let stocks = StockDatabase::load_default();
    println!("{}", formatters::format_portfolio_table(&report, &stocks));
    Ok(())
}
