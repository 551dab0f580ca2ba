//! Excel export and template handlers

use anyhow::Result;
use colored::Colorize;

use crate::exporters;
use crate::holdings::HoldingsStore;
use crate::portfolio::consolidate;
use crate::stocks::StockDatabase;

pub async fn dispatch_export(file: &str) -> Result<()> {
    let store = HoldingsStore::open(None)?;
    if store.is_empty() {
        anyhow::bail!("Nothing to export, no holdings recorded");
    }

    let consolidation = consolidate(store.list_transactions());
    let stocks = StockDatabase::load_default();
    exporters::write_portfolio(file, &consolidation.positions, &stocks)?;

    println!(
        "{} Exported {} position(s) to {}",
        "✓".green().bold(),
        consolidation.positions.len(),
        file
    );
    Ok(())
}

pub async fn dispatch_template(file: &str) -> Result<()> {
    exporters::write_template(file)?;
    println!("{} Template written to {}", "✓".green().bold(), file);
    Ok(())
}
