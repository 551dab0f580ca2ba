//! Manual transaction management

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::cli::{formatters, HoldingsCommands};
use crate::holdings::{HoldingsStore, TransactionDraft};

pub async fn dispatch_holdings(action: &HoldingsCommands, json_output: bool) -> Result<()> {
    match action {
        HoldingsCommands::Add {
            symbol,
            quantity,
            price,
            broker,
            date,
            notes,
        } => {
            dispatch_holdings_add(
                symbol,
                quantity,
                price,
                broker.as_deref(),
                date.as_deref(),
                notes.as_deref(),
            )
            .await
        }
        HoldingsCommands::List => dispatch_holdings_list(json_output).await,
        HoldingsCommands::Remove { id } => dispatch_holdings_remove(*id).await,
    }
}

async fn dispatch_holdings_add(
    symbol: &str,
    quantity_str: &str,
    price_str: &str,
    broker: Option<&str>,
    date_str: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    tracing::info!("Recording manual transaction for {}", symbol);

    let quantity =
        Decimal::from_str(quantity_str).context("Invalid quantity. Must be a decimal number")?;
    let price = Decimal::from_str(price_str).context("Invalid price. Must be a decimal number")?;

    let date = date_str
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d").context("Invalid date format. Use YYYY-MM-DD")
        })
        .transpose()?;

    let mut draft = TransactionDraft::new(symbol, quantity, price);
    if let Some(broker) = broker {
        draft = draft.with_broker(broker);
    }
    if let Some(date) = date {
        draft = draft.with_date(date);
    }
    if let Some(notes) = notes {
        draft = draft.with_notes(notes);
    }

    let mut store = HoldingsStore::open(None)?;
    let recorded = store.add_transaction(draft)?;
    let summary = format!(
        "#{} {} x {} @ {} via {}",
        recorded.id, recorded.symbol, recorded.quantity, recorded.unit_cost, recorded.broker
    );
    store.save()?;

    println!("{} Recorded {}", "✓".green().bold(), summary);
    Ok(())
}

async fn dispatch_holdings_list(json_output: bool) -> Result<()> {
    let store = HoldingsStore::open(None)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(store.list_transactions())?);
        return Ok(());
    }

    if store.is_empty() {
        println!("{}", formatters::format_empty_portfolio());
        return Ok(());
    }

    println!("{}", formatters::format_transactions_table(store.list_transactions()));
    Ok(())
}

async fn dispatch_holdings_remove(id: u64) -> Result<()> {
    let mut store = HoldingsStore::open(None)?;

    if !store.remove_transaction(id) {
        anyhow::bail!("No transaction with id {}", id);
    }
    store.save()?;

    println!("{} Removed transaction #{}", "✓".green().bold(), id);
    Ok(())
}
