//! Output formatting module for CLI display
//!
//! All terminal output formatting lives here, separating the concerns of
//! data calculation from presentation. Every view renders from the same
//! ValuationReport the dispatcher computed once.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::holdings::Transaction;
use crate::importers::ImportIssue;
use crate::portfolio::{RejectedTransaction, ValuationReport};
use crate::pricing::{CacheEntry, PriceSource};
use crate::signals::Signal;
use crate::stocks::{StockDatabase, StockMatch};
use crate::utils::format_currency;

fn money_colored(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_currency(value).green().to_string()
    } else {
        format_currency(value).red().to_string()
    }
}

fn pct_colored(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("{:.2}%", value).green().to_string()
    } else {
        format!("{:.2}%", value).red().to_string()
    }
}

/// Format a valuation report for JSON output
pub fn format_portfolio_json(report: &ValuationReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a valuation report for terminal table output
pub fn format_portfolio_table(report: &ValuationReport, stocks: &StockDatabase) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Portfolio\n\n", "📊".cyan().bold()));

    #[derive(Tabled)]
    struct PositionRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Company")]
        company: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Avg Cost")]
        avg_cost: String,
        #[tabled(rename = "Cost Basis")]
        cost_basis: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "P&L")]
        pl: String,
        #[tabled(rename = "Return %")]
        return_pct: String,
    }

    let rows: Vec<PositionRow> = report
        .positions
        .iter()
        .map(|v| {
            let price_str = match v.market_price {
                Some(price) => {
                    let tag = match v.price_source {
                        PriceSource::Cached => " (cached)",
                        _ => "",
                    };
                    format!("{:.2}{}", price, tag)
                }
                None => "N/A".yellow().to_string(),
            };

            let (value_str, pl_str, return_str) = if v.price_unavailable {
                (
                    "N/A".yellow().to_string(),
                    "N/A".yellow().to_string(),
                    "N/A".yellow().to_string(),
                )
            } else {
                (
                    format_currency(v.market_value),
                    money_colored(v.gain_loss),
                    pct_colored(v.gain_loss_pct),
                )
            };

            PositionRow {
                symbol: v.symbol.clone(),
                company: stocks.display_name(&v.symbol),
                quantity: format!("{:.2}", v.quantity),
                avg_cost: format!("{:.2}", v.average_cost),
                cost_basis: format_currency(v.cost_basis),
                price: price_str,
                value: value_str,
                pl: pl_str,
                return_pct: return_str,
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align all columns except Symbol (0) and Company (1)
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());

    // Summary
    output.push_str(&format!("\n\n{}\n", "━".repeat(80).bright_black()));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total Cost:".bold(),
        format_currency(report.totals.cost_basis)
    ));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total Value:".bold(),
        format_currency(report.totals.market_value)
    ));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total P&L:".bold(),
        money_colored(report.totals.gain_loss)
    ));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total Return:".bold(),
        pct_colored(report.totals.gain_loss_pct)
    ));

    let unpriced = report.unpriced_symbols();
    if !unpriced.is_empty() {
        output.push_str(&format!(
            "\n{} No price for: {}. Their value is excluded from totals.\n",
            "⚠".yellow().bold(),
            unpriced.join(", ")
        ));
    }

    output
}

/// Format empty portfolio message
pub fn format_empty_portfolio() -> String {
    format!(
        "{} No holdings found\nRecord a buy with: {} holdings add <symbol> <quantity> <price>\n",
        "ℹ".blue().bold(),
        "tadawul".bold()
    )
}

/// Warning banner for transactions the consolidator rejected
pub fn format_rejected_warning(rejected: &[RejectedTransaction]) -> String {
    let mut output = format!(
        "{} {} transaction(s) were excluded:\n",
        "⚠".yellow().bold(),
        rejected.len()
    );
    for r in rejected {
        output.push_str(&format!(
            "  #{} {} - {}\n",
            r.transaction.id, r.transaction.symbol, r.reason
        ));
    }
    output
}

/// Import issue listing, one line per problem
pub fn format_import_issues(issues: &[ImportIssue]) -> String {
    let mut output = format!(
        "{} {} row(s) had problems:\n",
        "⚠".yellow().bold(),
        issues.len()
    );
    for issue in issues {
        output.push_str(&format!(
            "  row {}, {}: {}",
            issue.row, issue.field, issue.reason
        ));
        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!(" ({})", suggestion.dimmed()));
        }
        output.push('\n');
    }
    output
}

/// Recorded transactions table
pub fn format_transactions_table(transactions: &[Transaction]) -> String {
    #[derive(Tabled)]
    struct TransactionRow {
        #[tabled(rename = "Id")]
        id: u64,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit Cost")]
        unit_cost: String,
        #[tabled(rename = "Broker")]
        broker: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id,
            symbol: t.symbol.clone(),
            quantity: format!("{:.2}", t.quantity),
            unit_cost: format!("{:.2}", t.unit_cost),
            broker: t.broker.clone(),
            date: t.date.map(|d| d.to_string()).unwrap_or_default(),
            source: t.source.as_str().to_string(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..4), Alignment::right());
    table.to_string()
}

/// RSI signal table
pub fn format_signals_table(signals: &[Signal]) -> String {
    #[derive(Tabled)]
    struct SignalRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Signal")]
        action: String,
        #[tabled(rename = "RSI")]
        rsi: String,
        #[tabled(rename = "Confidence")]
        confidence: String,
        #[tabled(rename = "Reason")]
        reason: String,
    }

    let rows: Vec<SignalRow> = signals
        .iter()
        .map(|s| {
            let action = match s.action {
                crate::signals::SignalAction::Buy => s.action.as_str().green().bold().to_string(),
                crate::signals::SignalAction::Sell => s.action.as_str().red().bold().to_string(),
                crate::signals::SignalAction::Hold => s.action.as_str().to_string(),
            };
            SignalRow {
                symbol: s.symbol.clone(),
                action,
                rsi: format!("{:.1}", s.rsi),
                confidence: format!("{:.0}%", s.confidence * 100.0),
                reason: s.reason.clone(),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.to_string()
}

/// Reference database search results
pub fn format_stock_matches(matches: &[StockMatch]) -> String {
    if matches.is_empty() {
        return format!("{} No matching stocks\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct MatchRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Company")]
        name: String,
        #[tabled(rename = "Sector")]
        sector: String,
    }

    let rows: Vec<MatchRow> = matches
        .iter()
        .map(|m| MatchRow {
            symbol: m.symbol.clone(),
            name: m.name.clone(),
            sector: m.sector.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.to_string()
}

/// Cached price listing with age
pub fn format_cached_prices(entries: &[(String, CacheEntry)]) -> String {
    if entries.is_empty() {
        return format!(
            "{} Price cache is empty. Run: {} prices update\n",
            "ℹ".blue().bold(),
            "tadawul".bold()
        );
    }

    #[derive(Tabled)]
    struct PriceRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Fetched")]
        fetched: String,
    }

    let now = chrono::Utc::now();
    let rows: Vec<PriceRow> = entries
        .iter()
        .map(|(symbol, entry)| {
            let age = now.signed_duration_since(entry.fetched_at);
            let fetched = if age.num_hours() >= 1 {
                format!("{}h ago", age.num_hours())
            } else {
                format!("{}m ago", age.num_minutes().max(0))
            };
            PriceRow {
                symbol: symbol.clone(),
                price: format!("{:.2}", entry.price),
                fetched,
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{consolidate, value};
    use crate::pricing::{PriceSnapshot, Quote};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn sample_report() -> ValuationReport {
        let transactions = vec![crate::holdings::Transaction {
            id: 1,
            symbol: "2222".to_string(),
            quantity: dec!(100),
            unit_cost: dec!(35.50),
            broker: "Al Rajhi Capital".to_string(),
            date: None,
            notes: None,
            source: crate::holdings::TransactionSource::Manual,
            recorded_at: Utc::now(),
        }];
        let consolidation = consolidate(&transactions);
        let mut snapshot = PriceSnapshot::new(Utc::now());
        snapshot.insert(
            "2222",
            Quote {
                price: dec!(36.00),
                source: PriceSource::Live,
            },
        );
        value(&consolidation.positions, &snapshot)
    }

    #[test]
    fn test_table_contains_position_and_totals() {
        colored::control::set_override(false);
        let output = format_portfolio_table(&sample_report(), &StockDatabase::embedded());
        assert!(output.contains("2222"));
        assert!(output.contains("Saudi Aramco"));
        assert!(output.contains("Total P&L:"));
        assert!(output.contains("SAR 3,600.00"));
    }

    #[test]
    fn test_json_output_is_parseable() {
        let output = format_portfolio_json(&sample_report());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["positions"][0]["symbol"], "2222");
        assert!(parsed["totals"]["market_value"].is_number() || parsed["totals"]["market_value"].is_string());
    }

    #[test]
    fn test_empty_portfolio_message() {
        colored::control::set_override(false);
        let output = format_empty_portfolio();
        assert!(output.contains("No holdings found"));
    }
}
