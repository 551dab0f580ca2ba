//! Reference database queries

use anyhow::Result;
use colored::Colorize;

use crate::cli::{formatters, StockCommands};
use crate::stocks::StockDatabase;

pub async fn dispatch_stocks(action: &StockCommands, json_output: bool) -> Result<()> {
    let db = StockDatabase::load_default();

    match action {
        StockCommands::Search { query } => {
            let matches = db.search(query);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                println!("{}", formatters::format_stock_matches(&matches));
            }
        }
        StockCommands::Sectors => {
            let sectors = db.by_sector();
            if json_output {
                println!("{}", serde_json::to_string_pretty(&sectors)?);
                return Ok(());
            }
            for (sector, members) in &sectors {
                println!("\n{} ({})", sector.bold(), members.len());
                for m in members {
                    println!("  {}  {}", m.symbol, m.name);
                }
            }
        }
    }
    Ok(())
}
