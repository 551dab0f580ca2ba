//! Excel import handler

use anyhow::Result;
use colored::Colorize;

use crate::cli::formatters;
use crate::holdings::HoldingsStore;
use crate::importers::{parse_portfolio_excel, validate_rows};

pub async fn dispatch_import(file: &str, dry_run: bool, json_output: bool) -> Result<()> {
    tracing::info!("Importing holdings from {}", file);

    let rows = parse_portfolio_excel(file)?;
    let total_rows = rows.len();
    let validation = validate_rows(rows);

    if json_output {
        let summary = serde_json::json!({
            "file": file,
            "rows": total_rows,
            "importable": validation.drafts.len(),
            "issues": validation.issues,
            "dry_run": dry_run,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        if dry_run {
            return Ok(());
        }
    } else {
        println!(
            "Found {} row(s), {} importable",
            total_rows,
            validation.drafts.len()
        );
        if validation.has_issues() {
            println!("{}", formatters::format_import_issues(&validation.issues));
        }
    }

    if dry_run {
        if !json_output {
            println!("{} Dry run, nothing saved", "ℹ".blue().bold());
        }
        return Ok(());
    }

    let mut store = HoldingsStore::open(None)?;
    let mut imported = 0usize;
    for draft in validation.drafts {
        store.add_transaction(draft)?;
        imported += 1;
    }
    store.save()?;

    if !json_output {
        println!(
            "{} Imported {} transaction(s) into {:?}",
            "✓".green().bold(),
            imported,
            store.path()
        );
    }
    Ok(())
}
