//! Portfolio workbook parser
//!
//! Reads the template layout the exporter produces (Symbol, Company_Name,
//! Shares, Average_Price, Purchase_Date, Broker, Notes). Header matching is
//! lenient about naming so hand-edited sheets still import.

use anyhow::{anyhow, Context};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::importers::RawHolding;

/// Column indexes resolved from the header row
#[derive(Debug, Default)]
struct ColumnMapping {
    symbol: Option<usize>,
    company_name: Option<usize>,
    quantity: Option<usize>,
    unit_cost: Option<usize>,
    purchase_date: Option<usize>,
    broker: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMapping {
    fn from_header(row: &[Data]) -> Self {
        let mut mapping = Self::default();

        for (idx, cell) in row.iter().enumerate() {
            let header = cell.to_string().trim().to_lowercase().replace([' ', '-'], "_");
            match header.as_str() {
                "symbol" | "ticker" | "code" => mapping.symbol = Some(idx),
                "company_name" | "company" | "name" => mapping.company_name = Some(idx),
                "shares" | "quantity" | "qty" => mapping.quantity = Some(idx),
                "average_price" | "avg_price" | "price" | "purchase_price" | "unit_cost" => {
                    mapping.unit_cost = Some(idx)
                }
                "purchase_date" | "date" => mapping.purchase_date = Some(idx),
                "broker" => mapping.broker = Some(idx),
                "notes" | "note" => mapping.notes = Some(idx),
                _ => {}
            }
        }

        mapping
    }

    fn is_valid(&self) -> bool {
        self.symbol.is_some() && self.quantity.is_some() && self.unit_cost.is_some()
    }
}

fn cell_string(row: &[Data], idx: Option<usize>) -> Option<String> {
    let cell = row.get(idx?)?;
    if cell.is_empty() {
        return None;
    }
    let text = cell.to_string().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Numeric cells print like "100" or "35.5"; symbols typed as numbers in
/// Excel come back as floats ("2222.0"), so strip a trailing ".0"
fn cell_symbol(row: &[Data], idx: Option<usize>) -> String {
    let raw = cell_string(row, idx).unwrap_or_default();
    match raw.strip_suffix(".0") {
        Some(stripped) if stripped.chars().all(|c| c.is_ascii_digit()) => stripped.to_string(),
        _ => raw,
    }
}

/// Parse a portfolio workbook into raw rows for validation.
///
/// Fails only when the workbook itself is unusable (unreadable, no header
/// row). Individual cell problems are left for `validate_rows` to report.
pub fn parse_portfolio_excel<P: AsRef<Path>>(file_path: P) -> Result<Vec<RawHolding>> {
    let path = file_path.as_ref();
    info!("Parsing portfolio workbook: {:?}", path);

    let mut workbook: Xlsx<_> = open_workbook(path).context("Failed to open Excel file")?;

    let sheet_name = find_portfolio_sheet(&workbook)?;
    debug!("Reading sheet: {}", sheet_name);

    let range = workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read worksheet")?;

    let mut header_row_idx = None;
    let mut column_mapping: Option<ColumnMapping> = None;

    for (idx, row) in range.rows().enumerate() {
        let row_text = row
            .iter()
            .map(|cell| cell.to_string().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        if row_text.contains("symbol") || row_text.contains("ticker") {
            let mapping = ColumnMapping::from_header(row);
            if mapping.is_valid() {
                debug!("Column mapping: {:?}", mapping);
                header_row_idx = Some(idx);
                column_mapping = Some(mapping);
                break;
            }
            warn!("Header-like row {} is missing required columns", idx + 1);
        }
    }

    let header_idx = header_row_idx
        .ok_or_else(|| anyhow!("Could not find a header row with Symbol/Shares/Average_Price"))?;
    let mapping = column_mapping.expect("set together with header_row_idx");

    let mut rows = Vec::new();
    for (idx, row) in range.rows().enumerate() {
        if idx <= header_idx {
            continue;
        }
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        rows.push(RawHolding {
            row: idx + 1,
            symbol: cell_symbol(row, mapping.symbol),
            company_name: cell_string(row, mapping.company_name),
            quantity: cell_string(row, mapping.quantity).unwrap_or_default(),
            unit_cost: cell_string(row, mapping.unit_cost).unwrap_or_default(),
            purchase_date: cell_string(row, mapping.purchase_date),
            broker: cell_string(row, mapping.broker),
            notes: cell_string(row, mapping.notes),
        });
    }

    info!("Parsed {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Find the sheet holding portfolio rows
fn find_portfolio_sheet(workbook: &Xlsx<std::io::BufReader<std::fs::File>>) -> Result<String> {
    let sheet_names = workbook.sheet_names();

    let patterns = ["portfolio", "holdings"];
    for pattern in &patterns {
        for name in &sheet_names {
            if name.to_lowercase().contains(pattern) {
                return Ok(name.clone());
            }
        }
    }

    sheet_names
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("No sheets found in workbook"))
}
