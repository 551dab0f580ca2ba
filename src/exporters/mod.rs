//! Excel export - portfolio workbooks and the starter template
//!
//! The exported layout matches what the importer reads, so a round trip
//! (export, edit, import) works without fixing headers.

use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::portfolio::Position;
use crate::stocks::StockDatabase;

const SHEET_NAME: &str = "Portfolio";

const HEADERS: &[&str] = &[
    "Symbol",
    "Company_Name",
    "Shares",
    "Average_Price",
    "Purchase_Date",
    "Broker",
    "Notes",
];

/// Tadawul green, as used on the original branded template
const HEADER_COLOR: u32 = 0x00C851;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_COLOR))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn write_header(worksheet: &mut rust_xlsxwriter::Worksheet) -> Result<()> {
    let format = header_format();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &format)
            .context("Failed to write header row")?;
    }
    // Generous widths so names and notes are readable without resizing
    let widths: &[f64] = &[10.0, 32.0, 12.0, 14.0, 14.0, 20.0, 28.0];
    for (col, width) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width)
            .context("Failed to set column width")?;
    }
    Ok(())
}

/// Write a starter template with a few example rows
pub fn write_template<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Writing portfolio template to {:?}", path);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).context("Failed to name sheet")?;
    write_header(worksheet)?;

    let examples: &[(&str, &str, f64, f64, &str, &str, &str)] = &[
        ("2222", "Saudi Aramco", 100.0, 35.50, "2024-01-15", "Al Rajhi Capital", ""),
        ("1120", "Al Rajhi Bank", 50.0, 80.00, "2024-02-01", "SNB Capital", ""),
        ("2030", "Saudi Arabian Oil Co", 200.0, 31.25, "2024-03-15", "", "long term"),
    ];

    for (i, (symbol, name, shares, price, date, broker, notes)) in examples.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, *symbol).context("write")?;
        worksheet.write_string(row, 1, *name).context("write")?;
        worksheet.write_number(row, 2, *shares).context("write")?;
        worksheet.write_number(row, 3, *price).context("write")?;
        worksheet.write_string(row, 4, *date).context("write")?;
        worksheet.write_string(row, 5, *broker).context("write")?;
        worksheet.write_string(row, 6, *notes).context("write")?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save template to {:?}", path))?;
    Ok(())
}

/// Export the current portfolio, one row per consolidated position
pub fn write_portfolio<P: AsRef<Path>>(
    path: P,
    positions: &[Position],
    stocks: &StockDatabase,
) -> Result<()> {
    let path = path.as_ref();
    info!("Exporting {} positions to {:?}", positions.len(), path);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).context("Failed to name sheet")?;
    write_header(worksheet)?;

    for (i, position) in positions.iter().enumerate() {
        let row = (i + 1) as u32;
        let brokers = position
            .brokers
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        let date = position
            .earliest_purchase
            .map(|d| d.to_string())
            .unwrap_or_default();

        worksheet
            .write_string(row, 0, &position.symbol)
            .context("write")?;
        worksheet
            .write_string(row, 1, stocks.display_name(&position.symbol))
            .context("write")?;
        worksheet
            .write_number(row, 2, position.total_quantity.to_f64().unwrap_or(0.0))
            .context("write")?;
        worksheet
            .write_number(row, 3, position.average_cost().to_f64().unwrap_or(0.0))
            .context("write")?;
        worksheet.write_string(row, 4, date).context("write")?;
        worksheet.write_string(row, 5, &brokers).context("write")?;
        worksheet.write_string(row, 6, "").context("write")?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save portfolio to {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::{parse_portfolio_excel, validate_rows};
    use tempfile::TempDir;

    #[test]
    fn test_template_round_trips_through_importer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("template.xlsx");
        write_template(&path).unwrap();

        let rows = parse_portfolio_excel(&path).unwrap();
        assert_eq!(rows.len(), 3);

        let validation = validate_rows(rows);
        assert!(!validation.has_issues());
        assert_eq!(validation.drafts.len(), 3);
        assert_eq!(validation.drafts[0].symbol, "2222");
        assert_eq!(
            validation.drafts[0].date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_exported_positions_round_trip_through_importer() {
        use crate::holdings::{Transaction, TransactionSource};
        use crate::portfolio::consolidate;
        use rust_decimal_macros::dec;

        let transactions = vec![
            Transaction {
                id: 1,
                symbol: "2222".to_string(),
                quantity: dec!(100),
                unit_cost: dec!(35.50),
                broker: "Al Rajhi Capital".to_string(),
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15),
                notes: None,
                source: TransactionSource::Manual,
                recorded_at: chrono::Utc::now(),
            },
            Transaction {
                id: 2,
                symbol: "2222".to_string(),
                quantity: dec!(50),
                unit_cost: dec!(36.00),
                broker: "SNB Capital".to_string(),
                date: None,
                notes: None,
                source: TransactionSource::Manual,
                recorded_at: chrono::Utc::now(),
            },
        ];
        let consolidation = consolidate(&transactions);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.xlsx");
        write_portfolio(&path, &consolidation.positions, &StockDatabase::embedded()).unwrap();

        let validation = validate_rows(parse_portfolio_excel(&path).unwrap());
        assert!(!validation.has_issues());
        assert_eq!(validation.drafts.len(), 1);
        assert_eq!(validation.drafts[0].symbol, "2222");
        assert_eq!(validation.drafts[0].quantity, dec!(150));
    }
}
