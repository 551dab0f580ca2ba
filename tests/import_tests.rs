//! Integration tests for Excel import
//!
//! Workbook fixtures are generated on the fly with rust_xlsxwriter, parsed
//! with the importer, validated, and loaded into a temp store.

use rust_decimal_macros::dec;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tadawul::holdings::HoldingsStore;
use tadawul::importers::{parse_portfolio_excel, validate_rows};
use tadawul::portfolio::consolidate;
use tempfile::TempDir;

const HEADERS: &[&str] = &[
    "Symbol",
    "Company_Name",
    "Shares",
    "Average_Price",
    "Purchase_Date",
    "Broker",
    "Notes",
];

/// Test helper: write a portfolio workbook with the given data rows
fn write_fixture(path: &Path, rows: &[[&str; 7]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Portfolio").unwrap();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            // Numeric columns written as numbers, like a real sheet
            if (col == 2 || col == 3) && !cell.is_empty() {
                worksheet
                    .write_number((i + 1) as u32, col as u16, cell.parse::<f64>().unwrap())
                    .unwrap();
            } else {
                worksheet
                    .write_string((i + 1) as u32, col as u16, *cell)
                    .unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn clean_workbook_imports_fully() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portfolio.xlsx");
    write_fixture(
        &path,
        &[
            ["2222", "Saudi Aramco", "100", "35.50", "2024-01-15", "alrajhi", ""],
            ["1120", "Al Rajhi Bank", "20", "80.00", "", "snb", "core holding"],
        ],
    );

    let validation = validate_rows(parse_portfolio_excel(&path).unwrap());
    assert!(!validation.has_issues());
    assert_eq!(validation.drafts.len(), 2);

    let mut store = HoldingsStore::open(Some(dir.path().join("holdings.json"))).unwrap();
    for draft in validation.drafts {
        store.add_transaction(draft).unwrap();
    }
    store.save().unwrap();

    let txs = store.list_transactions();
    assert_eq!(txs[0].broker, "Al Rajhi Capital");
    assert_eq!(txs[1].broker, "SNB Capital");
    assert_eq!(txs[1].notes.as_deref(), Some("core holding"));
}

#[test]
fn bad_rows_reported_good_rows_imported() {
    // A batch with malformed rows still imports the rest, with the problems
    // listed per row
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portfolio.xlsx");
    write_fixture(
        &path,
        &[
            ["2222", "Saudi Aramco", "100", "35.50", "", "", ""],
            ["1120", "Al Rajhi Bank", "-5", "80.00", "", "", ""],
            ["", "Mystery", "10", "20.00", "", "", ""],
            ["2030", "Saudi Arabian Oil Co", "200", "31.25", "", "", ""],
        ],
    );

    let validation = validate_rows(parse_portfolio_excel(&path).unwrap());
    assert_eq!(validation.drafts.len(), 2);
    assert_eq!(validation.issues.len(), 2);

    // Issues carry the sheet row (header is row 1)
    assert_eq!(validation.issues[0].row, 3);
    assert_eq!(validation.issues[0].field, "quantity");
    assert_eq!(validation.issues[1].row, 4);
    assert_eq!(validation.issues[1].field, "symbol");
}

#[test]
fn symbols_typed_as_numbers_still_import() {
    // Excel users type 2222 into the symbol cell and get a numeric cell
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portfolio.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Portfolio").unwrap();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    worksheet.write_number(1, 0, 2222.0).unwrap();
    worksheet.write_number(1, 2, 100.0).unwrap();
    worksheet.write_number(1, 3, 35.5).unwrap();
    workbook.save(&path).unwrap();

    let validation = validate_rows(parse_portfolio_excel(&path).unwrap());
    assert!(!validation.has_issues());
    assert_eq!(validation.drafts[0].symbol, "2222");
}

#[test]
fn import_then_consolidate_matches_sheet_totals() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portfolio.xlsx");
    write_fixture(
        &path,
        &[
            ["2222", "", "100", "35.50", "", "BrokerA", ""],
            ["2222", "", "50", "36.00", "", "BrokerB", ""],
        ],
    );

    let validation = validate_rows(parse_portfolio_excel(&path).unwrap());
    let mut store = HoldingsStore::open(Some(dir.path().join("holdings.json"))).unwrap();
    for draft in validation.drafts {
        store.add_transaction(draft).unwrap();
    }

    let consolidation = consolidate(store.list_transactions());
    let position = consolidation.position("2222").unwrap();
    assert_eq!(position.total_quantity, dec!(150));
    assert_eq!(position.total_cost, dec!(5350.00));
}

#[test]
fn workbook_without_header_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noheader.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "2222").unwrap();
    worksheet.write_number(0, 1, 100.0).unwrap();
    workbook.save(&path).unwrap();

    let result = parse_portfolio_excel(&path);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("header"));
}
