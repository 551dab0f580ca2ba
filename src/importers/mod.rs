//! Bulk import of holdings from Excel workbooks
//!
//! Parsing and validation are separate passes: `excel::parse_portfolio_excel`
//! reads whatever the sheet contains into raw rows, `validate_rows` turns
//! them into transaction drafts and collects every issue found instead of
//! failing on the first. A 50-row workbook with 2 bad rows imports 48
//! holdings and reports 2 problems.

pub mod excel;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::holdings::{normalize_symbol, TransactionDraft, TransactionSource};

pub use excel::parse_portfolio_excel;

/// A validation issue found in one imported row
#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    /// Row number in the sheet (1-indexed for user display)
    pub row: usize,
    /// Field name with the issue ("symbol", "quantity", ...)
    pub field: String,
    /// The problematic value as it appeared
    pub value: String,
    pub reason: String,
    pub suggestion: Option<String>,
}

impl ImportIssue {
    fn new(
        row: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            row,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// One row as read from the sheet, before validation
#[derive(Debug, Clone, Default)]
pub struct RawHolding {
    /// 1-indexed sheet row
    pub row: usize,
    pub symbol: String,
    pub company_name: Option<String>,
    pub quantity: String,
    pub unit_cost: String,
    pub purchase_date: Option<String>,
    pub broker: Option<String>,
    pub notes: Option<String>,
}

/// Validation outcome: drafts for the good rows, issues for the rest
#[derive(Debug)]
pub struct ImportValidation {
    pub drafts: Vec<TransactionDraft>,
    pub issues: Vec<ImportIssue>,
}

impl ImportValidation {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Accepted date formats, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Tadawul symbols are numeric codes, typically 4 digits
fn is_plausible_symbol(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.len() <= 6 && symbol.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validate raw rows into transaction drafts, collecting all issues.
/// A row with any invalid field is excluded entirely; it produces an issue
/// per failing field, never a half-imported transaction.
pub fn validate_rows(rows: Vec<RawHolding>) -> ImportValidation {
    let mut drafts = Vec::new();
    let mut issues = Vec::new();

    for raw in rows {
        let mut row_ok = true;

        let symbol = normalize_symbol(&raw.symbol);
        if !is_plausible_symbol(&symbol) {
            issues.push(
                ImportIssue::new(
                    raw.row,
                    "symbol",
                    &raw.symbol,
                    format!("Invalid symbol '{}'", raw.symbol.trim()),
                )
                .with_suggestion("Use the Tadawul code, e.g. 2222 for Saudi Aramco"),
            );
            row_ok = false;
        }

        let quantity = match Decimal::from_str(raw.quantity.trim()) {
            Ok(q) if q > Decimal::ZERO => Some(q),
            Ok(q) => {
                issues.push(ImportIssue::new(
                    raw.row,
                    "quantity",
                    &raw.quantity,
                    format!("Quantity must be positive, got {}", q),
                ));
                row_ok = false;
                None
            }
            Err(_) => {
                issues.push(
                    ImportIssue::new(
                        raw.row,
                        "quantity",
                        &raw.quantity,
                        "Quantity is not a number",
                    )
                    .with_suggestion("Use a plain number of shares, e.g. 100"),
                );
                row_ok = false;
                None
            }
        };

        let unit_cost = match Decimal::from_str(raw.unit_cost.trim()) {
            Ok(p) if p > Decimal::ZERO => Some(p),
            Ok(p) => {
                issues.push(ImportIssue::new(
                    raw.row,
                    "average_price",
                    &raw.unit_cost,
                    format!("Purchase price must be positive, got {}", p),
                ));
                row_ok = false;
                None
            }
            Err(_) => {
                issues.push(
                    ImportIssue::new(
                        raw.row,
                        "average_price",
                        &raw.unit_cost,
                        "Purchase price is not a number",
                    )
                    .with_suggestion("Use the price in riyals, e.g. 35.50"),
                );
                row_ok = false;
                None
            }
        };

        // A bad date degrades to an issue but does not block the row; the
        // date is informational, the money fields are not
        let date = match raw.purchase_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => match parse_date(value) {
                Some(date) => Some(date),
                None => {
                    issues.push(
                        ImportIssue::new(
                            raw.row,
                            "purchase_date",
                            value,
                            format!("Unrecognized date '{}'", value),
                        )
                        .with_suggestion("Use YYYY-MM-DD"),
                    );
                    None
                }
            },
        };

        if !row_ok {
            continue;
        }

        let (quantity, unit_cost) = (
            quantity.expect("checked above"),
            unit_cost.expect("checked above"),
        );

        let mut draft = TransactionDraft::new(symbol, quantity, unit_cost)
            .with_source(TransactionSource::ExcelImport);
        if let Some(broker) = raw.broker.as_deref() {
            draft = draft.with_broker(broker);
        }
        if let Some(date) = date {
            draft = draft.with_date(date);
        }
        if let Some(notes) = raw.notes.as_deref().map(str::trim) {
            if !notes.is_empty() {
                draft = draft.with_notes(notes);
            }
        }
        drafts.push(draft);
    }

    ImportValidation { drafts, issues }
}
