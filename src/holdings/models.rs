use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a transaction entered the system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Manual,
    ExcelImport,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::Manual => "manual",
            TransactionSource::ExcelImport => "excel_import",
        }
    }
}

/// A single recorded buy of a Tadawul stock.
///
/// Immutable once recorded; never mutated, only superseded by new
/// transactions. The id is assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub symbol: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub broker: String,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub source: TransactionSource,
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Symbol with surrounding whitespace trimmed and case folded to upper.
    /// " 2222 " and "2222" are the same stock; so are "aramco" and "ARAMCO".
    pub fn normalized_symbol(&self) -> String {
        normalize_symbol(&self.symbol)
    }

    /// Check the record against the input-boundary rules. Returns the reason
    /// the record is invalid, if any.
    pub fn validation_error(&self) -> Option<String> {
        if normalize_symbol(&self.symbol).is_empty() {
            return Some("symbol is empty".to_string());
        }
        if self.quantity <= Decimal::ZERO {
            return Some(format!("quantity must be positive, got {}", self.quantity));
        }
        if self.unit_cost <= Decimal::ZERO {
            return Some(format!("unit cost must be positive, got {}", self.unit_cost));
        }
        None
    }
}

/// Unvalidated transaction input, from the CLI or an import row.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub symbol: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub broker: Option<String>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub source: TransactionSource,
}

impl TransactionDraft {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, unit_cost: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            unit_cost,
            broker: None,
            date: None,
            notes: None,
            source: TransactionSource::Manual,
        }
    }

    pub fn with_broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = Some(broker.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_source(mut self, source: TransactionSource) -> Self {
        self.source = source;
        self
    }
}

/// Normalize a ticker symbol: trim whitespace, uppercase.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Standardize broker names so one broker does not appear under several
/// spellings ("alrajhi", "Al-Rajhi Capital" and "RAJHI" are one broker).
/// Unknown names are title-cased as given; empty input maps to "Unknown".
pub fn normalize_broker_name(broker: &str) -> String {
    let trimmed = broker.trim();
    if trimmed.is_empty() {
        return "Unknown".to_string();
    }

    let lower = trimmed.to_lowercase();

    if lower.contains("rajhi") {
        return "Al Rajhi Capital".to_string();
    }
    if ["ncb", "alahli", "al ahli", "snb"]
        .iter()
        .any(|term| lower.contains(term))
    {
        return "SNB Capital".to_string();
    }
    if lower.contains("bsf") || lower.contains("fransi") {
        return "BSF Capital".to_string();
    }
    if lower.contains("inma") {
        return "Alinma Investment".to_string();
    }
    if lower.contains("jazira") {
        return "AlJazira Capital".to_string();
    }
    if lower.contains("samba") {
        return "Samba Capital".to_string();
    }

    // Title-case unknown brokers
    trimmed
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transaction(symbol: &str, quantity: Decimal, unit_cost: Decimal) -> Transaction {
        Transaction {
            id: 1,
            symbol: symbol.to_string(),
            quantity,
            unit_cost,
            broker: "Unknown".to_string(),
            date: None,
            notes: None,
            source: TransactionSource::Manual,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_symbol_trims_and_uppercases() {
        assert_eq!(normalize_symbol(" 2222 "), "2222");
        assert_eq!(normalize_symbol("aramco"), "ARAMCO");
        assert_eq!(normalize_symbol("  "), "");
    }

    #[test]
    fn test_validation_rejects_non_positive_quantity() {
        let tx = transaction("2222", dec!(-5), dec!(35.50));
        let reason = tx.validation_error().expect("should be invalid");
        assert!(reason.contains("quantity"));

        let tx = transaction("2222", dec!(0), dec!(35.50));
        assert!(tx.validation_error().is_some());
    }

    #[test]
    fn test_validation_rejects_non_positive_cost_and_empty_symbol() {
        let tx = transaction("2222", dec!(10), dec!(0));
        assert!(tx.validation_error().unwrap().contains("unit cost"));

        let tx = transaction("   ", dec!(10), dec!(35.50));
        assert!(tx.validation_error().unwrap().contains("symbol"));
    }

    #[test]
    fn test_valid_transaction_passes() {
        let tx = transaction("2222", dec!(100), dec!(35.50));
        assert!(tx.validation_error().is_none());
    }

    #[test]
    fn test_broker_standardization() {
        assert_eq!(normalize_broker_name("alrajhi"), "Al Rajhi Capital");
        assert_eq!(normalize_broker_name("Al-Rajhi Capital"), "Al Rajhi Capital");
        assert_eq!(normalize_broker_name("SNB capital"), "SNB Capital");
        assert_eq!(normalize_broker_name("banque fransi"), "BSF Capital");
        assert_eq!(normalize_broker_name(""), "Unknown");
        assert_eq!(normalize_broker_name("  "), "Unknown");
        assert_eq!(normalize_broker_name("some broker"), "Some Broker");
    }
}
