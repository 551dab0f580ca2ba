//! Tadawul reference database - symbol to company name and sector
//!
//! Ships with an embedded table so lookups work on a fresh install; a user
//! override file in the data directory replaces it entirely when present.

use anyhow::Context;
use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::error::Result;
use crate::holdings::normalize_symbol;

const EMBEDDED_DB: &str = include_str!("tadawul_stocks.json");

/// Reference data for one listed company
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockInfo {
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    pub sector: String,
}

static EMBEDDED: Lazy<HashMap<String, StockInfo>> = Lazy::new(|| {
    serde_json::from_str(EMBEDDED_DB).expect("embedded stock database is valid JSON")
});

/// A search hit, symbol plus its reference data
#[derive(Debug, Clone, Serialize)]
pub struct StockMatch {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

/// Symbol lookup over the embedded table or a user-provided override
#[derive(Debug)]
pub struct StockDatabase {
    stocks: HashMap<String, StockInfo>,
}

impl Default for StockDatabase {
    fn default() -> Self {
        Self::embedded()
    }
}

impl StockDatabase {
    /// The compiled-in table
    pub fn embedded() -> Self {
        Self {
            stocks: EMBEDDED.clone(),
        }
    }

    /// Load a user override file (same JSON shape as the embedded table)
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stock database at {:?}", path))?;
        let stocks: HashMap<String, StockInfo> = serde_json::from_str(&raw)
            .with_context(|| format!("Stock database at {:?} is not valid", path))?;
        debug!("Loaded {} stocks from {:?}", stocks.len(), path);
        Ok(Self { stocks })
    }

    /// Load the override from the data directory when present, otherwise the
    /// embedded table.
    pub fn load_default() -> Self {
        if let Ok(dir) = crate::holdings::default_data_dir() {
            let override_path = dir.join("stocks.json");
            if override_path.exists() {
                match Self::from_file(&override_path) {
                    Ok(db) => return db,
                    Err(e) => tracing::warn!("Ignoring stock database override: {}", e),
                }
            }
        }
        Self::embedded()
    }

    pub fn get(&self, symbol: &str) -> Option<&StockInfo> {
        self.stocks.get(&normalize_symbol(symbol))
    }

    /// Company name for a symbol, or the symbol itself when unknown
    pub fn display_name(&self, symbol: &str) -> String {
        self.get(symbol)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| normalize_symbol(symbol))
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Case-insensitive search across symbol, English name, Arabic name and
    /// sector. Results ordered by symbol.
    pub fn search(&self, query: &str) -> Vec<StockMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<StockMatch> = self
            .stocks
            .iter()
            .filter(|(symbol, info)| {
                symbol.to_lowercase().contains(&query)
                    || info.name.to_lowercase().contains(&query)
                    || info.name_ar.contains(&query)
                    || info.sector.to_lowercase().contains(&query)
            })
            .map(|(symbol, info)| StockMatch {
                symbol: symbol.clone(),
                name: info.name.clone(),
                sector: info.sector.clone(),
            })
            .collect();
        matches.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        matches
    }

    /// Symbols grouped by sector, sectors and members both ordered
    pub fn by_sector(&self) -> BTreeMap<String, Vec<StockMatch>> {
        let mut sectors: BTreeMap<String, Vec<StockMatch>> = self
            .stocks
            .iter()
            .map(|(symbol, info)| StockMatch {
                symbol: symbol.clone(),
                name: info.name.clone(),
                sector: info.sector.clone(),
            })
            .into_group_map_by(|m| m.sector.clone())
            .into_iter()
            .collect();
        for members in sectors.values_mut() {
            members.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        }
        sectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_loads() {
        let db = StockDatabase::embedded();
        assert!(db.len() > 50);
        let aramco = db.get("2222").unwrap();
        assert_eq!(aramco.name, "Saudi Aramco");
        assert_eq!(aramco.sector, "Energy");
    }

    #[test]
    fn test_lookup_normalizes_symbol() {
        let db = StockDatabase::embedded();
        assert!(db.get(" 2222 ").is_some());
        assert_eq!(db.display_name("1120"), "Al Rajhi Bank");
        assert_eq!(db.display_name("9999"), "9999");
    }

    #[test]
    fn test_search_by_name_and_sector() {
        let db = StockDatabase::embedded();

        let hits = db.search("rajhi");
        assert!(hits.iter().any(|m| m.symbol == "1120"));

        let banks = db.search("banking");
        assert!(banks.len() >= 5);
        assert!(banks.iter().all(|m| m.sector == "Banking"));

        assert!(db.search("").is_empty());
    }

    #[test]
    fn test_sector_grouping_is_ordered() {
        let db = StockDatabase::embedded();
        let sectors = db.by_sector();
        assert!(sectors.contains_key("Banking"));
        assert!(sectors.contains_key("Energy"));

        let banking = &sectors["Banking"];
        let mut sorted = banking.clone();
        sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        assert_eq!(
            banking.iter().map(|m| &m.symbol).collect::<Vec<_>>(),
            sorted.iter().map(|m| &m.symbol).collect::<Vec<_>>()
        );
    }
}
