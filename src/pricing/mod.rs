//! Pricing - market quotes for Tadawul symbols
//!
//! Providers are an explicit prioritized list behind one trait, not scattered
//! fallback chains. A valuation pass asks the resolver for one PriceSnapshot
//! covering every symbol it needs; all positions in the pass are valued from
//! that single snapshot. A symbol no provider can price is simply absent from
//! the snapshot and surfaces as unavailable, never as an aborted pass.

pub mod cache;
pub mod resolver;
pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::holdings::normalize_symbol;

pub use cache::{CacheEntry, PriceCache};
pub use resolver::PriceResolver;
pub use yahoo::YahooProvider;

/// Where a quote came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Live,
    Cached,
    Unavailable,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Live => "live",
            PriceSource::Cached => "cached",
            PriceSource::Unavailable => "unavailable",
        }
    }
}

/// A priced symbol within a snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub price: Decimal,
    pub source: PriceSource,
}

/// Prices for a set of symbols fetched at one logical point in time.
///
/// One snapshot per valuation pass: a price fetched at the start of the pass
/// is never mixed with one fetched seconds later for another symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSnapshot {
    pub fetched_at: DateTime<Utc>,
    quotes: HashMap<String, Quote>,
}

impl PriceSnapshot {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            quotes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: &str, quote: Quote) {
        self.quotes.insert(normalize_symbol(symbol), quote);
    }

    /// Quote for a symbol, or None if no provider could price it
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(&normalize_symbol(symbol))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.quotes.contains_key(&normalize_symbol(symbol))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Symbols present in the snapshot, in no particular order
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.quotes.keys().map(String::as_str)
    }
}

/// A named source of current prices. Implementations own their timeouts and
/// return an error rather than blocking indefinitely; the resolver degrades a
/// failed symbol to unavailable and keeps going.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Short name used in logs and the provider order config ("yahoo")
    fn name(&self) -> &'static str;

    /// Tag applied to quotes this provider produced
    fn source(&self) -> PriceSource;

    /// Current price for one symbol
    async fn fetch_quote(&self, symbol: &str) -> Result<Decimal>;
}
