//! File-backed price cache
//!
//! Quotes fetched live are written back here so the portfolio stays viewable
//! offline and repeated interactions within the TTL do not hammer the quote
//! API. Entries are per-symbol with their own fetch timestamp.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::holdings::normalize_symbol;

/// One cached quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// On-disk cache format
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    prices: HashMap<String, CacheEntry>,
}

/// Default cache location, next to the holdings file
pub fn default_cache_path() -> Result<PathBuf> {
    Ok(crate::holdings::default_data_dir()?.join("prices.json"))
}

/// Price cache persisted as JSON next to the holdings file
#[derive(Debug)]
pub struct PriceCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl PriceCache {
    /// Load the cache at `path`. A missing or unreadable cache file is an
    /// empty cache; stale price data is never worth failing startup over.
    pub fn load(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<CacheFile>(&raw) {
                Ok(file) => {
                    info!("Loaded {} cached prices from {:?}", file.prices.len(), path);
                    file.prices
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid price cache at {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    /// Cached price for a symbol if it was fetched within `max_age`
    pub fn get_fresh(&self, symbol: &str, max_age: Duration) -> Option<&CacheEntry> {
        let entry = self.entries.get(&normalize_symbol(symbol))?;
        let age = Utc::now().signed_duration_since(entry.fetched_at);
        if age < max_age {
            Some(entry)
        } else {
            debug!("Cached price for {} is stale ({}h old)", symbol, age.num_hours());
            None
        }
    }

    /// Cached price for a symbol regardless of age (offline mode)
    pub fn get_any(&self, symbol: &str) -> Option<&CacheEntry> {
        self.entries.get(&normalize_symbol(symbol))
    }

    pub fn insert(&mut self, symbol: &str, price: Decimal, fetched_at: DateTime<Utc>) {
        self.entries.insert(
            normalize_symbol(symbol),
            CacheEntry { price, fetched_at },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All cached entries, for `prices show`
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Persist the cache (temp file + rename, same policy as the store)
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {:?}", parent))?;
        }

        let file = CacheFile {
            prices: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize price cache")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write price cache to {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace price cache {:?}", self.path))?;

        debug!("Saved {} cached prices to {:?}", self.entries.len(), self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
