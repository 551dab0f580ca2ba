//! Price resolver - one snapshot per valuation pass
//!
//! Resolution order: fresh cache entries first, then each configured
//! provider in priority order for whatever is still missing. Per-symbol
//! fetches fan out under a semaphore to stay below API rate limits. A
//! symbol every source fails on is left out of the snapshot; the valuator
//! renders it as unavailable.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::pricing::{PriceCache, PriceProvider, PriceSnapshot, PriceSource, Quote, YahooProvider};

/// Maximum concurrent quote requests to avoid rate limiting
const MAX_CONCURRENT_REQUESTS: usize = 5;

pub struct PriceResolver {
    providers: Vec<Arc<dyn PriceProvider>>,
    cache: PriceCache,
    cache_ttl: Duration,
}

impl PriceResolver {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>, cache: PriceCache, cache_ttl: Duration) -> Self {
        Self {
            providers,
            cache,
            cache_ttl,
        }
    }

    /// Build the provider chain named in the config
    pub fn from_config(config: &Config, cache: PriceCache) -> Result<Self> {
        let mut providers: Vec<Arc<dyn PriceProvider>> = Vec::new();
        for name in &config.providers {
            match name.as_str() {
                "yahoo" => providers.push(Arc::new(YahooProvider::new(Some(
                    config.symbol_suffix.clone(),
                ))?)),
                other => warn!("Unknown price provider '{}' in config, skipping", other),
            }
        }
        Ok(Self::new(
            providers,
            cache,
            Duration::hours(config.price_cache_ttl_hours),
        ))
    }

    /// Fetch one snapshot covering `symbols`, consulting the cache first and
    /// then each provider in order. Live results are written back to the
    /// cache. Never fails the pass for a single symbol.
    pub async fn snapshot(&mut self, symbols: &BTreeSet<String>) -> Result<PriceSnapshot> {
        self.snapshot_with_progress(symbols, |_| {}).await
    }

    /// Snapshot with a per-symbol completion callback for progress display
    pub async fn snapshot_with_progress<F>(
        &mut self,
        symbols: &BTreeSet<String>,
        mut progress: F,
    ) -> Result<PriceSnapshot>
    where
        F: FnMut(&str),
    {
        let mut snapshot = PriceSnapshot::new(Utc::now());

        // Fresh cache hits first
        for symbol in symbols {
            if let Some(entry) = self.cache.get_fresh(symbol, self.cache_ttl) {
                snapshot.insert(
                    symbol,
                    Quote {
                        price: entry.price,
                        source: PriceSource::Cached,
                    },
                );
                progress(symbol.as_str());
            }
        }

        let fetched = self.fill_from_providers(symbols, &mut snapshot, &mut progress).await;

        // Write live quotes back so the next pass (and offline mode) has them
        if fetched > 0 {
            for symbol in symbols {
                if let Some(quote) = snapshot.get(symbol) {
                    if quote.source == PriceSource::Live {
                        self.cache.insert(symbol, quote.price, snapshot.fetched_at);
                    }
                }
            }
            if let Err(e) = self.cache.save() {
                warn!("Failed to persist price cache: {}", e);
            }
        }

        info!(
            "Snapshot covers {}/{} symbols",
            snapshot.len(),
            symbols.len()
        );
        Ok(snapshot)
    }

    /// Snapshot from the cache alone, any age. Used by offline mode and by
    /// tests that must not touch the network.
    pub fn snapshot_offline(&self, symbols: &BTreeSet<String>) -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::new(Utc::now());
        for symbol in symbols {
            if let Some(entry) = self.cache.get_any(symbol) {
                snapshot.insert(
                    symbol,
                    Quote {
                        price: entry.price,
                        source: PriceSource::Cached,
                    },
                );
            }
        }
        snapshot
    }

    /// Force-refresh every symbol from the providers, ignoring cache TTL
    pub async fn refresh_with_progress<F>(
        &mut self,
        symbols: &BTreeSet<String>,
        mut progress: F,
    ) -> Result<PriceSnapshot>
    where
        F: FnMut(&str),
    {
        let mut snapshot = PriceSnapshot::new(Utc::now());
        self.fill_from_providers(symbols, &mut snapshot, &mut progress).await;

        for symbol in symbols {
            if let Some(quote) = snapshot.get(symbol) {
                if quote.source == PriceSource::Live {
                    self.cache.insert(symbol, quote.price, snapshot.fetched_at);
                }
            }
        }
        self.cache.save()?;
        Ok(snapshot)
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Run the provider chain over whatever `snapshot` is still missing.
    /// Returns how many symbols were resolved.
    async fn fill_from_providers<F>(
        &self,
        symbols: &BTreeSet<String>,
        snapshot: &mut PriceSnapshot,
        progress: &mut F,
    ) -> usize
    where
        F: FnMut(&str),
    {
        let mut resolved = 0;

        for provider in &self.providers {
            let missing: Vec<String> = symbols
                .iter()
                .filter(|s| !snapshot.contains(s))
                .cloned()
                .collect();
            if missing.is_empty() {
                break;
            }

            debug!(
                "Asking provider '{}' for {} symbols",
                provider.name(),
                missing.len()
            );

            let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));
            let mut join_set: JoinSet<(String, Result<Decimal>)> = JoinSet::new();

            for symbol in missing {
                let sem = semaphore.clone();
                let provider = provider.clone();
                join_set.spawn(async move {
                    let _permit = sem.acquire().await.expect("semaphore closed");
                    let result = provider.fetch_quote(&symbol).await;
                    (symbol, result)
                });
            }

            // Collect as they complete, not in spawn order
            while let Some(joined) = join_set.join_next().await {
                let Ok((symbol, result)) = joined else {
                    continue;
                };
                match result {
                    Ok(price) => {
                        snapshot.insert(
                            &symbol,
                            Quote {
                                price,
                                source: provider.source(),
                            },
                        );
                        resolved += 1;
                        progress(symbol.as_str());
                        debug!("{} -> {} via {}", symbol, price, provider.name());
                    }
                    Err(e) => {
                        warn!(
                            "Provider '{}' failed for {}: {}",
                            provider.name(),
                            symbol,
                            e
                        );
                    }
                }
            }
        }

        resolved
    }
}
