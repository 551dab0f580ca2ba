//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! One handler module per command family. Handlers own the wiring (store,
//! config, resolver) and delegate computation to the core modules.

mod exports;
mod holdings;
mod imports;
mod portfolio;
mod prices;
mod signals;
mod stocks;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::pricing::{cache, PriceCache, PriceResolver};

/// Route a parsed command to its handler
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let json_output = cli.json;

    match cli.command {
        Commands::Holdings { action } => holdings::dispatch_holdings(&action, json_output).await,
        Commands::Portfolio { action } => portfolio::dispatch_portfolio(&action, json_output).await,
        Commands::Import { file, dry_run } => imports::dispatch_import(&file, dry_run, json_output).await,
        Commands::Export { file } => exports::dispatch_export(&file).await,
        Commands::Template { file } => exports::dispatch_template(&file).await,
        Commands::Prices { action } => prices::dispatch_prices(&action, json_output).await,
        Commands::Signals { symbol } => signals::dispatch_signals(symbol.as_deref(), json_output).await,
        Commands::Stocks { action } => stocks::dispatch_stocks(&action, json_output).await,
    }
}

/// Build the configured resolver over the on-disk price cache
fn build_resolver(config: &Config) -> Result<PriceResolver> {
    let cache = PriceCache::load(cache::default_cache_path()?);
    PriceResolver::from_config(config, cache)
}

/// Live fetching is disabled when the user asked for offline mode or the
/// environment says so (tests, air-gapped use)
fn skip_price_fetch() -> bool {
    std::env::var("TADAWUL_SKIP_PRICE_FETCH")
        .map(|v| v != "0")
        .unwrap_or(false)
}
