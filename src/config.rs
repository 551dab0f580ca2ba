//! Configuration
//!
//! Optional TOML file in the platform config directory. Every field has a
//! default so a fresh install works with no config at all.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;

/// RSI signal thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    /// Days of history to request for the RSI window
    pub history_days: u32,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            history_days: 60,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quote providers in priority order
    pub providers: Vec<String>,
    /// How long a cached price still counts as current
    pub price_cache_ttl_hours: i64,
    /// Suffix mapping Tadawul codes to quote API symbols
    pub symbol_suffix: String,
    pub rsi: RsiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: vec!["yahoo".to_string()],
            price_cache_ttl_hours: 24,
            symbol_suffix: ".SR".to_string(),
            rsi: RsiConfig::default(),
        }
    }
}

/// Get the config file path (~/.config/tadawul/config.toml or platform
/// equivalent). `TADAWUL_CONFIG` overrides it.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TADAWUL_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dir_spec::config_home().map(|home| home.join("tadawul").join("config.toml"))
}

impl Config {
    /// Load the config file, or defaults when it does not exist.
    /// An unreadable or malformed file is an error; silently falling back to
    /// defaults would hide a typo in the user's config.
    pub fn load() -> Result<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("Invalid config at {:?}", path))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}
