//! Holdings store - one canonical JSON file of transaction records
//!
//! The store exclusively owns Transaction records. Records are append-only:
//! created by user input or bulk import, never mutated in place. Saves are
//! atomic (write to a temp file, then rename) so a crash mid-write cannot
//! corrupt the portfolio.

pub mod models;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use models::{
    normalize_broker_name, normalize_symbol, Transaction, TransactionDraft, TransactionSource,
};

use crate::error::PortfolioError;

const STORE_FILE_VERSION: u32 = 1;

/// On-disk representation of the holdings file
#[derive(Debug, Serialize, Deserialize)]
struct HoldingsFile {
    version: u32,
    transactions: Vec<Transaction>,
}

/// Get the default data directory (~/.local/share/tadawul or platform
/// equivalent). `TADAWUL_DATA_DIR` overrides it, which tests rely on.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TADAWUL_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let data_home = dir_spec::data_home()
        .ok_or_else(|| PortfolioError::StoreError("could not determine data directory".into()))?;
    Ok(data_home.join("tadawul"))
}

/// Get the default holdings file path
pub fn default_store_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join("holdings.json"))
}

/// JSON-file-backed store of transaction records
#[derive(Debug)]
pub struct HoldingsStore {
    path: PathBuf,
    transactions: Vec<Transaction>,
    next_id: u64,
}

impl HoldingsStore {
    /// Open the store at the given path, or the default location.
    /// A missing file is an empty portfolio, not an error.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => default_store_path()?,
        };

        if !path.exists() {
            debug!("No holdings file at {:?}, starting empty", path);
            return Ok(Self {
                path,
                transactions: Vec::new(),
                next_id: 1,
            });
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read holdings file at {:?}", path))?;
        let file: HoldingsFile = serde_json::from_str(&raw)
            .with_context(|| format!("Holdings file at {:?} is not valid", path))?;

        let next_id = file
            .transactions
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(1, |max| max + 1);

        info!(
            "Loaded {} transactions from {:?}",
            file.transactions.len(),
            path
        );

        Ok(Self {
            path,
            transactions: file.transactions,
            next_id,
        })
    }

    /// All recorded transactions, in insertion order.
    pub fn list_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Validate and record a new transaction. Malformed input is rejected at
    /// this boundary with `InvalidTransaction`, never coerced.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<&Transaction> {
        let transaction = Transaction {
            id: self.next_id,
            symbol: normalize_symbol(&draft.symbol),
            quantity: draft.quantity,
            unit_cost: draft.unit_cost,
            broker: normalize_broker_name(draft.broker.as_deref().unwrap_or("")),
            date: draft.date,
            notes: draft.notes,
            source: draft.source,
            recorded_at: Utc::now(),
        };

        if let Some(reason) = transaction.validation_error() {
            return Err(PortfolioError::InvalidTransaction(reason).into());
        }

        self.next_id += 1;
        self.transactions.push(transaction);
        Ok(self.transactions.last().expect("just pushed"))
    }

    /// Remove a transaction by id. Returns true if something was removed.
    pub fn remove_transaction(&mut self, id: u64) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    /// Persist the store. Writes to a sibling temp file and renames over the
    /// target so readers never observe a half-written file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let file = HoldingsFile {
            version: STORE_FILE_VERSION,
            transactions: self.transactions.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize holdings")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write holdings to {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace holdings file {:?}", self.path))?;

        debug!(
            "Saved {} transactions to {:?}",
            self.transactions.len(),
            self.path
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
