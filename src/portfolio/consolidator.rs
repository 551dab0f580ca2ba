//! Consolidation of raw transactions into per-symbol positions
//!
//! Transactions for the same stock may be split across brokers or duplicated
//! across re-imports, and symbols may differ only by case or surrounding
//! whitespace. Consolidation groups by normalized symbol and computes a
//! quantity-weighted average cost. Malformed rows are collected into a
//! rejected list instead of failing the batch (an import of 50 rows with 2
//! bad ones still yields 48 consolidated holdings plus 2 reports).

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::holdings::Transaction;

/// The consolidated holding of one symbol across all transactions and brokers.
///
/// Derived, never stored: recomputed fully from source transactions on every
/// request, so it cannot go stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Normalized ticker symbol
    pub symbol: String,
    /// Sum of constituent transaction quantities, always > 0
    pub total_quantity: Decimal,
    /// Sum of quantity x unit_cost across constituent transactions.
    /// Kept exact so cost bases reconcile against the source records.
    pub total_cost: Decimal,
    /// Distinct broker names contributing to this symbol
    pub brokers: BTreeSet<String>,
    /// Earliest purchase date across constituent transactions, if any dated
    pub earliest_purchase: Option<chrono::NaiveDate>,
}

impl Position {
    /// Quantity-weighted mean of unit cost. (10 @ 100) + (90 @ 200) is 190,
    /// not the simple mean 150.
    pub fn average_cost(&self) -> Decimal {
        if self.total_quantity > Decimal::ZERO {
            self.total_cost / self.total_quantity
        } else {
            Decimal::ZERO
        }
    }

    /// Total amount originally paid for this position
    pub fn cost_basis(&self) -> Decimal {
        self.total_cost
    }
}

/// A transaction excluded from consolidation, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct RejectedTransaction {
    pub transaction: Transaction,
    pub reason: String,
}

/// Result of consolidating a batch: positions for the valid rows plus every
/// rejected row. Partial success, not all-or-nothing.
#[derive(Debug, Clone, Serialize)]
pub struct Consolidation {
    /// At most one Position per normalized symbol, ordered by symbol
    pub positions: Vec<Position>,
    pub rejected: Vec<RejectedTransaction>,
}

impl Consolidation {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        let normalized = crate::holdings::normalize_symbol(symbol);
        self.positions.iter().find(|p| p.symbol == normalized)
    }
}

/// Merge transactions into one Position per distinct normalized symbol.
///
/// A transaction with non-positive quantity or unit cost, or an empty symbol,
/// lands in the rejected list; it is never silently zeroed or dropped. The
/// caller decides whether to warn or abort.
pub fn consolidate(transactions: &[Transaction]) -> Consolidation {
    let mut groups: BTreeMap<String, Position> = BTreeMap::new();
    let mut rejected = Vec::new();

    for tx in transactions {
        if let Some(reason) = tx.validation_error() {
            tracing::warn!("Rejecting transaction {} ({}): {}", tx.id, tx.symbol, reason);
            rejected.push(RejectedTransaction {
                transaction: tx.clone(),
                reason,
            });
            continue;
        }

        let symbol = tx.normalized_symbol();
        let position = groups.entry(symbol.clone()).or_insert_with(|| Position {
            symbol,
            total_quantity: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            brokers: BTreeSet::new(),
            earliest_purchase: None,
        });

        position.total_quantity += tx.quantity;
        position.total_cost += tx.quantity * tx.unit_cost;
        position.brokers.insert(tx.broker.clone());
        position.earliest_purchase = match (position.earliest_purchase, tx.date) {
            (Some(existing), Some(date)) => Some(existing.min(date)),
            (existing, date) => existing.or(date),
        };
    }

    // Positions with zero net quantity are dropped
    let positions = groups
        .into_values()
        .filter(|p| p.total_quantity > Decimal::ZERO)
        .collect();

    Consolidation {
        positions,
        rejected,
    }
}
