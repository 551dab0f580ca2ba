//! Integration tests for the consolidation and valuation core
//!
//! These tests verify end-to-end behavior over the library API:
//! - Store round trips feeding consolidation
//! - Weighted-average cost across brokers
//! - Partial price failure and the unavailable flag
//! - Report idempotence under a frozen snapshot

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tadawul::holdings::{HoldingsStore, TransactionDraft};
use tadawul::portfolio::{consolidate, value};
use tadawul::pricing::{PriceSnapshot, PriceSource, Quote};
use tempfile::TempDir;

/// Test helper: store seeded with the worked example portfolio
/// (2222 split across two brokers, 1120 at one)
fn seeded_store(dir: &TempDir) -> HoldingsStore {
    let mut store = HoldingsStore::open(Some(dir.path().join("holdings.json"))).unwrap();
    store
        .add_transaction(TransactionDraft::new("2222", dec!(100), dec!(35.50)).with_broker("BrokerA"))
        .unwrap();
    store
        .add_transaction(TransactionDraft::new("2222", dec!(50), dec!(36.00)).with_broker("BrokerB"))
        .unwrap();
    store
        .add_transaction(TransactionDraft::new("1120", dec!(20), dec!(80.00)).with_broker("BrokerA"))
        .unwrap();
    store.save().unwrap();
    store
}

fn frozen_snapshot() -> PriceSnapshot {
    let mut snapshot = PriceSnapshot::new(Utc::now());
    snapshot.insert(
        "2222",
        Quote {
            price: dec!(36.00),
            source: PriceSource::Live,
        },
    );
    // 1120 deliberately absent: the oracle has no quote for it
    snapshot
}

#[test]
fn consolidates_across_brokers_with_weighted_average() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let consolidation = consolidate(store.list_transactions());
    assert_eq!(consolidation.positions.len(), 2);
    assert!(consolidation.rejected.is_empty());

    let aramco = consolidation.position("2222").unwrap();
    assert_eq!(aramco.total_quantity, dec!(150));
    // (100 x 35.50 + 50 x 36.00) / 150
    assert_eq!(aramco.total_cost, dec!(5350.00));
    assert_eq!(
        aramco.average_cost().round_dp(4),
        dec!(35.6667)
    );
    assert_eq!(aramco.brokers.len(), 2);

    let rajhi = consolidation.position("1120").unwrap();
    assert_eq!(rajhi.total_quantity, dec!(20));
    assert_eq!(rajhi.average_cost(), dec!(80.00));
}

#[test]
fn valuation_with_one_unavailable_price() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);
    let consolidation = consolidate(store.list_transactions());

    let report = value(&consolidation.positions, &frozen_snapshot());

    // Both positions present, the unpriced one flagged
    assert_eq!(report.positions.len(), 2);

    let aramco = report.positions.iter().find(|v| v.symbol == "2222").unwrap();
    assert_eq!(aramco.market_value, dec!(5400.00));
    assert_eq!(aramco.cost_basis, dec!(5350.00));
    assert_eq!(aramco.gain_loss, dec!(50.00));
    assert!(!aramco.price_unavailable);

    let rajhi = report.positions.iter().find(|v| v.symbol == "1120").unwrap();
    assert!(rajhi.price_unavailable);
    assert_eq!(rajhi.price_source, PriceSource::Unavailable);
    assert_eq!(rajhi.market_value, Decimal::ZERO);
    assert_eq!(rajhi.cost_basis, dec!(1600.00));
    assert_eq!(rajhi.gain_loss, dec!(-1600.00));

    // Totals: every cost basis counts, only priced market values do
    assert_eq!(report.totals.cost_basis, dec!(6950.00));
    assert_eq!(report.totals.market_value, dec!(5400.00));
    assert_eq!(report.totals.gain_loss, dec!(-1550.00));
}

#[test]
fn report_is_idempotent_under_frozen_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);
    let consolidation = consolidate(store.list_transactions());
    let snapshot = frozen_snapshot();

    let first = value(&consolidation.positions, &snapshot);
    let second = value(&consolidation.positions, &snapshot);
    assert_eq!(first, second);

    // And JSON renderings agree byte for byte, so no two display surfaces
    // can disagree
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn store_reload_yields_identical_consolidation() {
    let dir = TempDir::new().unwrap();
    seeded_store(&dir);

    let reloaded = HoldingsStore::open(Some(dir.path().join("holdings.json"))).unwrap();
    let consolidation = consolidate(reloaded.list_transactions());

    assert_eq!(consolidation.position("2222").unwrap().total_quantity, dec!(150));
    assert_eq!(consolidation.position("1120").unwrap().total_cost, dec!(1600.00));
}

#[test]
fn empty_portfolio_values_to_zeroes() {
    let report = value(&[], &PriceSnapshot::new(Utc::now()));
    assert!(report.positions.is_empty());
    assert_eq!(report.totals.market_value, Decimal::ZERO);
    assert_eq!(report.totals.cost_basis, Decimal::ZERO);
    assert_eq!(report.totals.gain_loss, Decimal::ZERO);
    assert_eq!(report.totals.gain_loss_pct, Decimal::ZERO);
}

#[test]
fn duplicated_reimport_consolidates_into_one_position() {
    // The same holding recorded twice (a re-import) must not produce two
    // positions, just a doubled one
    let dir = TempDir::new().unwrap();
    let mut store = HoldingsStore::open(Some(dir.path().join("holdings.json"))).unwrap();
    for _ in 0..2 {
        store
            .add_transaction(TransactionDraft::new("2050", dec!(30), dec!(150.00)))
            .unwrap();
    }

    let consolidation = consolidate(store.list_transactions());
    assert_eq!(consolidation.positions.len(), 1);
    assert_eq!(consolidation.positions[0].total_quantity, dec!(60));
    assert_eq!(consolidation.positions[0].average_cost(), dec!(150.00));
}
