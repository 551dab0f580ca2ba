//! Valuation of consolidated positions against a price snapshot
//!
//! Pure and idempotent: the same positions valued against the same frozen
//! snapshot produce a bit-identical report. A position whose symbol has no
//! quote is valued at zero and flagged, never dropped; one missing price
//! must not prevent viewing the rest of the portfolio.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::portfolio::consolidator::Position;
use crate::pricing::{PriceSnapshot, PriceSource};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A Position with market data attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub brokers: BTreeSet<String>,
    /// None when no provider could price the symbol
    pub market_price: Option<Decimal>,
    pub price_source: PriceSource,
    /// Set when market_price is None; market_value is 0 in that case, so the
    /// reported gain_loss is pure cost and must be read with this flag
    pub price_unavailable: bool,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_pct: Decimal,
}

/// Aggregate portfolio metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    /// 0 when cost_basis is 0, never NaN and never an error
    pub gain_loss_pct: Decimal,
}

/// The single valuation result every display surface renders from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub positions: Vec<Valuation>,
    pub totals: PortfolioTotals,
    /// Timestamp of the price snapshot the report was computed from
    pub as_of: chrono::DateTime<chrono::Utc>,
}

impl ValuationReport {
    pub fn unpriced_symbols(&self) -> Vec<&str> {
        self.positions
            .iter()
            .filter(|v| v.price_unavailable)
            .map(|v| v.symbol.as_str())
            .collect()
    }
}

fn pct_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        (part / whole) * HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Attach the snapshot's prices to each Position and compute aggregates.
///
/// Every input Position appears in the output exactly once. Positions are
/// ordered by market value descending, then symbol, so repeated calls over
/// the same inputs render identically.
pub fn value(positions: &[Position], snapshot: &PriceSnapshot) -> ValuationReport {
    let mut valuations: Vec<Valuation> = positions
        .iter()
        .map(|position| {
            let quote = snapshot.get(&position.symbol);
            let cost_basis = position.cost_basis();

            let (market_price, price_source) = match quote {
                Some(q) => (Some(q.price), q.source),
                None => {
                    tracing::debug!("No quote for {}, valuing at zero", position.symbol);
                    (None, PriceSource::Unavailable)
                }
            };

            let market_value = market_price
                .map(|price| price * position.total_quantity)
                .unwrap_or(Decimal::ZERO);
            let gain_loss = market_value - cost_basis;

            Valuation {
                symbol: position.symbol.clone(),
                quantity: position.total_quantity,
                average_cost: position.average_cost(),
                brokers: position.brokers.clone(),
                market_price,
                price_source,
                price_unavailable: market_price.is_none(),
                market_value,
                cost_basis,
                gain_loss,
                gain_loss_pct: pct_of(gain_loss, cost_basis),
            }
        })
        .collect();

    valuations.sort_by(|a, b| {
        b.market_value
            .cmp(&a.market_value)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let market_value: Decimal = valuations.iter().map(|v| v.market_value).sum();
    let cost_basis: Decimal = valuations.iter().map(|v| v.cost_basis).sum();
    let gain_loss = market_value - cost_basis;

    ValuationReport {
        positions: valuations,
        totals: PortfolioTotals {
            market_value,
            cost_basis,
            gain_loss,
            gain_loss_pct: pct_of(gain_loss, cost_basis),
        },
        as_of: snapshot.fetched_at,
    }
}
