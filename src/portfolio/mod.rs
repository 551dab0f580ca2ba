//! Portfolio core - consolidation and valuation
//!
//! Two pure functions with no hidden state: `consolidate` merges raw
//! transactions into one Position per symbol, `value` attaches a price
//! snapshot and computes per-position and aggregate metrics. Every display
//! surface renders from one ValuationReport computed once per interaction,
//! so the same portfolio can never show different P&L in different views.

pub mod consolidator;
pub mod valuator;

pub use consolidator::{consolidate, Consolidation, Position, RejectedTransaction};
pub use valuator::{value, PortfolioTotals, Valuation, ValuationReport};
