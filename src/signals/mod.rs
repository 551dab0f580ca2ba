//! RSI buy/sell signals
//!
//! Wilder-smoothed Relative Strength Index over daily closes. Below the
//! oversold threshold reads as Buy, above overbought as Sell, in between
//! Hold. Indicator math runs on f64; only money uses Decimal.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RsiConfig;

/// What the indicator suggests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

/// An evaluated signal for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub action: SignalAction,
    pub rsi: f64,
    /// 0.0 to 1.0, scaled by how far past the threshold the RSI sits
    pub confidence: f64,
    pub reason: String,
}

/// Wilder's smoothing: seed with the simple mean of the first `period`
/// values, then avg = (prev_avg * (period - 1) + value) / period.
fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if values.len() < period {
        return vec![];
    }

    let period_f64 = period as f64;
    let mut result = Vec::with_capacity(values.len() - period + 1);

    let mut avg: f64 = values[..period].iter().sum::<f64>() / period_f64;
    result.push(avg);

    for &value in &values[period..] {
        avg = (avg * (period_f64 - 1.0) + value) / period_f64;
        result.push(avg);
    }

    result
}

/// RSI series over a run of closes. Empty when there are fewer than
/// `period + 1` closes.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period > 0, "period must be greater than 0");
    if closes.len() <= period {
        return vec![];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for window in closes.windows(2) {
        let change = window[1] - window[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let avg_gains = wilder_smooth(&gains, period);
    let avg_losses = wilder_smooth(&losses, period);

    avg_gains
        .iter()
        .zip(avg_losses.iter())
        .map(|(&gain, &loss)| {
            if loss == 0.0 {
                100.0
            } else {
                let rs = gain / loss;
                100.0 - (100.0 / (1.0 + rs))
            }
        })
        .collect()
}

/// Latest RSI value, or None when history is too short
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    rsi_series(closes, period).last().copied()
}

/// Evaluate the signal for one symbol from its close history.
/// Returns None when there is not enough history for the configured period.
pub fn evaluate(symbol: &str, closes: &[Decimal], config: &RsiConfig) -> Option<Signal> {
    let closes: Vec<f64> = closes.iter().filter_map(|c| c.to_f64()).collect();
    let rsi = latest_rsi(&closes, config.period)?;

    let (action, confidence, reason) = if rsi < config.oversold {
        (
            SignalAction::Buy,
            ((config.oversold - rsi) / 10.0).min(1.0),
            format!("RSI oversold at {:.2}", rsi),
        )
    } else if rsi > config.overbought {
        (
            SignalAction::Sell,
            ((rsi - config.overbought) / 10.0).min(1.0),
            format!("RSI overbought at {:.2}", rsi),
        )
    } else {
        (
            SignalAction::Hold,
            0.0,
            format!("RSI neutral at {:.2}", rsi),
        )
    };

    Some(Signal {
        symbol: symbol.to_string(),
        action,
        rsi,
        confidence,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Vec<Decimal> {
        values
            .iter()
            .map(|v| Decimal::from_f64_retain(*v).unwrap())
            .collect()
    }

    #[test]
    fn test_rsi_needs_period_plus_one_closes() {
        let data: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert!(rsi_series(&data, 14).is_empty());

        let data: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi_series(&data, 14).len(), 1);
    }

    #[test]
    fn test_all_gains_is_max_rsi() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = latest_rsi(&data, 14).unwrap();
        assert_eq!(rsi, 100.0);
    }

    #[test]
    fn test_all_losses_is_min_rsi() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi = latest_rsi(&data, 14).unwrap();
        assert!(rsi < 1e-9);
    }

    #[test]
    fn test_alternating_moves_sit_midrange() {
        // +1/-1 alternation: average gain equals average loss, RSI near 50
        let mut data = vec![100.0];
        for i in 0..30 {
            let last = *data.last().unwrap();
            data.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let rsi = latest_rsi(&data, 14).unwrap();
        assert!((40.0..=60.0).contains(&rsi), "rsi was {}", rsi);
    }

    #[test]
    fn test_evaluate_buy_on_oversold() {
        // Steady decline pushes RSI to the floor
        let data: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let signal = evaluate("2222", &closes(&data), &RsiConfig::default()).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(signal.confidence > 0.9);
        assert!(signal.reason.contains("oversold"));
    }

    #[test]
    fn test_evaluate_sell_on_overbought() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let signal = evaluate("2222", &closes(&data), &RsiConfig::default()).unwrap();
        assert_eq!(signal.action, SignalAction::Sell);
        assert!(signal.reason.contains("overbought"));
    }

    #[test]
    fn test_evaluate_hold_in_neutral_band() {
        let mut data = vec![100.0];
        for i in 0..30 {
            let last = *data.last().unwrap();
            data.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let signal = evaluate("1120", &closes(&data), &RsiConfig::default()).unwrap();
        assert_eq!(signal.action, SignalAction::Hold);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_evaluate_short_history_yields_none() {
        let data = closes(&[100.0, 101.0, 102.0]);
        assert!(evaluate("2222", &data, &RsiConfig::default()).is_none());
    }
}
