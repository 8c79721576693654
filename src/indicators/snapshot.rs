use std::collections::BTreeMap;

use crate::config::Universe;
use crate::error::SignalError;
use crate::indicators::rsi::compute_rsi;
use crate::models::PriceSeries;

/// The complete set of RSI readings for one decision-tree evaluation,
/// keyed by (ticker, window).
///
/// A BTreeMap keeps iteration order stable, so reports and logs list
/// readings the same way on every run. Lookups are total-or-fail: a missing
/// key is an `IncompleteSnapshot` error, never a defaulted value, because a
/// defaulted reading would silently flip a branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    values: BTreeMap<(String, usize), f64>,
}

impl IndicatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: impl Into<String>, window: usize, value: f64) {
        self.values.insert((ticker.into(), window), value);
    }

    pub fn get(&self, ticker: &str, window: usize) -> Result<f64, SignalError> {
        self.values
            .get(&(ticker.to_string(), window))
            .copied()
            .ok_or_else(|| SignalError::IncompleteSnapshot {
                ticker: ticker.to_string(),
                window,
            })
    }

    pub fn contains(&self, ticker: &str, window: usize) -> bool {
        self.values.contains_key(&(ticker.to_string(), window))
    }

    /// Drop one reading. Exists so callers (and tests) can model partial
    /// coverage explicitly.
    pub fn remove(&mut self, ticker: &str, window: usize) -> Option<f64> {
        self.values.remove(&(ticker.to_string(), window))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, f64)> {
        self.values
            .iter()
            .map(|((ticker, window), value)| (ticker.as_str(), *window, *value))
    }
}

/// Compute RSI for every ticker × window pair in the universe.
///
/// The cross product is computed up front so the tree evaluator only ever
/// sees fully populated snapshots; any gap (missing series, short history)
/// fails here instead of mid-traversal.
pub fn build_snapshot(
    series: &[PriceSeries],
    universe: &Universe,
) -> Result<IndicatorSnapshot, SignalError> {
    let mut snapshot = IndicatorSnapshot::new();

    for ticker in &universe.tickers {
        let found = series.iter().find(|s| s.ticker() == ticker);
        for &window in &universe.windows {
            let Some(series) = found else {
                return Err(SignalError::InsufficientHistory {
                    ticker: ticker.clone(),
                    window,
                    have: 0,
                    min: window + 1,
                });
            };
            let rsi = compute_rsi(series, window)?;
            tracing::debug!(ticker = %rsi.ticker, window, value = rsi.value, "computed RSI");
            snapshot.insert(ticker.clone(), window, rsi.value);
        }
    }

    Ok(snapshot)
}
