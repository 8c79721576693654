use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered daily close series for a single ticker.
///
/// Dates must be strictly increasing: duplicates and out-of-order rows are
/// rejected at construction rather than silently reordered, since a reshuffled
/// series would corrupt every diff-based indicator downstream. The engine only
/// ever reads a series; fields stay private to keep the ordering invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    ticker: String,
    closes: Vec<DailyClose>,
}

/// Wire shape of a series before ordering validation.
#[derive(Deserialize)]
struct RawPriceSeries {
    ticker: String,
    closes: Vec<DailyClose>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = SignalError;

    fn try_from(raw: RawPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.ticker, raw.closes)
    }
}

impl PriceSeries {
    pub fn new(
        ticker: impl Into<String>,
        closes: Vec<DailyClose>,
    ) -> Result<Self, SignalError> {
        let ticker = ticker.into();
        for pair in closes.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(SignalError::InvalidSeries {
                    ticker,
                    detail: format!("duplicate date {}", pair[0].date),
                });
            }
            if pair[1].date < pair[0].date {
                return Err(SignalError::InvalidSeries {
                    ticker,
                    detail: format!(
                        "dates out of order: {} after {}",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }
        Ok(Self { ticker, closes })
    }

    /// Build a series from bare closes on consecutive calendar days starting
    /// at `start`. Handy for fixtures and synthetic scenarios where only the
    /// price path matters.
    pub fn from_closes(
        ticker: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, SignalError> {
        let closes = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyClose {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(ticker, closes)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn closes(&self) -> &[DailyClose] {
        &self.closes
    }

    /// Close prices only, oldest first.
    pub fn close_values(&self) -> Vec<f64> {
        self.closes.iter().map(|c| c.close).collect()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// One RSI reading. Computed fresh each run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    pub ticker: String,
    pub window: usize,
    pub value: f64,
}
