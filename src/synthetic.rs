use std::str::FromStr;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Universe;
use crate::error::SignalError;
use crate::models::PriceSeries;

/// Market scenario types for synthetic series generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Strictly rising closes; pins RSI at 100 for every window.
    Uptrend,
    /// Strictly falling closes; pins RSI at 0 for every window.
    Downtrend,
    /// Choppy drift around the base price.
    Sideways,
    /// Large swings.
    Volatile,
}

impl FromStr for MarketScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uptrend" => Ok(MarketScenario::Uptrend),
            "downtrend" => Ok(MarketScenario::Downtrend),
            "sideways" => Ok(MarketScenario::Sideways),
            "volatile" => Ok(MarketScenario::Volatile),
            other => Err(format!(
                "unknown scenario {other:?} (expected uptrend, downtrend, sideways or volatile)"
            )),
        }
    }
}

/// Generates synthetic daily close series.
///
/// Seeded for reproducibility: the same seed always produces the same
/// series, so scenario tests and demos stay deterministic.
pub struct SyntheticSeriesGenerator {
    rng: StdRng,
    base_price: f64,
}

impl SyntheticSeriesGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
        }
    }

    /// Generate `days` consecutive daily closes for one ticker.
    pub fn generate(
        &mut self,
        ticker: &str,
        scenario: MarketScenario,
        days: usize,
    ) -> Result<PriceSeries, SignalError> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid calendar date");
        let mut closes = Vec::with_capacity(days);
        let mut price = self.base_price;

        for _ in 0..days {
            closes.push(price);
            price = match scenario {
                MarketScenario::Uptrend => price * (1.0 + self.rng.gen_range(0.001..0.02)),
                MarketScenario::Downtrend => price * (1.0 - self.rng.gen_range(0.001..0.02)),
                MarketScenario::Sideways => {
                    self.base_price * (1.0 + self.rng.gen_range(-0.01..0.01))
                }
                MarketScenario::Volatile => {
                    (price * (1.0 + self.rng.gen_range(-0.05..0.05))).max(1.0)
                }
            };
        }

        PriceSeries::from_closes(ticker, start, &closes)
    }

    /// One series per ticker in the universe, each long enough to cover the
    /// largest window.
    pub fn generate_universe(
        &mut self,
        universe: &Universe,
        scenario: MarketScenario,
        days: usize,
    ) -> Result<Vec<PriceSeries>, SignalError> {
        universe
            .tickers
            .iter()
            .map(|ticker| self.generate(ticker, scenario, days))
            .collect()
    }
}
