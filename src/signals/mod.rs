// Trading signal vocabulary and its canonical label projection.

pub mod report;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Single-name tickers the label parser accepts as leveraged longs.
const LONG_TICKERS: &[&str] = &["SOXL", "FNGU", "TQQQ", "TECL", "UPRO"];

/// Single-name tickers the label parser accepts as shorts.
const SHORT_TICKERS: &[&str] = &["LABD"];

/// One weighted leg of a blend allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub ticker: String,
    pub weight: f64,
}

/// The closed trading-signal vocabulary. Immutable once produced; one signal
/// is emitted per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// Leveraged VIX basket.
    VixGroup,
    /// Weighted defensive VIX blend.
    VixBlend { allocations: Vec<Allocation> },
    /// Unleveraged VIX exposure.
    SingleVix,
    /// Inverse (short) position in a single ticker.
    Short { ticker: String },
    /// Leveraged long in a single ticker.
    Long { ticker: String },
    /// Buy the two weakest candidates of a ranked set.
    BuyPair { first: String, second: String },
    /// Cash equivalent.
    TreasuryBill,
}

impl Signal {
    /// Canonical human-readable label.
    ///
    /// This string is the external contract: downstream state diffing
    /// compares rendered labels across runs, so the projection must stay
    /// stable. Never fails; the enum is closed.
    pub fn render(&self) -> String {
        match self {
            Signal::VixGroup => "1.5x VIX Group (VXX, UVIX)".to_string(),
            Signal::VixBlend { allocations } => {
                let legs: Vec<String> = allocations
                    .iter()
                    .map(|a| format!("{}={}", a.ticker, a.weight))
                    .collect();
                format!("VIX Blend ({})", legs.join(", "))
            }
            Signal::SingleVix => "1x VIX (VIXY)".to_string(),
            Signal::Short { ticker } | Signal::Long { ticker } => ticker.clone(),
            Signal::BuyPair { first, second } => format!("Buy {first} and {second}"),
            Signal::TreasuryBill => "BIL (T-Bill ETF)".to_string(),
        }
    }

    /// Inverse of [`render`](Self::render), for callers that persist and diff
    /// rendered labels. A string outside the closed vocabulary fails with
    /// `UnknownSignalVariant`.
    pub fn parse_label(label: &str) -> Result<Signal, SignalError> {
        let unknown = || SignalError::UnknownSignalVariant {
            label: label.to_string(),
        };

        match label {
            "1.5x VIX Group (VXX, UVIX)" => return Ok(Signal::VixGroup),
            "1x VIX (VIXY)" => return Ok(Signal::SingleVix),
            "BIL (T-Bill ETF)" => return Ok(Signal::TreasuryBill),
            _ => {}
        }

        if let Some(body) = label
            .strip_prefix("VIX Blend (")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut allocations = Vec::new();
            for leg in body.split(", ") {
                let (ticker, weight) = leg.split_once('=').ok_or_else(unknown)?;
                let weight: f64 = weight.parse().map_err(|_| unknown())?;
                allocations.push(Allocation {
                    ticker: ticker.to_string(),
                    weight,
                });
            }
            if allocations.is_empty() {
                return Err(unknown());
            }
            return Ok(Signal::VixBlend { allocations });
        }

        if let Some(pair) = label.strip_prefix("Buy ") {
            if let Some((first, second)) = pair.split_once(" and ") {
                if is_ticker(first) && is_ticker(second) {
                    return Ok(Signal::BuyPair {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
            return Err(unknown());
        }

        if SHORT_TICKERS.contains(&label) {
            return Ok(Signal::Short {
                ticker: label.to_string(),
            });
        }
        if LONG_TICKERS.contains(&label) {
            return Ok(Signal::Long {
                ticker: label.to_string(),
            });
        }

        Err(unknown())
    }
}

fn is_ticker(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
