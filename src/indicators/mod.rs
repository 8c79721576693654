// Technical indicators module
// The single indicator here is the SMA-averaged RSI the rule set was tuned
// against; canonical Wilder-smoothed RSI would produce different readings
// and must not be substituted.

pub mod rsi;
pub mod snapshot;

pub use rsi::{calculate_rsi_sma, compute_rsi};
pub use snapshot::{build_snapshot, IndicatorSnapshot};
