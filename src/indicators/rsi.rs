use crate::error::SignalError;
use crate::models::{PriceSeries, RsiResult};

/// Calculate RSI using simple moving averages of the up/down moves.
///
/// This deliberately deviates from canonical RSI: the up and down averages
/// are plain unweighted means over the trailing `window` price differences,
/// not Wilder/exponential smoothing. The decision thresholds were tuned
/// against this variant, so the two are not interchangeable.
///
/// Formula:
/// 1. Diff = Close - PrevClose
/// 2. Up = Diff if > 0 else 0, Down = |Diff| if < 0 else 0
/// 3. AvgUp = SMA(Up, window), AvgDown = SMA(Down, window)
/// 4. AvgDown == 0 is defined as RSI 100 (no downside at all)
/// 5. RS = AvgUp / AvgDown; RSI = 100 - (100 / (1 + RS))
///
/// Returns `None` when fewer than `window + 1` closes are available.
pub fn calculate_rsi_sma(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window + 1 {
        return None;
    }

    let diffs: Vec<f64> = prices.windows(2).map(|pair| pair[1] - pair[0]).collect();

    // Trailing `window` moves ending at the most recent step, summed in
    // series order so the result is bit-identical across runs and platforms.
    let mut up_sum = 0.0;
    let mut down_sum = 0.0;
    for &diff in &diffs[diffs.len() - window..] {
        if diff > 0.0 {
            up_sum += diff;
        } else {
            down_sum += -diff;
        }
    }

    let avg_up = up_sum / window as f64;
    let avg_down = down_sum / window as f64;

    if avg_down == 0.0 {
        return Some(100.0);
    }

    let rs = avg_up / avg_down;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Compute one RSI reading for a series, with a typed error when the series
/// cannot cover the window.
pub fn compute_rsi(series: &PriceSeries, window: usize) -> Result<RsiResult, SignalError> {
    let closes = series.close_values();
    match calculate_rsi_sma(&closes, window) {
        Some(value) => Ok(RsiResult {
            ticker: series.ticker().to_string(),
            window,
            value,
        }),
        None => Err(SignalError::InsufficientHistory {
            ticker: series.ticker().to_string(),
            window,
            have: closes.len(),
            min: window + 1,
        }),
    }
}
