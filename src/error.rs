use thiserror::Error;

/// Errors surfaced by the signal core.
///
/// None of these are retried or suppressed internally. A wrong trading signal
/// is worse than no signal, so the engine never substitutes a default
/// indicator value or a default branch; every failure propagates to the
/// caller, which owns any re-fetch/retry decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// The price series is too short for the requested lookback window.
    /// RSI over `window` steps needs `window + 1` closes.
    #[error("{ticker}: insufficient history for RSI({window}): have {have} closes, need {min}")]
    InsufficientHistory {
        ticker: String,
        window: usize,
        have: usize,
        min: usize,
    },

    /// The decision tree referenced an indicator the snapshot does not hold.
    #[error("snapshot is missing RSI({window}) for {ticker}")]
    IncompleteSnapshot { ticker: String, window: usize },

    /// Structural defect in the decision graph. Fatal at load time; a retry
    /// cannot fix a broken rule set.
    #[error("malformed decision tree: {reason}")]
    MalformedTree { reason: String },

    /// A label outside the closed signal vocabulary.
    #[error("unrecognized signal label: {label:?}")]
    UnknownSignalVariant { label: String },

    /// A price series that violates its own ordering contract.
    #[error("invalid price series for {ticker}: {detail}")]
    InvalidSeries { ticker: String, detail: String },
}
