// Core modules
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod signals;
pub mod synthetic;
pub mod tree;

// Re-export commonly used types
pub use config::Universe;
pub use error::SignalError;
pub use indicators::{build_snapshot, calculate_rsi_sma, compute_rsi, IndicatorSnapshot};
pub use models::{DailyClose, PriceSeries, RsiResult};
pub use signals::Signal;
pub use tree::reference::reference_tree;
pub use tree::DecisionTree;

// Error handling
pub type Result<T> = std::result::Result<T, SignalError>;
