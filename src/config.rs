use serde::{Deserialize, Serialize};

/// Reference configuration: the tracked ETF universe and the lookback
/// windows the rule set reads. VIXY needs the long 50/60-day windows; the
/// cross product is computed for every ticker so snapshot coverage stays a
/// simple invariant.
const REFERENCE_TICKERS: &[&str] = &[
    "QQQ", "VIXY", "SPY", "IOO", "XLP", "VTV", "XLF", "VOX", "CURE", "RETL", "LABU", "SOXL",
    "FNGU", "TQQQ", "TECL", "UPRO",
];

const REFERENCE_WINDOWS: &[usize] = &[9, 50, 60];

/// The tracked-ticker universe and required RSI windows.
///
/// This is an input to the engine, not something hardcoded inside it: the
/// rule set names tickers and windows, and the snapshot builder computes
/// whatever the universe says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Universe {
    pub tickers: Vec<String>,
    pub windows: Vec<usize>,
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            tickers: REFERENCE_TICKERS.iter().map(|t| t.to_string()).collect(),
            windows: REFERENCE_WINDOWS.to_vec(),
        }
    }
}

impl Universe {
    /// Load the universe: defaults, layered under an optional config file
    /// (TOML/JSON/YAML by extension), layered under `SIGNALBOT_`-prefixed
    /// environment overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Universe::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("SIGNALBOT"))
            .build()?;

        let universe: Universe = settings.try_deserialize()?;
        universe.validate()?;
        Ok(universe)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tickers.is_empty() {
            anyhow::bail!("universe has no tickers");
        }
        if self.windows.is_empty() {
            anyhow::bail!("universe has no RSI windows");
        }
        if self.windows.contains(&0) {
            anyhow::bail!("RSI window of 0 is meaningless");
        }
        Ok(())
    }

    pub fn max_window(&self) -> usize {
        self.windows.iter().copied().max().unwrap_or(0)
    }

    /// Minimum closes every series must carry to cover all windows.
    pub fn min_history(&self) -> usize {
        self.max_window() + 1
    }
}
