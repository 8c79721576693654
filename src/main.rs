use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use signalbot::config::Universe;
use signalbot::indicators::{build_snapshot, compute_rsi};
use signalbot::models::PriceSeries;
use signalbot::signals::report::render_report;
use signalbot::synthetic::{MarketScenario, SyntheticSeriesGenerator};
use signalbot::tree::reference::reference_tree;
use signalbot::tree::DecisionTree;

#[derive(Parser)]
#[command(name = "signalbot", version, about = "SMA-RSI decision-tree signal engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate the decision tree over a JSON file of price series
    Evaluate {
        /// JSON file: array of { ticker, closes: [{ date, close }] }
        #[arg(long)]
        data: PathBuf,
        /// Universe config file; defaults to the reference universe
        #[arg(long)]
        config: Option<String>,
        /// Decision tree JSON; defaults to the built-in reference tree
        #[arg(long)]
        tree: Option<PathBuf>,
    },
    /// Validate a decision tree file and print its shape
    CheckTree {
        /// Decision tree JSON; defaults to the built-in reference tree
        #[arg(long)]
        tree: Option<PathBuf>,
    },
    /// Run a synthetic scenario through the full pipeline
    Demo {
        /// uptrend | downtrend | sideways | volatile
        #[arg(long, default_value = "sideways")]
        scenario: MarketScenario,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Print one RSI reading from a JSON file of price series
    Rsi {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long, default_value_t = 9)]
        window: usize,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate { data, config, tree } => evaluate(&data, config.as_deref(), tree.as_deref()),
        Command::CheckTree { tree } => check_tree(tree.as_deref()),
        Command::Demo { scenario, seed } => demo(scenario, seed),
        Command::Rsi { data, ticker, window } => rsi(&data, &ticker, window),
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "signalbot=info".to_string()),
        )
        .init();
}

fn evaluate(data: &Path, config: Option<&str>, tree_path: Option<&Path>) -> anyhow::Result<()> {
    let universe = Universe::load(config)?;
    let series = load_series(data)?;
    let tree = load_tree(tree_path)?;

    tracing::info!(
        tickers = universe.tickers.len(),
        windows = ?universe.windows,
        nodes = tree.len(),
        "evaluating"
    );

    let snapshot = build_snapshot(&series, &universe)?;
    let (signal, path) = tree.evaluate_traced(&snapshot)?;

    print!("{}", render_report(&signal, &path, &snapshot));
    tracing::info!(label = %signal.render(), "evaluation complete");
    Ok(())
}

fn check_tree(tree_path: Option<&Path>) -> anyhow::Result<()> {
    let tree = load_tree(tree_path)?;
    println!(
        "tree OK: {} nodes, root {}, depth {}",
        tree.len(),
        tree.root(),
        tree.depth()
    );
    Ok(())
}

fn demo(scenario: MarketScenario, seed: u64) -> anyhow::Result<()> {
    let universe = Universe::default();
    let mut generator = SyntheticSeriesGenerator::new(seed);
    let series =
        generator.generate_universe(&universe, scenario, universe.min_history() + 30)?;

    let snapshot = build_snapshot(&series, &universe)?;
    let tree = reference_tree();
    let (signal, path) = tree.evaluate_traced(&snapshot)?;

    print!("{}", render_report(&signal, &path, &snapshot));
    Ok(())
}

fn rsi(data: &Path, ticker: &str, window: usize) -> anyhow::Result<()> {
    let series = load_series(data)?;
    let series = series
        .iter()
        .find(|s| s.ticker() == ticker)
        .with_context(|| format!("no series for {ticker} in {}", data.display()))?;

    let result = compute_rsi(series, window)?;
    println!("{} RSI({}) = {:.4}", result.ticker, result.window, result.value);
    Ok(())
}

fn load_series(path: &Path) -> anyhow::Result<Vec<PriceSeries>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading series file {}", path.display()))?;
    let series: Vec<PriceSeries> = serde_json::from_str(&text)
        .with_context(|| format!("parsing series file {}", path.display()))?;
    Ok(series)
}

fn load_tree(path: Option<&Path>) -> anyhow::Result<DecisionTree> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading tree file {}", path.display()))?;
            let tree = DecisionTree::from_json(&text)
                .with_context(|| format!("loading tree file {}", path.display()))?;
            Ok(tree)
        }
        None => Ok(reference_tree()),
    }
}
