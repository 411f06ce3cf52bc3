//! Configuration file support for portfolio runs.
//!
//! Loads the ticker universe, data paths, and backtest settings from a
//! TOML file so runs are reproducible. Nothing here is ambient: every
//! component receives its configuration explicitly, scoped to one run.

use crate::engine::BacktestConfig;
use crate::error::{FrontierError, Result};
use crate::sampler::DEFAULT_NUM_PORTFOLIOS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete run configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Asset universe and benchmark.
    #[serde(default)]
    pub universe: UniverseSettings,
    /// Price table locations.
    #[serde(default)]
    pub data: DataSettings,
    /// Backtest settings.
    #[serde(default)]
    pub backtest: BacktestSettings,
    /// Monte-Carlo frontier settings.
    #[serde(default)]
    pub frontier: FrontierSettings,
}

/// Ticker universe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseSettings {
    /// Ordered list of asset tickers. Changing it invalidates any saved
    /// price tables (column mismatch).
    #[serde(default)]
    pub tickers: Vec<String>,
    /// Benchmark instrument for the buy-and-hold comparison.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
}

fn default_benchmark() -> String {
    "BOVA11.SA".to_string()
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            benchmark: default_benchmark(),
        }
    }
}

/// Price table locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// Close-price history CSV.
    #[serde(default = "default_close_path")]
    pub close_path: String,
    /// Baseline CSV: benchmark closes plus per-ticker opens.
    #[serde(default = "default_baseline_path")]
    pub baseline_path: String,
}

fn default_close_path() -> String {
    "price_history.csv".to_string()
}

fn default_baseline_path() -> String {
    "baseline_data.csv".to_string()
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            close_path: default_close_path(),
            baseline_path: default_baseline_path(),
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Starting notional.
    #[serde(default = "default_notional")]
    pub initial_notional: f64,
    /// Trading days between rebalances.
    #[serde(default = "default_interval")]
    pub rebalance_interval: usize,
    /// Slippage as a percentage (0.5 means 0.5%).
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: f64,
    /// Optional RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Show a progress bar.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_notional() -> f64 {
    100_000.0
}

fn default_interval() -> usize {
    63
}

fn default_slippage_pct() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_notional: default_notional(),
            rebalance_interval: default_interval(),
            slippage_pct: default_slippage_pct(),
            seed: None,
            show_progress: true,
        }
    }
}

/// Monte-Carlo frontier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierSettings {
    /// Number of random portfolios to sample.
    #[serde(default = "default_num_portfolios")]
    pub num_portfolios: usize,
}

fn default_num_portfolios() -> usize {
    DEFAULT_NUM_PORTFOLIOS
}

impl Default for FrontierSettings {
    fn default() -> Self {
        Self {
            num_portfolios: default_num_portfolios(),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FrontierError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.universe.tickers.is_empty() {
            return Err(FrontierError::ConfigError(
                "universe.tickers must list at least one asset".to_string(),
            ));
        }
        if self.universe.tickers.contains(&self.universe.benchmark) {
            return Err(FrontierError::ConfigError(
                "benchmark must not be part of the asset universe".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to the engine's configuration.
    pub fn to_backtest_config(&self) -> BacktestConfig {
        BacktestConfig {
            initial_notional: self.backtest.initial_notional,
            rebalance_interval: self.backtest.rebalance_interval,
            slippage: self.backtest.slippage_pct / 100.0,
            seed: self.backtest.seed,
            show_progress: self.backtest.show_progress,
            ..Default::default()
        }
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# Frontier run configuration

[universe]
tickers = [
    "PETR4.SA",
    "ITUB4.SA",
    "VALE3.SA",
    "SBSP3.SA",
    "ELET3.SA",
    "EMBR3.SA",
    "RADL3.SA",
]
benchmark = "BOVA11.SA"

[data]
close_path = "price_history.csv"
baseline_path = "baseline_data.csv"

[backtest]
initial_notional = 100000.0
rebalance_interval = 63   # trading days, roughly quarterly
slippage_pct = 0.5        # 0.5% on buys
# seed = 42               # pin for reproducible runs
show_progress = true

[frontier]
num_portfolios = 50000
"#
        .to_string()
    }
}
