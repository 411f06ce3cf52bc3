//! Frontier - mean-variance portfolio estimation and backtesting.
//!
//! # Overview
//!
//! Frontier estimates and backtests a Markowitz equity portfolio: given
//! historical daily closing prices for a fixed basket of assets, it
//!
//! - estimates annualized expected returns and a covariance structure
//!   from log returns,
//! - searches for long-only, fully-invested weights maximizing the
//!   Sharpe ratio,
//! - samples random portfolios to trace the risk/return frontier, and
//! - simulates a periodically-rebalanced portfolio against a
//!   buy-and-hold benchmark, including transaction slippage.
//!
//! # Quick Start
//!
//! ```no_run
//! use frontier::config::FileConfig;
//! use frontier::data::{load_baseline_table, load_price_table};
//! use frontier::engine::Backtest;
//!
//! let config = FileConfig::load("frontier.toml").unwrap();
//! let closes = load_price_table(&config.data.close_path, &config.universe.tickers).unwrap();
//! let baseline = load_baseline_table(
//!     &config.data.baseline_path,
//!     &config.universe.benchmark,
//!     &config.universe.tickers,
//! )
//! .unwrap();
//!
//! let result = Backtest::new(config.to_backtest_config(), closes, baseline)
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! println!("Strategy: {:.2}% vs benchmark {:.2}%",
//!     result.strategy_return_pct, result.benchmark_return_pct);
//! ```
//!
//! # Modules
//!
//! - [`types`]: Price tables, return series, weight vectors
//! - [`data`]: Wide-CSV price table loading
//! - [`stats`]: Log returns and annualized mean/covariance estimation
//! - [`sampler`]: Random simplex sampling and frontier sweeps
//! - [`optimizer`]: Constrained Sharpe-ratio maximization
//! - [`engine`]: The rebalancing backtest simulator
//! - [`config`]: TOML configuration file support
//! - [`export`]: CSV/JSON output writers

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod optimizer;
pub mod sampler;
pub mod stats;
pub mod types;

// Re-exports for convenience
pub use config::FileConfig;
pub use data::{load_baseline_table, load_price_table, BaselineTable};
pub use engine::{Backtest, BacktestConfig, BacktestResult};
pub use error::{FrontierError, Result};
pub use optimizer::{evaluate, Objective, OptimizerConfig, Performance, SharpeOptimizer};
pub use sampler::{generate_frontier, FrontierPoint, WeightSampler, DEFAULT_NUM_PORTFOLIOS};
pub use stats::{compute_returns, compute_statistics, TRADING_DAYS_PER_YEAR};
pub use types::{NotionalPoint, PriceTable, ReturnSeries, Statistics, WeightVector};
