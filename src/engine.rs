//! Rebalancing backtest simulator.
//!
//! Replays the benchmark's trading calendar: on scheduled rebalance days
//! the trailing close-price window is re-estimated, a fresh random seed
//! vector is optimized into target weights, and the current notional is
//! converted into share counts at that day's opening prices plus
//! slippage. Every other day the held share vector is marked to market
//! at closing prices.

use crate::data::BaselineTable;
use crate::error::{FrontierError, Result};
use crate::optimizer::{Objective, OptimizerConfig, SharpeOptimizer};
use crate::sampler::WeightSampler;
use crate::stats;
use crate::types::{NotionalPoint, PriceTable};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Starting portfolio notional.
    pub initial_notional: f64,
    /// Trading days between rebalances (63 is roughly quarterly).
    pub rebalance_interval: usize,
    /// Slippage applied to buys as a fraction (0.005 = 0.5%).
    pub slippage: f64,
    /// RNG seed for the weight sampler; None seeds from entropy.
    pub seed: Option<u64>,
    /// Show a progress bar while simulating.
    pub show_progress: bool,
    /// Optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_notional: 100_000.0,
            rebalance_interval: 63,
            slippage: 0.005,
            seed: None,
            show_progress: true,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl BacktestConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_notional <= 0.0 {
            return Err(FrontierError::ConfigError(
                "initial notional must be positive".to_string(),
            ));
        }
        if self.rebalance_interval == 0 {
            return Err(FrontierError::ConfigError(
                "rebalance interval must be at least 1 trading day".to_string(),
            ));
        }
        if self.slippage < 0.0 {
            return Err(FrontierError::ConfigError(
                "slippage must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shares held between rebalances, with their slippage-adjusted entry prices.
#[derive(Debug, Clone)]
struct Holdings {
    shares: DVector<f64>,
    #[allow(dead_code)]
    entry_prices: Vec<f64>,
}

impl Holdings {
    fn mark_to_market(&self, closes: &[f64]) -> f64 {
        self.shares
            .iter()
            .zip(closes)
            .map(|(shares, close)| shares * close)
            .sum()
    }
}

/// Results of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub benchmark: String,
    pub tickers: Vec<String>,
    pub initial_notional: f64,
    pub final_strategy: f64,
    pub final_benchmark: f64,
    pub strategy_return_pct: f64,
    pub benchmark_return_pct: f64,
    pub trading_days: usize,
    /// Dates on which the share vector was actually replaced.
    pub rebalance_dates: Vec<NaiveDate>,
    /// Daily (date, benchmark notional, strategy notional) series.
    pub curve: Vec<NotionalPoint>,
}

/// The backtest simulator.
pub struct Backtest {
    config: BacktestConfig,
    closes: PriceTable,
    baseline: BaselineTable,
}

impl Backtest {
    /// Create a simulator over a close-price history and a baseline table.
    pub fn new(config: BacktestConfig, closes: PriceTable, baseline: BaselineTable) -> Result<Self> {
        config.validate()?;
        if closes.tickers() != baseline.opens.tickers() {
            return Err(FrontierError::ConfigError(format!(
                "ticker universe mismatch: closes {:?} vs baseline {:?}",
                closes.tickers(),
                baseline.opens.tickers()
            )));
        }
        Ok(Self {
            config,
            closes,
            baseline,
        })
    }

    /// Run the simulation over the benchmark's trading days.
    ///
    /// Numerical degeneracies inside a rebalance step (too-short window,
    /// undefined Sharpe) are local: they are logged and the current
    /// holdings are kept (cash before the first successful rebalance).
    /// Data errors are fatal.
    pub fn run(&self) -> Result<BacktestResult> {
        if self.baseline.len() < 2 {
            return Err(FrontierError::DataError(
                "baseline table needs at least 2 rows to define returns".to_string(),
            ));
        }

        // The simulation clock is the benchmark calendar from its second
        // row onward (the first row only anchors the benchmark return).
        let sim_dates = &self.baseline.dates[1..];
        let num_assets = self.closes.tickers().len();

        let mut sampler = match self.config.seed {
            Some(seed) => WeightSampler::seeded(num_assets, seed),
            None => WeightSampler::from_entropy(num_assets),
        };
        let optimizer = SharpeOptimizer::new(self.config.optimizer.clone());

        info!(
            days = sim_dates.len(),
            assets = num_assets,
            interval = self.config.rebalance_interval,
            "starting backtest"
        );

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(sim_dates.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut curve: Vec<NotionalPoint> = Vec::with_capacity(sim_dates.len());
        let mut rebalance_dates = Vec::new();
        let mut holdings: Option<Holdings> = None;
        let mut day_counter = 0usize;
        let mut benchmark_notional = self.config.initial_notional;

        for (i, &date) in sim_dates.iter().enumerate() {
            // Benchmark buy-and-hold: compound daily simple returns,
            // starting flat on the first simulated day.
            if i > 0 {
                benchmark_notional *=
                    self.baseline.benchmark_closes[i + 1] / self.baseline.benchmark_closes[i];
            }

            if day_counter == 0 || day_counter == self.config.rebalance_interval {
                let notional = curve
                    .last()
                    .map(|p| p.strategy)
                    .unwrap_or(self.config.initial_notional);

                match self.rebalance(date, notional, &mut sampler, &optimizer) {
                    Ok(new_holdings) => {
                        holdings = Some(new_holdings);
                        rebalance_dates.push(date);
                    }
                    Err(
                        e @ (FrontierError::InsufficientWindow { .. }
                        | FrontierError::DegenerateStatistics { .. }),
                    ) => {
                        warn!(%date, error = %e, "rebalance skipped, keeping current holdings");
                    }
                    Err(e) => return Err(e),
                }
                day_counter = 0;
            }
            day_counter += 1;

            let strategy = match &holdings {
                Some(h) => {
                    let closes_today = self.closes.row(date).ok_or_else(|| {
                        FrontierError::DataError(format!("no closing prices for {date}"))
                    })?;
                    h.mark_to_market(closes_today)
                }
                // Still in cash: notional carries over unchanged.
                None => curve
                    .last()
                    .map(|p| p.strategy)
                    .unwrap_or(self.config.initial_notional),
            };

            curve.push(NotionalPoint {
                date,
                benchmark: benchmark_notional,
                strategy,
            });

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let final_strategy = curve.last().map(|p| p.strategy).unwrap_or_default();
        let final_benchmark = curve.last().map(|p| p.benchmark).unwrap_or_default();
        let initial = self.config.initial_notional;

        info!(
            final_strategy,
            final_benchmark,
            rebalances = rebalance_dates.len(),
            "backtest complete"
        );

        Ok(BacktestResult {
            benchmark: self.baseline.benchmark.clone(),
            tickers: self.closes.tickers().to_vec(),
            initial_notional: initial,
            final_strategy,
            final_benchmark,
            strategy_return_pct: (final_strategy - initial) / initial * 100.0,
            benchmark_return_pct: (final_benchmark - initial) / initial * 100.0,
            trading_days: curve.len(),
            rebalance_dates,
            curve,
        })
    }

    /// One rebalance event: estimate, optimize, convert notional to shares.
    fn rebalance(
        &self,
        date: NaiveDate,
        notional: f64,
        sampler: &mut WeightSampler,
        optimizer: &SharpeOptimizer,
    ) -> Result<Holdings> {
        let window = self.closes.window_before(date);
        let returns = stats::compute_returns(&window);
        let statistics = stats::compute_statistics(&returns)?;

        let seed_weights = sampler.sample();
        let weights = match optimizer.optimize(&seed_weights, &statistics, Objective::Sharpe) {
            Ok(w) => w,
            Err(FrontierError::NonConvergence { iterations, best }) => {
                warn!(%date, iterations, "optimizer did not converge, using best iterate");
                best
            }
            Err(e) => return Err(e),
        };

        let opens = self.baseline.opens.row(date).ok_or_else(|| {
            FrontierError::DataError(format!("no opening prices for {date}"))
        })?;

        let mut shares = Vec::with_capacity(weights.len());
        let mut entry_prices = Vec::with_capacity(weights.len());
        for (weight, &open) in weights.as_slice().iter().zip(opens) {
            if open <= 0.0 {
                return Err(FrontierError::DataError(format!(
                    "non-positive opening price {open} on {date}"
                )));
            }
            // Slippage inflates the effective purchase price, buys only.
            let entry = open * (1.0 + self.config.slippage);
            shares.push(weight * notional / entry);
            entry_prices.push(entry);
        }

        debug!(%date, notional, window_days = window.len(), "rebalanced");
        Ok(Holdings {
            shares: DVector::from_vec(shares),
            entry_prices,
        })
    }
}
