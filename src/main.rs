//! Command-line interface for the portfolio engine.

use frontier::config::FileConfig;
use frontier::data::{load_baseline_table, load_price_table};
use frontier::engine::Backtest;
use frontier::error::Result;
use frontier::optimizer::{Objective, SharpeOptimizer};
use frontier::sampler::{generate_frontier, WeightSampler};
use frontier::{compute_returns, compute_statistics, export};

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Frontier - mean-variance portfolio optimization and backtesting.
#[derive(Parser)]
#[command(name = "frontier")]
#[command(version)]
#[command(about = "Mean-variance portfolio optimization and rebalancing backtests")]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rebalancing backtest against the benchmark
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "frontier.toml")]
        config: PathBuf,

        /// Write the daily notional curve CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the run summary as JSON here
        #[arg(long)]
        json: Option<PathBuf>,

        /// Override the configured RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Sample random portfolios and export the risk/return frontier
    Frontier {
        /// Path to the configuration file
        #[arg(short, long, default_value = "frontier.toml")]
        config: PathBuf,

        /// Output CSV for the sampled portfolios
        #[arg(short, long, default_value = "frontier.csv")]
        output: PathBuf,

        /// Override the configured sample count
        #[arg(long)]
        count: Option<usize>,

        /// RNG seed for the sweep
        #[arg(long, default_value = "0")]
        seed: u64,
    },
    /// Write an example configuration file
    InitConfig {
        /// Where to write the example
        #[arg(short, long, default_value = "frontier.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing subscriber failed");

    match cli.command {
        Commands::Run {
            config,
            output,
            json,
            seed,
        } => cmd_run(&config, output.as_deref(), json.as_deref(), seed),
        Commands::Frontier {
            config,
            output,
            count,
            seed,
        } => cmd_frontier(&config, &output, count, seed),
        Commands::InitConfig { path } => {
            std::fs::write(&path, FileConfig::example())?;
            info!("example configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn cmd_run(
    config_path: &std::path::Path,
    output: Option<&std::path::Path>,
    json: Option<&std::path::Path>,
    seed: Option<u64>,
) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    let closes = load_price_table(&file_config.data.close_path, &file_config.universe.tickers)?;
    let baseline = load_baseline_table(
        &file_config.data.baseline_path,
        &file_config.universe.benchmark,
        &file_config.universe.tickers,
    )?;

    let mut backtest_config = file_config.to_backtest_config();
    if seed.is_some() {
        backtest_config.seed = seed;
    }

    let result = Backtest::new(backtest_config, closes, baseline)?.run()?;

    println!("Backtest over {} trading days", result.trading_days);
    println!("  Rebalances:          {}", result.rebalance_dates.len());
    println!(
        "  Strategy:            {:.2} ({:+.2}%)",
        result.final_strategy, result.strategy_return_pct
    );
    println!(
        "  {:<20} {:.2} ({:+.2}%)",
        format!("{}:", result.benchmark),
        result.final_benchmark,
        result.benchmark_return_pct
    );

    if let Some(path) = output {
        export::export_curve_csv(path, &result.curve, &result.benchmark)?;
    }
    if let Some(path) = json {
        std::fs::write(path, export::result_to_json(&result)?)?;
    }
    Ok(())
}

fn cmd_frontier(
    config_path: &std::path::Path,
    output: &std::path::Path,
    count: Option<usize>,
    seed: u64,
) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    let tickers = &file_config.universe.tickers;
    let closes = load_price_table(&file_config.data.close_path, tickers)?;

    let returns = compute_returns(&closes);
    let statistics = compute_statistics(&returns)?;

    let count = count.unwrap_or(file_config.frontier.num_portfolios);
    info!(count, "sampling random portfolios over the full history");
    let points = generate_frontier(&statistics, count, seed);
    export::export_frontier_csv(output, &points, tickers)?;

    // Report the Sharpe-optimal portfolio alongside the cloud.
    let mut sampler = WeightSampler::seeded(tickers.len(), seed);
    match SharpeOptimizer::with_defaults().optimize(&sampler.sample(), &statistics, Objective::Sharpe)
    {
        Ok(optimal) => {
            let perf = frontier::evaluate(&statistics, &optimal)?;
            println!(
                "Optimal portfolio: return {:.4}, volatility {:.4}, Sharpe {:.4}",
                perf.expected_return, perf.volatility, perf.sharpe
            );
            for (ticker, weight) in tickers.iter().zip(optimal.as_slice()) {
                println!("  {ticker:<12} {weight:>8.4}");
            }
        }
        Err(e) => warn!(error = %e, "could not compute the optimal portfolio"),
    }
    Ok(())
}
