//! Tabular export of backtest and frontier output.
//!
//! Charting is an external concern; these writers produce the flat
//! tables a plotting tool consumes.

use crate::engine::BacktestResult;
use crate::error::Result;
use crate::sampler::FrontierPoint;
use crate::types::NotionalPoint;
use csv::Writer;
use std::path::Path;
use tracing::info;

/// Write the daily notional curve as CSV.
///
/// Columns: date, the benchmark's notional under its own name, and the
/// strategy notional.
pub fn export_curve_csv(
    path: impl AsRef<Path>,
    curve: &[NotionalPoint],
    benchmark: &str,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = Writer::from_path(path)?;

    writer.write_record(["date", benchmark, "strategy"])?;
    for point in curve {
        writer.write_record([
            point.date.to_string(),
            point.benchmark.to_string(),
            point.strategy.to_string(),
        ])?;
    }
    writer.flush()?;

    info!(rows = curve.len(), "notional curve written to {}", path.display());
    Ok(())
}

/// Write sampled frontier portfolios as CSV.
///
/// Columns: expected return, volatility, Sharpe ratio, then one weight
/// column per ticker.
pub fn export_frontier_csv(
    path: impl AsRef<Path>,
    points: &[FrontierPoint],
    tickers: &[String],
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = Writer::from_path(path)?;

    let mut header = vec![
        "expected_return".to_string(),
        "volatility".to_string(),
        "sharpe".to_string(),
    ];
    header.extend(tickers.iter().map(|t| format!("w_{t}")));
    writer.write_record(&header)?;

    for point in points {
        let mut record = vec![
            point.expected_return.to_string(),
            point.volatility.to_string(),
            point.sharpe.to_string(),
        ];
        record.extend(point.weights.as_slice().iter().map(|w| w.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(rows = points.len(), "frontier written to {}", path.display());
    Ok(())
}

/// Serialize a run summary as pretty JSON.
pub fn result_to_json(result: &BacktestResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
