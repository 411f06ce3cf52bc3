//! Price-table loading from wide CSV files.
//!
//! Two table layouts exist: the close-price history (a date column plus
//! one close column per ticker) and the baseline table (a date column,
//! the benchmark's close column, and one opening-price column per
//! ticker). A missing file is a hard startup error; the data must be
//! fetched out-of-band.

use crate::error::{FrontierError, Result};
use crate::types::PriceTable;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::info;

/// Parse a calendar date, trying a few common formats.
///
/// ISO `%Y-%m-%d` is tried last so its parse error is the one reported.
fn parse_date(s: &str) -> Result<NaiveDate> {
    for fmt in ["%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

/// Map each wanted column name to its index in the CSV header.
///
/// The first column is the date index and is never matched by name
/// (pandas-style exports leave its header blank).
fn column_indices(headers: &csv::StringRecord, wanted: &[String]) -> Result<Vec<usize>> {
    wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FrontierError::DataError(format!("missing column: {name}")))
        })
        .collect()
}

fn read_wide_table(
    path: &Path,
    columns: &[String],
) -> Result<(Vec<NaiveDate>, Vec<Vec<f64>>)> {
    if !path.exists() {
        return Err(FrontierError::MissingData {
            path: path.display().to_string(),
        });
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let indices = column_indices(&headers, columns)?;

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for (row_num, record) in reader.records().enumerate() {
        let record = record?;
        let date_field = record.get(0).ok_or_else(|| {
            FrontierError::DataError(format!("row {}: missing date field", row_num + 1))
        })?;
        let date = parse_date(date_field)?;

        let mut row = Vec::with_capacity(indices.len());
        for (&idx, name) in indices.iter().zip(columns) {
            let field = record.get(idx).ok_or_else(|| {
                FrontierError::DataError(format!("row {}: missing field {name}", row_num + 1))
            })?;
            let price: f64 = field.trim().parse().map_err(|_| {
                FrontierError::DataError(format!(
                    "row {}: invalid price '{field}' for {name}",
                    row_num + 1
                ))
            })?;
            row.push(price);
        }

        dates.push(date);
        rows.push(row);
    }

    Ok((dates, rows))
}

/// Load the close-price history for the configured ticker universe.
pub fn load_price_table(path: impl AsRef<Path>, tickers: &[String]) -> Result<PriceTable> {
    let path = path.as_ref();
    info!("Loading close prices from: {}", path.display());

    let (dates, rows) = read_wide_table(path, tickers)?;
    let table = PriceTable::new(tickers.to_vec(), dates, rows)?;
    info!(
        days = table.len(),
        assets = tickers.len(),
        "close-price table loaded"
    );
    Ok(table)
}

/// Benchmark closes and per-ticker opening prices over a shared calendar.
#[derive(Debug, Clone)]
pub struct BaselineTable {
    pub benchmark: String,
    pub dates: Vec<NaiveDate>,
    /// Benchmark daily closing prices, aligned to `dates`.
    pub benchmark_closes: Vec<f64>,
    /// Per-ticker opening prices, aligned to `dates`.
    pub opens: PriceTable,
}

impl BaselineTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Load the baseline table: benchmark closes plus per-ticker opens.
pub fn load_baseline_table(
    path: impl AsRef<Path>,
    benchmark: &str,
    tickers: &[String],
) -> Result<BaselineTable> {
    let path = path.as_ref();
    info!("Loading baseline data from: {}", path.display());

    let mut columns = Vec::with_capacity(tickers.len() + 1);
    columns.push(benchmark.to_string());
    columns.extend(tickers.iter().cloned());

    let (dates, rows) = read_wide_table(path, &columns)?;

    let benchmark_closes: Vec<f64> = rows.iter().map(|r| r[0]).collect();
    let open_rows: Vec<Vec<f64>> = rows.into_iter().map(|r| r[1..].to_vec()).collect();
    let opens = PriceTable::new(tickers.to_vec(), dates.clone(), open_rows)?;

    info!(days = dates.len(), benchmark, "baseline table loaded");
    Ok(BaselineTable {
        benchmark: benchmark.to_string(),
        dates,
        benchmark_closes,
        opens,
    })
}
