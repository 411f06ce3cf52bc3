//! Core data types for price histories, return statistics, and portfolios.

use crate::error::{FrontierError, Result};
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Tolerance used when validating that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A table of daily prices: one row per trading day, one column per ticker.
///
/// Dates are strictly increasing. Missing trading days are simply absent
/// rows, never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    /// Row-major prices, `rows[day][asset]`.
    rows: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Create a table, validating shape and date ordering.
    pub fn new(tickers: Vec<String>, dates: Vec<NaiveDate>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(FrontierError::DataError(format!(
                "date count {} does not match row count {}",
                dates.len(),
                rows.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != tickers.len() {
                return Err(FrontierError::DataError(format!(
                    "row {} has {} prices for {} tickers",
                    i,
                    row.len(),
                    tickers.len()
                )));
            }
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(FrontierError::DataError(format!(
                    "dates not strictly increasing: {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self {
            tickers,
            dates,
            rows,
        })
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of trading days in the table.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Prices for a given date, in ticker order.
    pub fn row(&self, date: NaiveDate) -> Option<&[f64]> {
        let idx = self.dates.binary_search(&date).ok()?;
        Some(&self.rows[idx])
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The trailing window: all rows strictly before `date`.
    pub fn window_before(&self, date: NaiveDate) -> PriceTable {
        let end = self.dates.partition_point(|d| *d < date);
        PriceTable {
            tickers: self.tickers.clone(),
            dates: self.dates[..end].to_vec(),
            rows: self.rows[..end].to_vec(),
        }
    }
}

/// Daily log returns derived from a price window.
///
/// One row per day after the window's first, one column per asset.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    tickers: Vec<String>,
    /// Rows = days, columns = assets.
    returns: DMatrix<f64>,
}

impl ReturnSeries {
    pub fn new(tickers: Vec<String>, returns: DMatrix<f64>) -> Self {
        Self { tickers, returns }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of return observations (window length - 1).
    pub fn len(&self) -> usize {
        self.returns.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.nrows() == 0
    }

    pub fn num_assets(&self) -> usize {
        self.returns.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.returns
    }
}

/// Annualized return statistics over the asset universe.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Annualized mean log return per asset.
    pub mean: DVector<f64>,
    /// Annualized sample covariance matrix, symmetric k x k.
    pub covariance: DMatrix<f64>,
}

impl Statistics {
    pub fn num_assets(&self) -> usize {
        self.mean.len()
    }
}

/// A long-only, fully-invested portfolio: nonnegative weights summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    weights: Vec<f64>,
}

impl WeightVector {
    /// Create a weight vector, validating the simplex constraint.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(FrontierError::DataError(
                "weight vector must not be empty".to_string(),
            ));
        }
        if let Some(w) = weights.iter().find(|w| **w < -WEIGHT_SUM_TOLERANCE) {
            return Err(FrontierError::DataError(format!(
                "negative weight {w} violates the long-only constraint"
            )));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FrontierError::DataError(format!(
                "weights sum to {sum}, expected 1"
            )));
        }
        Ok(Self { weights })
    }

    /// Equal weights across `n` assets.
    pub fn uniform(n: usize) -> Self {
        Self {
            weights: vec![1.0 / n as f64; n],
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn to_dvector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.weights)
    }
}

/// One day of the backtest output series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionalPoint {
    pub date: NaiveDate,
    /// Buy-and-hold benchmark notional.
    pub benchmark: f64,
    /// Marked-to-market strategy notional.
    pub strategy: f64,
}
