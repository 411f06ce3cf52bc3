//! Return and covariance estimation from price windows.
//!
//! Returns are natural-log returns, `ln(p_t / p_{t-1})`, chosen for
//! additivity over time and scale-consistency with the annualization
//! factor. Both moments are annualized with a fixed trading-day scale,
//! never re-derived from the window length: short windows near the start
//! of a history under- or overstate variance, an accepted approximation.

use crate::error::{FrontierError, Result};
use crate::types::{PriceTable, ReturnSeries, Statistics};
use nalgebra::{DMatrix, DVector};

/// Fixed annualization scale for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Compute daily log returns from a price window.
///
/// A window with fewer than 2 rows yields an empty series; callers that
/// need statistics must treat that case explicitly (see
/// [`compute_statistics`]).
pub fn compute_returns(window: &PriceTable) -> ReturnSeries {
    let num_assets = window.tickers().len();
    let rows = window.rows();
    let num_returns = rows.len().saturating_sub(1);

    let returns = DMatrix::from_fn(num_returns, num_assets, |t, a| {
        (rows[t + 1][a] / rows[t][a]).ln()
    });

    ReturnSeries::new(window.tickers().to_vec(), returns)
}

/// Compute the annualized mean vector and sample covariance matrix.
///
/// Requires at least 2 return observations so the sample covariance
/// denominator is defined; anything shorter is an `InsufficientWindow`
/// error rather than a silent NaN.
pub fn compute_statistics(returns: &ReturnSeries) -> Result<Statistics> {
    let n = returns.len();
    if n < 2 {
        return Err(FrontierError::InsufficientWindow {
            rows: n,
            required: 2,
        });
    }

    let matrix = returns.matrix();
    let k = returns.num_assets();

    let daily_mean = DVector::from_fn(k, |a, _| matrix.column(a).sum() / n as f64);

    let covariance = DMatrix::from_fn(k, k, |i, j| {
        let col_i = matrix.column(i);
        let col_j = matrix.column(j);
        let mut acc = 0.0;
        for t in 0..n {
            acc += (col_i[t] - daily_mean[i]) * (col_j[t] - daily_mean[j]);
        }
        acc / (n - 1) as f64 * TRADING_DAYS_PER_YEAR
    });

    Ok(Statistics {
        mean: daily_mean * TRADING_DAYS_PER_YEAR,
        covariance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn two_asset_table() -> PriceTable {
        // Asset 1 grows 10% a day, asset 2 is flat.
        PriceTable::new(
            vec!["GROW".to_string(), "FLAT".to_string()],
            vec![d(1), d(2), d(3)],
            vec![
                vec![100.0, 50.0],
                vec![110.0, 50.0],
                vec![121.0, 50.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_log_returns() {
        let returns = compute_returns(&two_asset_table());
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.num_assets(), 2);

        let expected = (1.1f64).ln();
        for t in 0..2 {
            assert!((returns.matrix()[(t, 0)] - expected).abs() < 1e-12);
            assert!(returns.matrix()[(t, 1)].abs() < 1e-12);
        }
    }

    #[test]
    fn test_short_window_yields_empty_series() {
        let table = PriceTable::new(
            vec!["AAA".to_string()],
            vec![d(1)],
            vec![vec![100.0]],
        )
        .unwrap();
        let returns = compute_returns(&table);
        assert!(returns.is_empty());
    }

    #[test]
    fn test_statistics_annualization() {
        let returns = compute_returns(&two_asset_table());
        let stats = compute_statistics(&returns).unwrap();

        let expected_mean = (1.1f64).ln() * TRADING_DAYS_PER_YEAR;
        assert!((stats.mean[0] - expected_mean).abs() < 1e-9);
        assert!(stats.mean[1].abs() < 1e-12);

        // Identical daily returns have zero sample variance.
        assert_eq!(stats.covariance.nrows(), 2);
        assert_eq!(stats.covariance.ncols(), 2);
        assert!(stats.covariance[(0, 0)].abs() < 1e-12);
        assert!(stats.covariance[(1, 1)].abs() < 1e-12);
    }

    #[test]
    fn test_covariance_symmetry() {
        let table = PriceTable::new(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![d(1), d(2), d(3), d(4), d(5)],
            vec![
                vec![100.0, 50.0, 20.0],
                vec![103.0, 49.0, 20.5],
                vec![101.0, 51.5, 19.8],
                vec![106.0, 50.5, 21.0],
                vec![104.0, 52.0, 20.2],
            ],
        )
        .unwrap();

        let stats = compute_statistics(&compute_returns(&table)).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((stats.covariance[(i, j)] - stats.covariance[(j, i)]).abs() < 1e-12);
            }
            assert!(stats.covariance[(i, i)] >= 0.0);
        }
    }

    #[test]
    fn test_insufficient_window_is_explicit() {
        let table = PriceTable::new(
            vec!["AAA".to_string()],
            vec![d(1), d(2)],
            vec![vec![100.0], vec![101.0]],
        )
        .unwrap();
        // One return observation: covariance denominator undefined.
        let returns = compute_returns(&table);
        let err = compute_statistics(&returns).unwrap_err();
        assert!(matches!(
            err,
            crate::error::FrontierError::InsufficientWindow { rows: 1, required: 2 }
        ));
    }

    #[test]
    fn test_statistics_are_pure() {
        let returns = compute_returns(&two_asset_table());
        let a = compute_statistics(&returns).unwrap();
        let b = compute_statistics(&returns).unwrap();
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.covariance, b.covariance);
    }
}
