//! Property-based tests for the statistical and simplex invariants.
//!
//! These verify that:
//! 1. Sampled weight vectors always satisfy the simplex constraint
//! 2. Simplex projection maps arbitrary vectors onto the simplex
//! 3. Covariance matrices are symmetric with nonnegative diagonals
//! 4. The optimizer never returns an infeasible weight vector

use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

use frontier::optimizer::{project_to_simplex, Objective, SharpeOptimizer};
use frontier::types::{PriceTable, Statistics, WeightVector};
use frontier::{compute_returns, compute_statistics, WeightSampler};

const SUM_TOLERANCE: f64 = 1e-6;

fn assert_simplex(weights: &[f64]) {
    let sum: f64 = weights.iter().sum();
    assert!(
        (sum - 1.0).abs() < SUM_TOLERANCE,
        "weights sum to {sum}, expected 1"
    );
    for w in weights {
        assert!(*w >= -SUM_TOLERANCE, "negative weight {w}");
    }
}

/// Strategy generating a valid price table: dates strictly increasing,
/// strictly positive prices.
fn price_table_strategy() -> impl Strategy<Value = PriceTable> {
    (1usize..=5, 3usize..=25).prop_flat_map(|(assets, days)| {
        proptest::collection::vec(
            proptest::collection::vec(1.0f64..1000.0, assets),
            days,
        )
        .prop_map(move |rows| {
            let tickers: Vec<String> = (0..assets).map(|i| format!("T{i}")).collect();
            let dates: Vec<chrono::NaiveDate> = (0..days as i64)
                .map(|i| {
                    chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
                        + chrono::Duration::days(i)
                })
                .collect();
            PriceTable::new(tickers, dates, rows).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn sampled_weights_always_on_simplex(
        num_assets in 1usize..=12,
        seed in any::<u64>(),
    ) {
        let mut sampler = WeightSampler::seeded(num_assets, seed);
        for _ in 0..20 {
            let w = sampler.sample();
            prop_assert_eq!(w.len(), num_assets);
            assert_simplex(w.as_slice());
        }
    }

    #[test]
    fn projection_lands_on_simplex(
        values in proptest::collection::vec(-10.0f64..10.0, 1..=10),
    ) {
        let projected = project_to_simplex(&DVector::from_vec(values));
        let as_vec: Vec<f64> = projected.iter().copied().collect();
        assert_simplex(&as_vec);
    }

    #[test]
    fn covariance_is_symmetric_psd_diagonal(table in price_table_strategy()) {
        let returns = compute_returns(&table);
        let stats = compute_statistics(&returns).unwrap();
        let k = table.tickers().len();

        prop_assert_eq!(stats.covariance.nrows(), k);
        prop_assert_eq!(stats.covariance.ncols(), k);
        for i in 0..k {
            for j in 0..k {
                let diff = (stats.covariance[(i, j)] - stats.covariance[(j, i)]).abs();
                prop_assert!(diff < 1e-9, "asymmetry {diff} at ({i},{j})");
            }
            prop_assert!(stats.covariance[(i, i)] >= -1e-12);
        }
    }

    #[test]
    fn optimizer_output_is_always_feasible(
        means in proptest::collection::vec(-0.5f64..0.5, 2..=6),
        variances in proptest::collection::vec(0.001f64..0.5, 6),
        seed in any::<u64>(),
    ) {
        let k = means.len();
        let stats = Statistics {
            mean: DVector::from_column_slice(&means),
            covariance: DMatrix::from_fn(k, k, |i, j| {
                if i == j { variances[i] } else { 0.0 }
            }),
        };

        let mut sampler = WeightSampler::seeded(k, seed);
        let seed_weights = sampler.sample();

        match SharpeOptimizer::with_defaults().optimize(&seed_weights, &stats, Objective::Sharpe) {
            Ok(w) => assert_simplex(w.as_slice()),
            Err(frontier::FrontierError::NonConvergence { best, .. }) => {
                assert_simplex(best.as_slice())
            }
            Err(frontier::FrontierError::DegenerateStatistics { .. }) => {}
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }

    #[test]
    fn weight_vector_rejects_non_simplex(
        values in proptest::collection::vec(0.0f64..1.0, 2..=6),
    ) {
        let sum: f64 = values.iter().sum();
        // Only feed clearly-off-simplex vectors.
        prop_assume!((sum - 1.0).abs() > 0.01);
        prop_assert!(WeightVector::new(values).is_err());
    }
}
