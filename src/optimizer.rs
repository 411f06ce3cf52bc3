//! Constrained Sharpe-ratio maximization over the portfolio simplex.
//!
//! The optimizer is a projected-gradient local method: each ascent step on
//! the Sharpe surface is projected back onto the simplex (weights in
//! [0, 1], summing to 1), so every iterate is a feasible long-only,
//! fully-invested portfolio. The result is a local optimum seeded at the
//! initial weights; with a near-singular covariance or highly correlated
//! assets, different seeds may converge to different local optima.

use crate::error::{FrontierError, Result};
use crate::types::{Statistics, WeightVector};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Volatility below this is treated as an undefined Sharpe ratio.
const VOLATILITY_FLOOR: f64 = 1e-10;

/// Optimization objective.
///
/// Only `Sharpe` is implemented; the other variants are recognized but
/// rejected with an explicit error instead of silently doing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Sharpe,
    ExpectedReturn,
    Risk,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::Sharpe => "sharpe",
            Objective::ExpectedReturn => "expected_return",
            Objective::Risk => "risk",
        }
    }
}

/// Annualized performance of a candidate portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

/// Evaluate a weight vector against annualized statistics.
///
/// `expected_return = mean . w` and `volatility = sqrt(w' cov w)`; both
/// moments arrive already annualized from the statistics engine. A
/// near-zero volatility makes the Sharpe ratio undefined and is returned
/// as a `DegenerateStatistics` error, never as a non-finite float.
pub fn evaluate(stats: &Statistics, weights: &WeightVector) -> Result<Performance> {
    let w = weights.to_dvector();
    let expected_return = stats.mean.dot(&w);
    let variance = (&stats.covariance * &w).dot(&w);
    let volatility = variance.max(0.0).sqrt();

    if volatility < VOLATILITY_FLOOR {
        return Err(FrontierError::DegenerateStatistics { volatility });
    }

    Ok(Performance {
        expected_return,
        volatility,
        sharpe: expected_return / volatility,
    })
}

/// Euclidean projection onto the probability simplex.
///
/// Sort-based algorithm; the box constraint `w_i <= 1` is implied by
/// nonnegativity and the unit sum.
pub fn project_to_simplex(v: &DVector<f64>) -> DVector<f64> {
    let mut sorted: Vec<f64> = v.iter().copied().collect();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (i, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (i as f64 + 1.0);
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.map(|x| (x - theta).max(0.0))
}

/// Configuration for the projected-gradient optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Iteration budget before reporting non-convergence.
    pub max_iterations: usize,
    /// Initial ascent step size.
    pub initial_step: f64,
    /// Accepted improvements below this count as converged.
    pub tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            initial_step: 1.0,
            tolerance: 1e-10,
        }
    }
}

/// Projected-gradient Sharpe maximizer.
pub struct SharpeOptimizer {
    config: OptimizerConfig,
}

impl SharpeOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(OptimizerConfig::default())
    }

    /// Maximize the objective over the simplex, seeded at `initial`.
    ///
    /// Returns a simplex point whenever it returns at all. Exhausting the
    /// iteration budget yields a `NonConvergence` error carrying the best
    /// iterate found, so callers can decide their own fallback policy.
    pub fn optimize(
        &self,
        initial: &WeightVector,
        stats: &Statistics,
        objective: Objective,
    ) -> Result<WeightVector> {
        if objective != Objective::Sharpe {
            return Err(FrontierError::UnsupportedObjective(
                objective.as_str().to_string(),
            ));
        }

        let mut w = project_to_simplex(&initial.to_dvector());
        let mut best_sharpe = sharpe_of(stats, &w)?;
        let mut step = self.config.initial_step;
        let min_step = f64::EPSILON;

        for iteration in 0..self.config.max_iterations {
            let Some(gradient) = sharpe_gradient(stats, &w) else {
                // Iterate drifted into a degenerate region; shrink back.
                step *= 0.5;
                if step < min_step {
                    break;
                }
                continue;
            };

            let candidate = project_to_simplex(&(&w + &gradient * step));
            match sharpe_of(stats, &candidate) {
                Ok(sharpe) if sharpe > best_sharpe => {
                    let improvement = sharpe - best_sharpe;
                    w = candidate;
                    best_sharpe = sharpe;
                    step *= 1.2;
                    if improvement < self.config.tolerance {
                        debug!(iteration, best_sharpe, "optimizer converged");
                        return Ok(normalized(&w));
                    }
                }
                _ => {
                    step *= 0.5;
                    if step < min_step {
                        debug!(iteration, best_sharpe, "optimizer converged (step floor)");
                        return Ok(normalized(&w));
                    }
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            best_sharpe, "optimizer exhausted its iteration budget"
        );
        Err(FrontierError::NonConvergence {
            iterations: self.config.max_iterations,
            best: normalized(&w),
        })
    }
}

fn sharpe_of(stats: &Statistics, w: &DVector<f64>) -> Result<f64> {
    let expected_return = stats.mean.dot(w);
    let variance = (&stats.covariance * w).dot(w);
    let volatility = variance.max(0.0).sqrt();
    if volatility < VOLATILITY_FLOOR {
        return Err(FrontierError::DegenerateStatistics { volatility });
    }
    Ok(expected_return / volatility)
}

/// Gradient of `S(w) = (mean . w) / sqrt(w' cov w)`.
fn sharpe_gradient(stats: &Statistics, w: &DVector<f64>) -> Option<DVector<f64>> {
    let expected_return = stats.mean.dot(w);
    let cov_w = &stats.covariance * w;
    let variance = cov_w.dot(w);
    let volatility = variance.max(0.0).sqrt();
    if volatility < VOLATILITY_FLOOR {
        return None;
    }
    Some(&stats.mean / volatility - cov_w * (expected_return / (volatility * variance)))
}

/// Clean up projection rounding before handing weights back out.
fn normalized(w: &DVector<f64>) -> WeightVector {
    let sum: f64 = w.iter().sum();
    let weights: Vec<f64> = w.iter().map(|x| x / sum).collect();
    WeightVector::new(weights).expect("projected iterate is a simplex point")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn diag_stats(means: &[f64], variances: &[f64]) -> Statistics {
        let k = means.len();
        Statistics {
            mean: DVector::from_column_slice(means),
            covariance: DMatrix::from_fn(k, k, |i, j| if i == j { variances[i] } else { 0.0 }),
        }
    }

    #[test]
    fn test_evaluate_known_values() {
        let stats = diag_stats(&[0.2, 0.1], &[0.04, 0.01]);
        let perf = evaluate(&stats, &WeightVector::new(vec![0.5, 0.5]).unwrap()).unwrap();

        assert!((perf.expected_return - 0.15).abs() < 1e-12);
        // var = 0.25 * 0.04 + 0.25 * 0.01 = 0.0125
        assert!((perf.volatility - 0.0125f64.sqrt()).abs() < 1e-12);
        assert!((perf.sharpe - 0.15 / 0.0125f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_rejects_zero_volatility() {
        let stats = diag_stats(&[0.2], &[0.0]);
        let err = evaluate(&stats, &WeightVector::new(vec![1.0]).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            FrontierError::DegenerateStatistics { .. }
        ));
    }

    #[test]
    fn test_projection_yields_simplex_points() {
        let cases = [
            vec![0.2, 0.3],
            vec![5.0, -3.0, 0.1],
            vec![-1.0, -2.0, -3.0],
            vec![0.25, 0.25, 0.25, 0.25],
        ];
        for case in cases {
            let p = project_to_simplex(&DVector::from_vec(case));
            let sum: f64 = p.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(p.iter().all(|x| *x >= 0.0));
        }
    }

    #[test]
    fn test_projection_fixes_point_on_simplex() {
        let p = project_to_simplex(&DVector::from_vec(vec![0.3, 0.7]));
        assert!((p[0] - 0.3).abs() < 1e-12);
        assert!((p[1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_optimize_favors_higher_sharpe_asset() {
        // Asset 0 returns 30% at the same volatility as asset 1's 0%.
        let stats = diag_stats(&[0.3, 0.0], &[0.04, 0.04]);
        let seed = WeightVector::new(vec![0.5, 0.5]).unwrap();

        let optimizer = SharpeOptimizer::with_defaults();
        let optimal = optimizer
            .optimize(&seed, &stats, Objective::Sharpe)
            .unwrap();

        assert!(optimal.as_slice()[0] > 0.9);
        let sum: f64 = optimal.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let seed_perf = evaluate(&stats, &seed).unwrap();
        let opt_perf = evaluate(&stats, &optimal).unwrap();
        assert!(opt_perf.sharpe >= seed_perf.sharpe);
    }

    #[test]
    fn test_optimize_result_near_tangency_portfolio() {
        // Tangency weights are proportional to inv(cov) * mean.
        let stats = diag_stats(&[0.2, 0.02], &[0.04, 0.04]);
        let seed = WeightVector::uniform(2);

        let optimal = SharpeOptimizer::with_defaults()
            .optimize(&seed, &stats, Objective::Sharpe)
            .unwrap();

        // inv(cov) * mean = [5.0, 0.5], normalized = [10/11, 1/11].
        assert!((optimal.as_slice()[0] - 10.0 / 11.0).abs() < 0.02);
    }

    #[test]
    fn test_optimize_rejects_unsupported_objectives() {
        let stats = diag_stats(&[0.2, 0.1], &[0.04, 0.01]);
        let seed = WeightVector::uniform(2);
        let optimizer = SharpeOptimizer::with_defaults();

        for objective in [Objective::ExpectedReturn, Objective::Risk] {
            let err = optimizer.optimize(&seed, &stats, objective).unwrap_err();
            assert!(matches!(err, FrontierError::UnsupportedObjective(_)));
        }
    }

    #[test]
    fn test_optimize_degenerate_covariance_fails_loudly() {
        let stats = diag_stats(&[0.2, 0.1], &[0.0, 0.0]);
        let err = SharpeOptimizer::with_defaults()
            .optimize(&WeightVector::uniform(2), &stats, Objective::Sharpe)
            .unwrap_err();
        assert!(matches!(err, FrontierError::DegenerateStatistics { .. }));
    }

    #[test]
    fn test_single_asset_collapses_to_full_weight() {
        let stats = diag_stats(&[0.15], &[0.04]);
        let optimal = SharpeOptimizer::with_defaults()
            .optimize(&WeightVector::uniform(1), &stats, Objective::Sharpe)
            .unwrap();
        assert!((optimal.as_slice()[0] - 1.0).abs() < 1e-9);
    }
}
