//! Random long-only portfolio sampling.
//!
//! Weights are drawn as uniform values normalized by their sum, which is
//! uniform over directions on the simplex rather than over the simplex
//! itself. That approximation is fine for frontier visualization and for
//! seeding the optimizer, which is all it is used for.

use crate::optimizer;
use crate::types::{Statistics, WeightVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Monte-Carlo sample count for frontier sweeps.
pub const DEFAULT_NUM_PORTFOLIOS: usize = 50_000;

/// Seedable source of random simplex points.
///
/// The RNG is owned and injectable so tests can pin a seed; production
/// callers may construct from entropy.
pub struct WeightSampler {
    rng: StdRng,
    num_assets: usize,
}

impl WeightSampler {
    /// Create a sampler with an explicit seed for reproducible runs.
    pub fn seeded(num_assets: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            num_assets,
        }
    }

    /// Create a sampler seeded from OS entropy.
    pub fn from_entropy(num_assets: usize) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            num_assets,
        }
    }

    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Draw one random long-only weight vector summing to 1.
    pub fn sample(&mut self) -> WeightVector {
        sample_with(&mut self.rng, self.num_assets)
    }
}

fn sample_with(rng: &mut StdRng, num_assets: usize) -> WeightVector {
    let raw: Vec<f64> = (0..num_assets).map(|_| rng.gen::<f64>()).collect();
    let sum: f64 = raw.iter().sum();
    if sum <= f64::EPSILON {
        // All draws effectively zero; fall back to equal weights.
        return WeightVector::uniform(num_assets);
    }
    let weights: Vec<f64> = raw.iter().map(|w| w / sum).collect();
    WeightVector::new(weights).expect("normalized draws form a simplex point")
}

/// One random portfolio on the risk/return plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    pub weights: WeightVector,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

/// Sample `count` random portfolios and evaluate each against `stats`.
///
/// Candidates with degenerate volatility are excluded rather than emitted
/// with non-finite values. Samples are independent, so the sweep runs
/// data-parallel; each sample derives its own RNG from the base seed,
/// keeping the output deterministic for a given seed.
pub fn generate_frontier(stats: &Statistics, count: usize, seed: u64) -> Vec<FrontierPoint> {
    let num_assets = stats.num_assets();

    let points: Vec<FrontierPoint> = (0..count)
        .into_par_iter()
        .filter_map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let weights = sample_with(&mut rng, num_assets);
            let perf = optimizer::evaluate(stats, &weights).ok()?;
            Some(FrontierPoint {
                weights,
                expected_return: perf.expected_return,
                volatility: perf.volatility,
                sharpe: perf.sharpe,
            })
        })
        .collect();

    debug!(
        sampled = count,
        kept = points.len(),
        "frontier sweep complete"
    );
    points
}
