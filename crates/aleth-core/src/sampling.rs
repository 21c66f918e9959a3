//! Random draws shared by the phase simulators.
//!
//! All helpers take the caller's RNG so a seeded generator reproduces a
//! whole run.

use std::f64::consts::PI;

use rand::Rng;
use rand::seq::IndexedRandom;

/// Deployment outcomes; a uniform pick gives success twice the weight.
const DEPLOYMENT_OUTCOMES: [bool; 3] = [true, true, false];

/// Draw from a normal distribution with the given mean and standard
/// deviation (Box-Muller transform).
pub fn normal(rng: &mut impl Rng, mean: f64, sigma: f64) -> f64 {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    // ln(0) is -inf.
    let u1 = if u1 <= 0.0 { f64::MIN_POSITIVE } else { u1 };
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + z * sigma
}

/// Uniform draw from `[low, high]`. A degenerate range returns `low`.
pub fn uniform(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    if low < high {
        rng.random_range(low..=high)
    } else {
        low
    }
}

/// Unbiased coin flip.
pub fn coin_flip(rng: &mut impl Rng) -> bool {
    rng.random_bool(0.5)
}

/// Uniform pick over `{true, true, false}`.
pub fn deployment_outcome(rng: &mut impl Rng) -> bool {
    DEPLOYMENT_OUTCOMES.choose(rng).copied().unwrap_or(false)
}
