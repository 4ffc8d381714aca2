//! Random draws used by the simulation rules.
//!
//! Every draw takes the random source explicitly so sessions seeded
//! identically replay identically.

use std::time::Duration;

use rand::Rng;

/// Returns `true` with the given probability.
///
/// Probabilities at or below zero never succeed and probabilities at or
/// above one always succeed; exactly one value is drawn either way so the
/// stream position does not depend on the probability.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    let draw: f64 = rng.gen();
    draw < probability
}

/// Draws a delay uniformly from the inclusive window `min..=max`.
///
/// An inverted or empty window yields `min` without consuming randomness.
pub fn uniform_delay<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let low = u64::try_from(min.as_nanos()).unwrap_or(u64::MAX);
    let high = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rng.gen_range(low..=high))
}
