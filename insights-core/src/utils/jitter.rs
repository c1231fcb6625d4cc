use rand::Rng;
use std::time::Duration;

/// Lower bound of the jitter factor applied to every delay.
const JITTER_MIN: f64 = 0.75;
/// Upper bound of the jitter factor applied to every delay.
const JITTER_MAX: f64 = 1.25;

/// Randomize a delay to `[0.75, 1.25] * base` so that feeders sharing an
/// upstream do not poll in lockstep.
pub fn jittered(base: Duration) -> Duration {
    let factor = rand::rng().random_range(JITTER_MIN..=JITTER_MAX);
    base.mul_f64(factor)
}
