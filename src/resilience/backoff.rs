//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Exponential delay after the given failed attempt (1-indexed), capped at `max`.
///
/// Attempt 1 yields `initial`, attempt 2 yields `2 * initial`, and so on.
pub fn exponential_delay(attempt: u32, initial: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponent = (attempt - 1).min(31);
    initial
        .checked_mul(2u32.saturating_pow(exponent))
        .unwrap_or(max)
        .min(max)
}

/// Add uniform jitter in `[0, fraction * delay]`, never exceeding `cap`.
pub fn apply_jitter<R: Rng + ?Sized>(
    delay: Duration,
    fraction: f64,
    cap: Duration,
    rng: &mut R,
) -> Duration {
    let range = delay.as_secs_f64() * fraction;
    let jitter = if range > 0.0 {
        rng.gen_range(0.0..=range)
    } else {
        0.0
    };

    let jitter = Duration::try_from_secs_f64(jitter).unwrap_or(Duration::ZERO);
    delay.saturating_add(jitter).min(cap)
}
