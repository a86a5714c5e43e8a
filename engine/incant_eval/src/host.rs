//! Host-provided non-determinism: clock and RNG.
//!
//! `random`, `timestamp`, and `date` are the only impure builtins; both
//! sources are injected per invocation so tests and replays are
//! reproducible.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// Wall clock seam, enum-dispatched.
pub enum Clock {
    /// Real time.
    System,
    /// A pinned instant, given as seconds since the Unix epoch.
    Fixed(f64),
}

impl Clock {
    /// The current instant.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(secs) => {
                let millis = (secs * 1000.0) as i64;
                DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
            }
        }
    }

    /// Seconds since the Unix epoch, with millisecond precision.
    pub fn timestamp(&self) -> f64 {
        self.now().timestamp_millis() as f64 / 1000.0
    }
}

/// RNG seam wrapping a seedable generator.
pub struct Rng(StdRng);

impl Rng {
    /// OS-seeded generator for production hosts.
    pub fn from_os() -> Self {
        Rng(StdRng::from_os_rng())
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Rng(StdRng::seed_from_u64(seed))
    }

    /// Uniform value in `[lo, hi]`; the bounds may come in either order.
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            return lo;
        }
        self.0.random_range(lo..=hi)
    }
}

/// Everything impure an invocation may touch.
pub struct Host {
    pub clock: Clock,
    pub rng: Rng,
}

impl Host {
    /// Production host: real clock, OS-seeded RNG.
    pub fn system() -> Self {
        Host {
            clock: Clock::System,
            rng: Rng::from_os(),
        }
    }

    /// Reproducible host for tests: pinned clock, seeded RNG.
    pub fn fixed(epoch_secs: f64, seed: u64) -> Self {
        Host {
            clock: Clock::Fixed(epoch_secs),
            rng: Rng::seeded(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_clock_is_stable() {
        let clock = Clock::Fixed(1_700_000_000.5);
        assert_eq!(clock.timestamp(), 1_700_000_000.5);
        assert_eq!(clock.timestamp(), 1_700_000_000.5);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = Rng::seeded(7);
        let mut b = Rng::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.uniform(0.0, 10.0), b.uniform(0.0, 10.0));
        }
    }

    #[test]
    fn uniform_normalizes_reversed_bounds() {
        let mut rng = Rng::seeded(1);
        for _ in 0..16 {
            let v = rng.uniform(10.0, 0.0);
            assert!((0.0..=10.0).contains(&v));
        }
    }
}
