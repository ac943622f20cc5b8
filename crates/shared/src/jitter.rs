//! Randomized delay ranges.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-open delay range `[min_ms, max_ms)` in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange { min_ms: 0, max_ms: 0 };

    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn from_secs(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_ms: min_secs * 1000,
            max_ms: max_secs * 1000,
        }
    }

    /// Draws a uniformly distributed duration from the range.
    ///
    /// An empty or inverted range yields `min_ms`.
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..self.max_ms))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::from_secs(3, 8);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let d = range.sample_with(&mut rng);
            assert!(d >= Duration::from_secs(3));
            assert!(d < Duration::from_secs(8));
        }
    }

    #[test]
    fn test_empty_range_yields_min() {
        assert_eq!(DelayRange::ZERO.sample(), Duration::ZERO);
        assert_eq!(
            DelayRange::from_millis(500, 500).sample(),
            Duration::from_millis(500)
        );
        assert_eq!(
            DelayRange::from_millis(900, 100).sample(),
            Duration::from_millis(900)
        );
    }

    #[test]
    fn test_from_secs() {
        let range = DelayRange::from_secs(0, 30);
        assert_eq!(range.min_ms, 0);
        assert_eq!(range.max_ms, 30_000);
    }

    #[test]
    fn test_deserialize() {
        let range: DelayRange =
            serde_json::from_str(r#"{"min_ms": 60, "max_ms": 160}"#).unwrap();
        assert_eq!(range, DelayRange::from_millis(60, 160));
    }
}
