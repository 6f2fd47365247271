use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Produces human-like pauses to reduce automation signals.
#[derive(Debug, Clone, Default)]
pub struct BehavioralEngine {
    /// Collapse every pause to zero (tests, batch runs).
    pub instant: bool,
}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a pause between `min` and `max` milliseconds.
    pub fn pick_delay(&self, min: u64, max: u64) -> Duration {
        if self.instant || max == 0 {
            return Duration::ZERO;
        }
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        Duration::from_millis(OsRng.gen_range(lo..=hi))
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let pause = self.pick_delay(min, max);
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_in_range() {
        let engine = BehavioralEngine::new();
        for _ in 0..50 {
            let d = engine.pick_delay(300, 1200).as_millis();
            assert!((300..=1200).contains(&d));
        }
        let swapped = engine.pick_delay(50, 10).as_millis();
        assert!((10..=50).contains(&swapped));
    }

    #[test]
    fn instant_engine_never_waits() {
        assert_eq!(BehavioralEngine { instant: true }.pick_delay(300, 1200), Duration::ZERO);
    }
}
