use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the artificial delay the mock transport injects per request.
pub trait Latency: Send + Sync + fmt::Debug {
    fn next_delay(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// FixedLatency
// ---------------------------------------------------------------------------

/// Always the same delay. `FixedLatency::default()` is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedLatency(pub Duration);

impl Latency for FixedLatency {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

// ---------------------------------------------------------------------------
// UniformLatency
// ---------------------------------------------------------------------------

/// Whole units drawn uniformly from `[min_units, max_units]`.
pub struct UniformLatency {
    unit: Duration,
    min_units: u32,
    max_units: u32,
    rng: Mutex<StdRng>,
}

impl UniformLatency {
    /// Bounds given in the wrong order are swapped.
    pub fn new(unit: Duration, min_units: u32, max_units: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            unit,
            min_units: min_units.min(max_units),
            max_units: min_units.max(max_units),
            rng: Mutex::new(rng),
        }
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (self.scaled(self.min_units), self.scaled(self.max_units))
    }

    /// `unit * units`, saturating at `Duration::MAX`.
    fn scaled(&self, units: u32) -> Duration {
        self.unit.checked_mul(units).unwrap_or(Duration::MAX)
    }
}

impl fmt::Debug for UniformLatency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformLatency")
            .field("unit", &self.unit)
            .field("min_units", &self.min_units)
            .field("max_units", &self.max_units)
            .finish_non_exhaustive()
    }
}

impl Latency for UniformLatency {
    fn next_delay(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let units = rng.gen_range(self.min_units..=self.max_units);
        self.scaled(units)
    }
}
