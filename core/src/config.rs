use std::time::Duration;

use crate::transport::UniformLatency;

// ---------------------------------------------------------------------------
// FetchConfig
// ---------------------------------------------------------------------------

/// Construction-time settings for a `FetchManager`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Base URL every resource path is appended to. Trailing slashes are
    /// stripped by `with_base_url`.
    pub base_url: String,

    /// Name of the `Response` substituted when a starships fetch fails.
    pub starship_fallback: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://swapi.dev/api".to_string(),
            starship_fallback: "Millennium Falcon".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// LatencyConfig
// ---------------------------------------------------------------------------

/// Artificial delay injected by the mock transport.
///
/// Each request waits a whole number of `unit`s drawn uniformly from
/// `[min_units, max_units]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyConfig {
    pub unit: Duration,
    pub min_units: u32,
    pub max_units: u32,
    /// RNG seed for reproducible delay sequences. `None` = random.
    pub seed: Option<u64>,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            min_units: 1,
            max_units: 4,
            seed: None,
        }
    }
}

impl LatencyConfig {
    /// No delay at all.
    pub fn instant() -> Self {
        Self {
            unit: Duration::ZERO,
            ..Default::default()
        }
    }

    /// 10-40 ms, enough to reorder concurrent fetches without slowing tests.
    pub fn fast() -> Self {
        Self {
            unit: Duration::from_millis(10),
            ..Default::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(&self) -> UniformLatency {
        UniformLatency::new(self.unit, self.min_units, self.max_units, self.seed)
    }
}
