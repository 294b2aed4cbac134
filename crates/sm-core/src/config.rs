//! Top-level engine configuration.

use crate::error::{require_range, ConfigResult};

/// Engine configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to the engine builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Capacity of the source registry.  Creation beyond it is rejected.
    pub max_sources: usize,

    /// Frames per second; `update(None)` advances by `1 / frame_rate`.
    pub frame_rate: f64,

    /// Seed for randomized formations.  The same seed always produces the
    /// same layouts.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sources: 128,
            frame_rate:  60.0,
            seed:        0,
        }
    }
}

impl EngineConfig {
    /// Upper bound on registry capacity accepted by [`validate`][Self::validate].
    pub const MAX_CAPACITY: usize = 1 << 20;

    /// Check every field.  Called by the engine builder.
    pub fn validate(&self) -> ConfigResult<()> {
        require_range("max_sources", self.max_sources as f64, 1.0, Self::MAX_CAPACITY as f64)?;
        require_range("frame_rate", self.frame_rate, 1e-3, 10_000.0)?;
        Ok(())
    }
}
