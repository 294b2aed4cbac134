//! Simulation time model.
//!
//! # Design
//!
//! Two clocks run side by side:
//!
//!   frame         : integer count of completed `update` calls
//!   elapsed_secs  : sum of every `dt` passed to `update`
//!
//! Frame deltas are variable (callers may pass an explicit `dt`), so the
//! elapsed time is accumulated rather than derived from the frame count.
//! `frame_rate` only supplies the default `dt` when none is given.

use std::fmt;

// ── FrameIndex ───────────────────────────────────────────────────────────────

/// Count of frames completed since the engine was built.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    pub const ZERO: FrameIndex = FrameIndex(0);

    /// Frames elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: FrameIndex) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for FrameIndex {
    type Output = FrameIndex;
    #[inline]
    fn add(self, rhs: u64) -> FrameIndex {
        FrameIndex(self.0 + rhs)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Monotonic simulation clock.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Frames per second used to derive the default `dt`.
    pub frame_rate:   f64,
    /// Simulated seconds since the clock was created.
    pub elapsed_secs: f64,
    /// Frames completed.
    pub frame:        FrameIndex,
}

impl SimClock {
    /// Create a clock at t = 0 with the given default frame rate.
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            elapsed_secs: 0.0,
            frame:        FrameIndex::ZERO,
        }
    }

    /// The `dt` used when `update` is called without one.
    #[inline]
    pub fn default_dt(&self) -> f64 {
        1.0 / self.frame_rate
    }

    /// Advance by one frame of `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.elapsed_secs += dt;
        self.frame = self.frame + 1;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={:.3}s)", self.frame, self.elapsed_secs)
    }
}
