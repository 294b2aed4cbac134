//! Rotation of sources about a pivot: continuous or target-seeking.
//!
//! Both components rotate the pivot-relative vector of the *current*
//! position by this frame's angular increment and emit the difference, so
//! they compose with concentration and trajectories by plain addition.

use sm_core::error::{require_finite, require_non_negative};
use sm_core::{ConfigError, ConfigResult, MotionDelta, MotionState, Orientation, SourceId, Vec3};

use crate::{ComponentResult, Motion};

/// Angular distance (radians, per axis) under which a seek is complete.
pub const SEEK_EPSILON: f64 = 1e-4;

fn require_finite_orientation(param: &'static str, o: Orientation) -> ConfigResult<Orientation> {
    if o.is_finite() {
        Ok(o)
    } else {
        Err(ConfigError::NonFinite { param })
    }
}

fn rotated_offset(step: Orientation, position: Vec3, pivot: Vec3) -> Vec3 {
    let rel = position - pivot;
    step.rotate(rel) - rel
}

// ── AlgorithmicRotation ───────────────────────────────────────────────────────

/// Continuous rotation at fixed per-axis angular rates.
#[derive(Clone, Debug)]
pub struct AlgorithmicRotation {
    enabled:        bool,
    /// Radians per second about each axis.
    rates:          Orientation,
    pivot:          Vec3,
    explicit_pivot: bool,
}

impl AlgorithmicRotation {
    pub fn new(rates: Orientation) -> ConfigResult<Self> {
        Ok(Self {
            enabled:        true,
            rates:          require_finite_orientation("rates", rates)?,
            pivot:          Vec3::ZERO,
            explicit_pivot: false,
        })
    }

    /// Shorthand for rotation about the vertical axis only.
    pub fn yaw(rate: f64) -> ConfigResult<Self> {
        Self::new(Orientation::new(rate, 0.0, 0.0))
    }

    /// Fix the pivot.  A fixed pivot is not replaced by the macro centroid.
    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = pivot;
        self.explicit_pivot = true;
        self
    }

    pub fn set_rates(&mut self, rates: Orientation) -> ConfigResult<()> {
        self.rates = require_finite_orientation("rates", rates)?;
        Ok(())
    }

    pub fn rates(&self) -> Orientation {
        self.rates
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }
}

impl Motion for AlgorithmicRotation {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn calculate_delta(
        &self,
        _source: SourceId,
        state:   &MotionState,
        _time:   f64,
        dt:      f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        if !self.enabled {
            return Ok(None);
        }
        // A source sitting on the pivot rotates onto itself: zero offset.
        let offset = rotated_offset(self.rates.scale(dt), state.position, self.pivot);
        Ok(Some(MotionDelta::position(offset)))
    }

    fn bind_group_center(&mut self, centroid: Vec3) {
        if !self.explicit_pivot {
            self.pivot = centroid;
        }
    }
}

// ── ManualRotation ────────────────────────────────────────────────────────────

/// How [`ManualRotation`] closes the gap to its target each frame.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Interpolation {
    /// At most `speed · dt` radians per axis per frame.
    #[default]
    Linear,
    /// The fraction `1 − e^(−speed·dt)` of the remaining angle per frame.
    Exponential,
}

/// Whether a [`ManualRotation`] currently has somewhere to go.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SeekState {
    Idle,
    Seeking,
}

/// Rotation that eases the group toward a target orientation.
///
/// ```text
///   Idle ──set_target──▶ Seeking ──within SEEK_EPSILON──▶ Idle
///                          │  ▲
///                          └──┘ set_target: replace target, keep progress
/// ```
///
/// The first frame after activation (construction or re-enable) only
/// establishes the baseline and contributes nothing.
#[derive(Clone, Debug)]
pub struct ManualRotation {
    enabled:          bool,
    pivot:            Vec3,
    explicit_pivot:   bool,
    speed:            f64,
    interpolation:    Interpolation,
    current:          Orientation,
    target:           Option<Orientation>,
    /// Increment applied by the most recent `begin_frame`; `None` on the
    /// baseline frame.
    step:             Option<Orientation>,
    baseline_pending: bool,
}

impl ManualRotation {
    pub fn new(speed: f64, interpolation: Interpolation) -> ConfigResult<Self> {
        Ok(Self {
            enabled:          true,
            pivot:            Vec3::ZERO,
            explicit_pivot:   false,
            speed:            require_non_negative("speed", speed)?,
            interpolation,
            current:          Orientation::ZERO,
            target:           None,
            step:             None,
            baseline_pending: true,
        })
    }

    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = pivot;
        self.explicit_pivot = true;
        self
    }

    /// Seek `target`.  While already seeking, only the target changes;
    /// the orientation reached so far is kept.
    pub fn set_target(&mut self, target: Orientation) -> ConfigResult<()> {
        self.target = Some(require_finite_orientation("target", target)?);
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f64) -> ConfigResult<()> {
        self.speed = require_non_negative("speed", speed)?;
        Ok(())
    }

    pub fn state(&self) -> SeekState {
        if self.target.is_some() { SeekState::Seeking } else { SeekState::Idle }
    }

    pub fn current(&self) -> Orientation {
        self.current
    }

    pub fn target(&self) -> Option<Orientation> {
        self.target
    }

    fn next_increment(&self, remaining: Orientation, dt: f64) -> Orientation {
        match self.interpolation {
            Interpolation::Linear => {
                let max = self.speed * dt;
                Orientation::new(
                    remaining.yaw.clamp(-max, max),
                    remaining.pitch.clamp(-max, max),
                    remaining.roll.clamp(-max, max),
                )
            }
            Interpolation::Exponential => remaining.scale(1.0 - (-self.speed * dt).exp()),
        }
    }
}

impl Motion for ManualRotation {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.baseline_pending = true;
        }
        self.enabled = enabled;
    }

    fn begin_frame(&mut self, _time: f64, dt: f64) {
        if self.baseline_pending {
            self.baseline_pending = false;
            self.step = None;
            return;
        }
        let Some(target) = self.target else {
            self.step = Some(Orientation::ZERO);
            return;
        };

        let mut step = self.next_increment(target - self.current, dt);
        self.current += step;
        let left = target - self.current;
        if left.max_abs() <= SEEK_EPSILON {
            step += left;
            self.current = target;
            self.target = None;
        }
        self.step = Some(step);
    }

    fn calculate_delta(
        &self,
        _source: SourceId,
        state:   &MotionState,
        _time:   f64,
        _dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(step) = self.step else {
            return Ok(None);
        };
        let offset = rotated_offset(step, state.position, self.pivot);
        Ok(Some(MotionDelta::position(offset).with_orientation(step)))
    }

    fn bind_group_center(&mut self, centroid: Vec3) {
        if !self.explicit_pivot {
            self.pivot = centroid;
        }
    }
}
