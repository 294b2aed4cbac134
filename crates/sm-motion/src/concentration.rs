//! Radial concentration / dispersion toward a reference center.
//!
//! # Model
//!
//! ```text
//!   rest    = |rest_position − center|      recorded when bound
//!   r       = position − center
//!   goal    = rest · factor                 distance from center
//!   delta   = r̂ · (goal − |r|) · (1 − e^(−rate·dt))
//! ```
//!
//! Each frame closes a fixed fraction of the remaining radial gap, so the
//! source approaches its goal distance exponentially and comes to rest
//! there: `factor = 0.5` holds it at half its bound radius.  Because the step
//! is computed from the current position, changing `factor` mid-motion bends
//! the curve without a jump.  A source resting at its goal gets an exact zero
//! offset, and only the radial distance is steered, so rotation about the
//! center composes freely.
//!
//! A source with no recorded rest position gets no contribution.  The engine
//! records one for every source the component is installed on.

use std::collections::HashMap;

use sm_core::error::{require_non_negative, require_range};
use sm_core::{ConfigResult, MotionDelta, MotionState, SourceId, Vec3};

use crate::{ComponentResult, Easing, Motion, ScalarAnimation};

/// Default convergence rate in 1/s.  At 60 fps a source covers ~99.97 % of
/// the gap in one second.
pub const DEFAULT_RATE: f64 = 8.0;

/// Snapshot returned to the control surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConcentrationStatus {
    pub factor:    f64,
    pub enabled:   bool,
    pub animating: bool,
}

/// Pulls sources toward (`factor → 0`) or releases them from
/// (`factor → 1`) a center point.
#[derive(Clone, Debug)]
pub struct Concentration {
    enabled:         bool,
    factor:          f64,
    /// Value swapped in by [`toggle`][Self::toggle].
    alternate:       f64,
    center:          Vec3,
    explicit_center: bool,
    rate:            f64,
    animation:       Option<ScalarAnimation>,
    /// Where each bound source sat when it was bound.
    rest:            HashMap<SourceId, Vec3>,
}

impl Concentration {
    /// A concentration with `factor ∈ [0, 1]`, centered on the origin until
    /// bound to a macro centroid or given an explicit center.
    pub fn new(factor: f64) -> ConfigResult<Self> {
        require_range("factor", factor, 0.0, 1.0)?;
        Ok(Self {
            enabled:         true,
            factor,
            alternate:       1.0,
            center:          Vec3::ZERO,
            explicit_center: false,
            rate:            DEFAULT_RATE,
            animation:       None,
            rest:            HashMap::new(),
        })
    }

    /// Fix the reference center.  A fixed center is not replaced by the
    /// macro centroid on install.
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self.explicit_center = true;
        self
    }

    /// Convergence rate in 1/s.
    pub fn with_rate(mut self, rate: f64) -> ConfigResult<Self> {
        self.rate = require_non_negative("rate", rate)?;
        Ok(self)
    }

    /// The factor [`toggle`][Self::toggle] swaps to first.  Default 1.0.
    pub fn with_toggle_value(mut self, value: f64) -> ConfigResult<Self> {
        self.alternate = require_range("toggle_value", value, 0.0, 1.0)?;
        Ok(self)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Distance from the center `source` was bound at.
    pub fn rest_radius(&self, source: SourceId) -> Option<f64> {
        self.rest.get(&source).map(|p| p.distance(self.center))
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn status(&self) -> ConcentrationStatus {
        ConcentrationStatus {
            factor:    self.factor,
            enabled:   self.enabled,
            animating: self.is_animating(),
        }
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Jump to `factor` immediately, cancelling any running animation.
    pub fn set_factor(&mut self, factor: f64) -> ConfigResult<()> {
        self.factor = require_range("factor", factor, 0.0, 1.0)?;
        self.animation = None;
        Ok(())
    }

    /// Interpolate from the current factor to `target` over `duration`
    /// seconds.  Replaces any running animation, starting from wherever it
    /// had reached.
    pub fn animate_to(&mut self, target: f64, duration: f64, easing: Easing) -> ConfigResult<()> {
        require_range("factor", target, 0.0, 1.0)?;
        require_non_negative("duration", duration)?;
        self.animation = Some(ScalarAnimation::new(self.factor, target, duration, easing));
        Ok(())
    }

    /// Swap the current factor with the remembered alternate.  Two toggles
    /// with no `set_factor` in between restore the original factor.
    pub fn toggle(&mut self) {
        self.animation = None;
        std::mem::swap(&mut self.factor, &mut self.alternate);
    }
}

impl Motion for Concentration {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn begin_frame(&mut self, _time: f64, dt: f64) {
        if let Some(anim) = self.animation.as_mut() {
            self.factor = anim.advance(dt);
            if anim.is_finished() {
                self.animation = None;
            }
        }
    }

    fn calculate_delta(
        &self,
        source: SourceId,
        state:  &MotionState,
        _time:  f64,
        dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(rest) = self.rest.get(&source) else {
            return Ok(None);
        };
        let reference = *rest - self.center;
        let r = state.position - self.center;
        let gap = reference.length() * self.factor - r.length();
        // On the center the current direction is undefined; push back out
        // along the bound one.
        let dir = r.normalized().or_else(|| reference.normalized()).unwrap_or(Vec3::ZERO);
        let alpha = 1.0 - (-self.rate * dt).exp();
        Ok(Some(MotionDelta::position(dir * (gap * alpha))))
    }

    fn bind_group_center(&mut self, centroid: Vec3) {
        if !self.explicit_center {
            self.center = centroid;
        }
    }

    fn bind_sources(&mut self, sources: &[(SourceId, Vec3)]) {
        self.rest.extend(sources.iter().copied());
    }

    fn unbind_source(&mut self, source: SourceId) {
        self.rest.remove(&source);
    }
}
