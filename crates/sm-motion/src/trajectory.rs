//! Parametric path following, for one source or a whole macro.
//!
//! # Phase
//!
//! Progress along a path is a scalar `phase` measured in cycles and advanced
//! by `speed · dt` each frame.  Built-in shapes are periodic in phase with
//! period 1, so `Fix` mode loops without a seam:
//!
//! | Shape    | Point at phase `p` (relative to center)                       |
//! |----------|---------------------------------------------------------------|
//! | `Circle` | `radius · (cos 2πp, sin 2πp, 0)`                              |
//! | `Line`   | `direction · length · tri(p)`, out and back                   |
//! | `Spiral` | radius `r0 → r1` and angle `0 → 2π·turns` along `tri(p)`      |
//! | `Custom` | caller function of the unwrapped phase                        |
//!
//! where `tri` is the unit triangle wave (0 → 1 → 0 over one cycle).
//!
//! The emitted delta is `point(new) − point(old)`, never an absolute
//! position, so a trajectory composes additively with any other component.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use sm_core::error::{require_finite, require_non_negative};
use sm_core::{ConfigError, ConfigResult, MotionDelta, MotionState, SourceId, Vec3};

use crate::{ComponentFault, ComponentResult, Motion};

/// Caller-supplied path: phase (cycles) → offset from the trajectory center.
pub type PathFn = Arc<dyn Fn(f64) -> Vec3 + Send + Sync>;

// ── Shape ─────────────────────────────────────────────────────────────────────

/// Geometry of a trajectory.
#[derive(Clone)]
pub enum Shape {
    Circle { radius: f64 },
    Line { direction: Vec3, length: f64 },
    Spiral { start_radius: f64, end_radius: f64, turns: f64 },
    Custom(PathFn),
}

impl Shape {
    pub fn circle(radius: f64) -> ConfigResult<Shape> {
        Ok(Shape::Circle { radius: require_non_negative("radius", radius)? })
    }

    /// Out-and-back segment from the center along `direction`.
    pub fn line(direction: Vec3, length: f64) -> ConfigResult<Shape> {
        let direction = direction
            .normalized()
            .ok_or_else(|| ConfigError::Invalid("line direction must be non-zero".into()))?;
        Ok(Shape::Line { direction, length: require_non_negative("length", length)? })
    }

    pub fn spiral(start_radius: f64, end_radius: f64, turns: f64) -> ConfigResult<Shape> {
        Ok(Shape::Spiral {
            start_radius: require_non_negative("start_radius", start_radius)?,
            end_radius:   require_non_negative("end_radius", end_radius)?,
            turns:        require_finite("turns", turns)?,
        })
    }

    pub fn custom<F>(f: F) -> Shape
    where
        F: Fn(f64) -> Vec3 + Send + Sync + 'static,
    {
        Shape::Custom(Arc::new(f))
    }

    /// Build a built-in shape from its name and a single size parameter:
    /// radius for `circle`, length along +x for `line`, end radius for a
    /// three-turn `spiral` starting at the center.
    pub fn named(name: &str, size: f64) -> ConfigResult<Shape> {
        match name {
            "circle" => Shape::circle(size),
            "line"   => Shape::line(Vec3::X, size),
            "spiral" => Shape::spiral(0.0, size, 3.0),
            other => Err(ConfigError::UnknownName { kind: "shape", name: other.to_owned() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Line { .. }   => "line",
            Shape::Spiral { .. } => "spiral",
            Shape::Custom(_)     => "custom",
        }
    }

    /// Offset from the center at `phase`.
    pub fn point_at(&self, phase: f64) -> Vec3 {
        match self {
            Shape::Circle { radius } => {
                let (s, c) = (TAU * phase.rem_euclid(1.0)).sin_cos();
                Vec3::new(c * radius, s * radius, 0.0)
            }
            Shape::Line { direction, length } => *direction * (length * triangle(phase)),
            Shape::Spiral { start_radius, end_radius, turns } => {
                let s = triangle(phase);
                let r = start_radius + (end_radius - start_radius) * s;
                let (sn, cs) = (TAU * turns * s).sin_cos();
                Vec3::new(cs * r, sn * r, 0.0)
            }
            Shape::Custom(f) => f(phase),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle { radius } => f.debug_struct("Circle").field("radius", radius).finish(),
            Shape::Line { direction, length } => f
                .debug_struct("Line")
                .field("direction", direction)
                .field("length", length)
                .finish(),
            Shape::Spiral { start_radius, end_radius, turns } => f
                .debug_struct("Spiral")
                .field("start_radius", start_radius)
                .field("end_radius", end_radius)
                .field("turns", turns)
                .finish(),
            Shape::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Unit triangle wave: 0 at integer phase, 1 at half-integer.
fn triangle(phase: f64) -> f64 {
    let p = phase.rem_euclid(1.0);
    if p < 0.5 { 2.0 * p } else { 2.0 - 2.0 * p }
}

// ── MovementMode ──────────────────────────────────────────────────────────────

/// How phase evolves over time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum MovementMode {
    /// Constant speed, looping forever.
    #[default]
    Fix,
    /// Constant speed within `[0, 1]`, reversing direction at either end.
    Bounce,
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// Moves one source along a [`Shape`].
#[derive(Clone, Debug)]
pub struct Trajectory {
    enabled:    bool,
    shape:      Shape,
    center:     Vec3,
    mode:       MovementMode,
    /// Cycles per second.  Negative runs the path backwards.
    speed:      f64,
    phase:      f64,
    prev_phase: f64,
    /// +1 or −1; only flips in `Bounce` mode.
    direction:  f64,
}

impl Trajectory {
    pub fn new(shape: Shape, speed: f64) -> ConfigResult<Self> {
        Ok(Self {
            enabled:    true,
            shape,
            center:     Vec3::ZERO,
            mode:       MovementMode::Fix,
            speed:      require_finite("speed", speed)?,
            phase:      0.0,
            prev_phase: 0.0,
            direction:  1.0,
        })
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_mode(mut self, mode: MovementMode) -> Self {
        self.mode = mode;
        self
    }

    /// Start at `phase` instead of 0.  In `Bounce` mode it must lie in `[0, 1]`.
    pub fn with_phase(mut self, phase: f64) -> ConfigResult<Self> {
        require_finite("phase", phase)?;
        if self.mode == MovementMode::Bounce {
            sm_core::error::require_range("phase", phase, 0.0, 1.0)?;
        }
        self.phase = phase;
        self.prev_phase = phase;
        Ok(self)
    }

    pub fn set_speed(&mut self, speed: f64) -> ConfigResult<()> {
        self.speed = require_finite("speed", speed)?;
        Ok(())
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    /// Absolute point on the path at the current phase.
    pub fn current_point(&self) -> Vec3 {
        self.center + self.shape.point_at(self.phase)
    }
}

impl Motion for Trajectory {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn begin_frame(&mut self, _time: f64, dt: f64) {
        self.prev_phase = self.phase;
        let step = self.speed * dt;
        match self.mode {
            MovementMode::Fix => self.phase += step,
            MovementMode::Bounce => {
                // Fold the unreflected phase onto [0, 1]: even half-periods
                // run forwards, odd ones backwards.
                let m = (self.phase + self.direction * step).rem_euclid(2.0);
                if m > 1.0 {
                    self.phase = 2.0 - m;
                    self.direction = -self.direction;
                } else {
                    self.phase = m;
                }
            }
        }
    }

    fn calculate_delta(
        &self,
        _source: SourceId,
        _state:  &MotionState,
        _time:   f64,
        _dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        if !self.enabled {
            return Ok(None);
        }
        let new = self.shape.point_at(self.phase);
        if !new.is_finite() {
            return Err(ComponentFault::PathNotFinite { phase: self.phase });
        }
        let old = self.shape.point_at(self.prev_phase);
        if !old.is_finite() {
            return Err(ComponentFault::PathNotFinite { phase: self.prev_phase });
        }
        Ok(Some(MotionDelta::position(new - old)))
    }
}

// ── MacroTrajectory ───────────────────────────────────────────────────────────

/// A [`Trajectory`] owned by a macro and shared by every member.
///
/// The macro runs `begin_frame` once per frame on the single instance, so
/// every member receives the same phase step in the same frame and the group
/// traces congruent copies of one path, each offset by where that member sat
/// relative to the centroid.
#[derive(Clone, Debug)]
pub struct MacroTrajectory {
    inner: Trajectory,
}

impl MacroTrajectory {
    pub fn new(trajectory: Trajectory) -> Self {
        Self { inner: trajectory }
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.inner
    }

    pub fn trajectory_mut(&mut self) -> &mut Trajectory {
        &mut self.inner
    }
}

impl Motion for MacroTrajectory {
    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    fn begin_frame(&mut self, time: f64, dt: f64) {
        self.inner.begin_frame(time, dt);
    }

    fn calculate_delta(
        &self,
        source: SourceId,
        state:  &MotionState,
        time:   f64,
        dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        self.inner.calculate_delta(source, state, time, dt)
    }
}
