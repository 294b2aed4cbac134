//! The `Motion` trait and the closed set of motion components.

use sm_core::{MotionDelta, MotionState, SourceId, Vec3};

use crate::{
    AlgorithmicRotation, ComponentResult, Concentration, MacroTrajectory, ManualRotation,
    Trajectory,
};

/// One pluggable contribution to a source's movement.
///
/// # Contract
///
/// - [`begin_frame`][Self::begin_frame] is called exactly once per frame per
///   instance, and only while enabled.  It is the only place internal
///   progress (phase, animated factor, current orientation) may change.
/// - [`calculate_delta`][Self::calculate_delta] is pure with respect to both
///   `self` and `state`.  A shared macro component answers it once for each
///   member in the same frame, so it must not depend on call order.
/// - Disabled ⇒ `calculate_delta` returns `Ok(None)`.
/// - Must not block or perform I/O.
pub trait Motion {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Advance internal progress by one frame.
    fn begin_frame(&mut self, _time: f64, _dt: f64) {}

    /// Contribution for `source`, whose current state is `state`, or `None`
    /// for "no opinion this frame".
    fn calculate_delta(
        &self,
        source: SourceId,
        state:  &MotionState,
        time:   f64,
        dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>>;

    /// Receive the group reference point when installed on a macro.
    ///
    /// Components with an explicitly configured center or pivot ignore it.
    fn bind_group_center(&mut self, _centroid: Vec3) {}

    /// Record the current position of each source the component now acts
    /// on.  Called on install and whenever a macro gains a member.
    fn bind_sources(&mut self, _sources: &[(SourceId, Vec3)]) {}

    /// Forget `source`; it no longer refers to this component.
    fn unbind_source(&mut self, _source: SourceId) {}
}

// ── ComponentKind ─────────────────────────────────────────────────────────────

/// Discriminant of [`MotionComponent`], used in logs and error messages.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ComponentKind {
    Concentration,
    Trajectory,
    MacroTrajectory,
    AlgorithmicRotation,
    ManualRotation,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Concentration       => "concentration",
            ComponentKind::Trajectory          => "trajectory",
            ComponentKind::MacroTrajectory     => "macro_trajectory",
            ComponentKind::AlgorithmicRotation => "algorithmic_rotation",
            ComponentKind::ManualRotation      => "manual_rotation",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MotionComponent ───────────────────────────────────────────────────────────

/// Every motion component the engine can install, as one closed enum.
///
/// The variant is chosen when the component is configured; the engine never
/// probes capabilities at runtime.  Typed access for variant-specific
/// commands (set factor, set rotation target) goes through the `as_*`
/// accessors.
#[derive(Clone, Debug)]
pub enum MotionComponent {
    Concentration(Concentration),
    Trajectory(Trajectory),
    MacroTrajectory(MacroTrajectory),
    AlgorithmicRotation(AlgorithmicRotation),
    ManualRotation(ManualRotation),
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            MotionComponent::Concentration($c)       => $body,
            MotionComponent::Trajectory($c)          => $body,
            MotionComponent::MacroTrajectory($c)     => $body,
            MotionComponent::AlgorithmicRotation($c) => $body,
            MotionComponent::ManualRotation($c)      => $body,
        }
    };
}

impl MotionComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            MotionComponent::Concentration(_)       => ComponentKind::Concentration,
            MotionComponent::Trajectory(_)          => ComponentKind::Trajectory,
            MotionComponent::MacroTrajectory(_)     => ComponentKind::MacroTrajectory,
            MotionComponent::AlgorithmicRotation(_) => ComponentKind::AlgorithmicRotation,
            MotionComponent::ManualRotation(_)      => ComponentKind::ManualRotation,
        }
    }

    pub fn as_concentration(&self) -> Option<&Concentration> {
        match self {
            MotionComponent::Concentration(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_concentration_mut(&mut self) -> Option<&mut Concentration> {
        match self {
            MotionComponent::Concentration(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_manual_rotation_mut(&mut self) -> Option<&mut ManualRotation> {
        match self {
            MotionComponent::ManualRotation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_trajectory_mut(&mut self) -> Option<&mut Trajectory> {
        match self {
            MotionComponent::Trajectory(t) => Some(t),
            MotionComponent::MacroTrajectory(m) => Some(m.trajectory_mut()),
            _ => None,
        }
    }
}

impl Motion for MotionComponent {
    fn is_enabled(&self) -> bool {
        dispatch!(self, c => c.is_enabled())
    }

    fn set_enabled(&mut self, enabled: bool) {
        dispatch!(self, c => c.set_enabled(enabled))
    }

    fn begin_frame(&mut self, time: f64, dt: f64) {
        if self.is_enabled() {
            dispatch!(self, c => c.begin_frame(time, dt))
        }
    }

    fn calculate_delta(
        &self,
        source: SourceId,
        state:  &MotionState,
        time:   f64,
        dt:     f64,
    ) -> ComponentResult<Option<MotionDelta>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        dispatch!(self, c => c.calculate_delta(source, state, time, dt))
    }

    fn bind_group_center(&mut self, centroid: Vec3) {
        dispatch!(self, c => c.bind_group_center(centroid))
    }

    fn bind_sources(&mut self, sources: &[(SourceId, Vec3)]) {
        dispatch!(self, c => c.bind_sources(sources))
    }

    fn unbind_source(&mut self, source: SourceId) {
        dispatch!(self, c => c.unbind_source(source))
    }
}

impl From<Concentration> for MotionComponent {
    fn from(c: Concentration) -> Self {
        MotionComponent::Concentration(c)
    }
}

impl From<Trajectory> for MotionComponent {
    fn from(t: Trajectory) -> Self {
        MotionComponent::Trajectory(t)
    }
}

impl From<MacroTrajectory> for MotionComponent {
    fn from(m: MacroTrajectory) -> Self {
        MotionComponent::MacroTrajectory(m)
    }
}

impl From<AlgorithmicRotation> for MotionComponent {
    fn from(r: AlgorithmicRotation) -> Self {
        MotionComponent::AlgorithmicRotation(r)
    }
}

impl From<ManualRotation> for MotionComponent {
    fn from(r: ManualRotation) -> Self {
        MotionComponent::ManualRotation(r)
    }
}
