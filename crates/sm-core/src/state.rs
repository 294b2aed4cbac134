//! Per-source motion state and the per-frame deltas applied to it.

use crate::{Orientation, Vec3};

/// Authoritative snapshot of one source.
///
/// Lives in the engine's source registry.  Components receive it by shared
/// reference and never write to it; only the engine's apply step does.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    pub position:    Vec3,
    pub orientation: Orientation,
    /// Spatial spread of the source, in renderer units (degrees for most
    /// renderers).
    pub aperture:    f64,
}

impl MotionState {
    /// A source at `position` with neutral orientation and zero aperture.
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    /// Apply every present channel of `delta`.  Absent channels are left as-is.
    pub fn apply(&mut self, delta: &MotionDelta) {
        if let Some(p) = delta.position {
            self.position += p;
        }
        if let Some(o) = delta.orientation {
            self.orientation += o;
        }
        if let Some(a) = delta.aperture {
            self.aperture += a;
        }
    }
}

/// Incremental change produced by one motion component (or the sum of several).
///
/// Each channel is `None` when the producer has no opinion about it.  This is
/// distinct from `Some(ZERO)`, which means "active, computed no
/// movement this frame".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotionDelta {
    pub position:    Option<Vec3>,
    pub orientation: Option<Orientation>,
    pub aperture:    Option<f64>,
}

impl MotionDelta {
    /// The empty delta: no channel present.
    pub const NONE: MotionDelta = MotionDelta {
        position:    None,
        orientation: None,
        aperture:    None,
    };

    /// A delta carrying only a position offset.
    #[inline]
    pub fn position(offset: Vec3) -> Self {
        Self { position: Some(offset), ..Self::NONE }
    }

    /// A delta carrying only an orientation offset.
    #[inline]
    pub fn orientation(offset: Orientation) -> Self {
        Self { orientation: Some(offset), ..Self::NONE }
    }

    /// A delta carrying only an aperture offset.
    #[inline]
    pub fn aperture(offset: f64) -> Self {
        Self { aperture: Some(offset), ..Self::NONE }
    }

    pub fn with_orientation(mut self, offset: Orientation) -> Self {
        self.orientation = Some(offset);
        self
    }

    /// `true` when no channel is present.
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.orientation.is_none() && self.aperture.is_none()
    }

    /// Add `other` into `self` channel by channel.  An absent channel on
    /// either side contributes nothing; present + present sums.
    pub fn accumulate(&mut self, other: &MotionDelta) {
        if let Some(p) = other.position {
            self.position = Some(self.position.unwrap_or_default() + p);
        }
        if let Some(o) = other.orientation {
            self.orientation = Some(self.orientation.unwrap_or_default() + o);
        }
        if let Some(a) = other.aperture {
            self.aperture = Some(self.aperture.unwrap_or_default() + a);
        }
    }

    /// Name of the first present channel holding a non-finite value, if any.
    pub fn non_finite_channel(&self) -> Option<&'static str> {
        if self.position.is_some_and(|p| !p.is_finite()) {
            return Some("position");
        }
        if self.orientation.is_some_and(|o| !o.is_finite()) {
            return Some("orientation");
        }
        if self.aperture.is_some_and(|a| !a.is_finite()) {
            return Some("aperture");
        }
        None
    }
}
