//! Yaw/pitch/roll orientation and the composed rotation it describes.
//!
//! # Axis convention
//!
//! ```text
//!   yaw  : about z (up),    positive turns +x toward +y
//!   pitch: about x (right), positive turns +y toward +z
//!   roll : about y (front), positive turns +z toward +x
//!
//!   R = Rz(yaw) · Rx(pitch) · Ry(roll)
//! ```
//!
//! Angles are radians.  Single-axis rotations are exact; the composed form is
//! what both rotation components use, so results agree between them.

use std::ops::{Add, AddAssign, Sub};

use crate::Vec3;

/// Euler orientation in radians.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orientation {
    pub yaw:   f64,
    pub pitch: f64,
    pub roll:  f64,
}

impl Orientation {
    pub const ZERO: Orientation = Orientation { yaw: 0.0, pitch: 0.0, roll: 0.0 };

    #[inline]
    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Rotate `v` by this orientation.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // Ry(roll)
        let (sr, cr) = self.roll.sin_cos();
        let v = Vec3::new(v.x * cr + v.z * sr, v.y, -v.x * sr + v.z * cr);
        // Rx(pitch)
        let (sp, cp) = self.pitch.sin_cos();
        let v = Vec3::new(v.x, v.y * cp - v.z * sp, v.y * sp + v.z * cp);
        // Rz(yaw)
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(v.x * cy - v.y * sy, v.x * sy + v.y * cy, v.z)
    }

    /// Largest absolute per-axis angle.  Used as the angular distance between
    /// two orientations when seeking a target.
    pub fn max_abs(self) -> f64 {
        self.yaw.abs().max(self.pitch.abs()).max(self.roll.abs())
    }

    #[inline]
    pub fn scale(self, k: f64) -> Orientation {
        Orientation::new(self.yaw * k, self.pitch * k, self.roll * k)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    /// `(yaw, pitch, roll)` narrowed for the wire.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.yaw as f32, self.pitch as f32, self.roll as f32]
    }
}

impl Add for Orientation {
    type Output = Orientation;
    #[inline]
    fn add(self, rhs: Orientation) -> Orientation {
        Orientation::new(self.yaw + rhs.yaw, self.pitch + rhs.pitch, self.roll + rhs.roll)
    }
}

impl AddAssign for Orientation {
    #[inline]
    fn add_assign(&mut self, rhs: Orientation) {
        *self = *self + rhs;
    }
}

impl Sub for Orientation {
    type Output = Orientation;
    #[inline]
    fn sub(self, rhs: Orientation) -> Orientation {
        Orientation::new(self.yaw - rhs.yaw, self.pitch - rhs.pitch, self.roll - rhs.roll)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ypr({:.4}, {:.4}, {:.4})", self.yaw, self.pitch, self.roll)
    }
}
