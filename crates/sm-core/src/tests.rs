//! Unit tests for sm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{MacroId, SourceId};

    #[test]
    fn index_roundtrip() {
        let id = SourceId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(SourceId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(SourceId::INVALID.0, u32::MAX);
        assert_eq!(MacroId::default(), MacroId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(SourceId(7).to_string(), "SourceId(7)");
    }
}

#[cfg(test)]
mod vec3 {
    use crate::Vec3;

    #[test]
    fn arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(a + b, Vec3::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Vec3::new(0.5, 3.0, 1.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn centroid_of_line() {
        let pts = [Vec3::new(-2.0, 0.0, 0.0), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(Vec3::centroid(pts), Some(Vec3::ZERO));
        assert_eq!(Vec3::centroid(std::iter::empty::<Vec3>()), None);
        assert!((Vec3::mean_distance(&pts, Vec3::ZERO) - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_zero_is_none() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(3.0, 4.0, 0.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod orientation {
    use std::f64::consts::{FRAC_PI_2, PI};

    use crate::{Orientation, Vec3};

    #[test]
    fn yaw_half_turn() {
        let r = Orientation::new(PI, 0.0, 0.0).rotate(Vec3::new(5.0, 0.0, 0.0));
        assert!(r.approx_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-12), "got {r}");
    }

    #[test]
    fn single_axis_quarter_turns() {
        let y = Orientation::new(FRAC_PI_2, 0.0, 0.0).rotate(Vec3::X);
        assert!(y.approx_eq(Vec3::Y, 1e-12));
        let p = Orientation::new(0.0, FRAC_PI_2, 0.0).rotate(Vec3::Y);
        assert!(p.approx_eq(Vec3::Z, 1e-12));
        let r = Orientation::new(0.0, 0.0, FRAC_PI_2).rotate(Vec3::Z);
        assert!(r.approx_eq(Vec3::X, 1e-12));
    }

    #[test]
    fn rotation_preserves_length() {
        let v = Vec3::new(1.0, -2.0, 0.5);
        let r = Orientation::new(0.3, -1.1, 2.0).rotate(v);
        assert!((r.length() - v.length()).abs() < 1e-12);
    }
}

#[cfg(test)]
mod state {
    use crate::{MotionDelta, MotionState, Orientation, Vec3};

    #[test]
    fn absent_channels_do_not_touch_state() {
        let mut s = MotionState::at(Vec3::new(1.0, 1.0, 1.0));
        s.aperture = 30.0;
        s.apply(&MotionDelta::NONE);
        assert_eq!(s.position, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(s.aperture, 30.0);
    }

    #[test]
    fn accumulate_is_per_channel() {
        let mut acc = MotionDelta::NONE;
        acc.accumulate(&MotionDelta::position(Vec3::X));
        acc.accumulate(&MotionDelta::aperture(2.0));
        acc.accumulate(&MotionDelta::position(Vec3::Y));
        assert_eq!(acc.position, Some(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(acc.aperture, Some(2.0));
        assert_eq!(acc.orientation, None);
    }

    #[test]
    fn zero_delta_is_present() {
        let mut acc = MotionDelta::NONE;
        acc.accumulate(&MotionDelta::position(Vec3::ZERO));
        assert_eq!(acc.position, Some(Vec3::ZERO));
        assert!(!acc.is_empty());
    }

    #[test]
    fn non_finite_detected() {
        let d = MotionDelta::orientation(Orientation::new(f64::NAN, 0.0, 0.0));
        assert_eq!(d.non_finite_channel(), Some("orientation"));
        assert_eq!(MotionDelta::position(Vec3::X).non_finite_channel(), None);
    }
}

#[cfg(test)]
mod time {
    use crate::{FrameIndex, SimClock};

    #[test]
    fn clock_accumulates_variable_dt() {
        let mut clock = SimClock::new(60.0);
        assert!((clock.default_dt() - 1.0 / 60.0).abs() < 1e-15);
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.frame, FrameIndex(2));
        assert!((clock.elapsed_secs - 0.75).abs() < 1e-15);
    }

    #[test]
    fn frame_arithmetic() {
        assert_eq!(FrameIndex(3) + 2, FrameIndex(5));
        assert_eq!(FrameIndex(9).since(FrameIndex(4)), 5);
    }
}

#[cfg(test)]
mod config {
    use crate::{ConfigError, EngineConfig};

    #[test]
    fn default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = EngineConfig { max_sources: 0, ..EngineConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { param: "max_sources", .. })));
    }

    #[test]
    fn nan_frame_rate_rejected() {
        let cfg = EngineConfig { frame_rate: f64::NAN, ..EngineConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NonFinite { param: "frame_rate" }));
    }
}

#[cfg(test)]
mod rng {
    use crate::{FormationRng, MacroId};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = FormationRng::new(12345, MacroId(0));
        let mut r2 = FormationRng::new(12345, MacroId(0));
        for _ in 0..100 {
            assert_eq!(r1.symmetric(1.0), r2.symmetric(1.0));
        }
    }

    #[test]
    fn symmetric_in_bounds() {
        let mut rng = FormationRng::new(0, MacroId(3));
        for _ in 0..1000 {
            let v = rng.symmetric(2.5);
            assert!((-2.5..=2.5).contains(&v));
        }
        assert_eq!(rng.symmetric(0.0), 0.0);
    }
}
