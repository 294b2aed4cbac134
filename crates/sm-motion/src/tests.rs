//! Unit tests for sm-motion.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

use sm_core::{ConfigError, MacroId, MotionState, Orientation, SourceId, Vec3};

use crate::{
    AlgorithmicRotation, ComponentFault, Concentration, Easing, Interpolation, Motion,
    MotionComponent, MovementMode, NoShared, ScalarAnimation, SeekState, Shape, SharedComponents,
    SourceMotion, Trajectory, ManualRotation,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const DT: f64 = 1.0 / 60.0;
const SRC: SourceId = SourceId(0);

/// Advance `c` one frame and apply its delta to `state`, the way the engine
/// does for a lone component.
fn step<M: Motion>(c: &mut M, state: &mut MotionState, time: f64, dt: f64) {
    c.begin_frame(time, dt);
    if let Some(d) = c.calculate_delta(SRC, state, time, dt).unwrap() {
        state.apply(&d);
    }
}

/// Macro table stand-in for aggregation tests.
struct Table(HashMap<(MacroId, String), MotionComponent>);

impl SharedComponents for Table {
    fn resolve(&self, owner: MacroId, key: &str) -> Option<&MotionComponent> {
        self.0.get(&(owner, key.to_owned()))
    }
}

// ── Easing ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod easing_tests {
    use super::*;

    #[test]
    fn endpoints_fixed_for_every_curve() {
        for e in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(e.apply(0.0), 0.0, "{e}");
            assert_eq!(e.apply(1.0), 1.0, "{e}");
        }
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-12);
        assert!(Easing::EaseIn.apply(0.25) < 0.25);
        assert!(Easing::EaseOut.apply(0.25) > 0.25);
    }

    #[test]
    fn parse_names() {
        assert_eq!("ease_in_out".parse::<Easing>().unwrap(), Easing::EaseInOut);
        assert!(matches!(
            "bouncy".parse::<Easing>(),
            Err(ConfigError::UnknownName { kind: "easing", .. })
        ));
    }

    #[test]
    fn animation_progresses_and_finishes() {
        let mut a = ScalarAnimation::new(1.0, 0.0, 1.0, Easing::Linear);
        assert!((a.advance(0.5) - 0.5).abs() < 1e-12);
        assert!(!a.is_finished());
        assert_eq!(a.advance(0.5), 0.0);
        assert!(a.is_finished());
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut a = ScalarAnimation::new(0.2, 0.9, 0.0, Easing::EaseIn);
        assert_eq!(a.advance(DT), 0.9);
        assert!(a.is_finished());
    }
}

// ── Concentration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod concentration_tests {
    use super::*;

    #[test]
    fn out_of_range_factor_rejected() {
        assert!(matches!(
            Concentration::new(1.2),
            Err(ConfigError::OutOfRange { param: "factor", .. })
        ));
        let mut c = Concentration::new(0.5).unwrap();
        assert!(c.set_factor(-0.1).is_err());
        assert_eq!(c.factor(), 0.5, "rejected value must not be clamped in");
    }

    /// A concentration that has recorded `at` as `SRC`'s rest position.
    fn bound(factor: f64, at: Vec3) -> Concentration {
        let mut c = Concentration::new(factor).unwrap();
        c.bind_sources(&[(SRC, at)]);
        c
    }

    fn run(c: &mut Concentration, state: &mut MotionState, frames: usize) {
        for i in 0..frames {
            step(c, state, i as f64 * DT, DT);
        }
    }

    #[test]
    fn factor_one_is_still() {
        let state = MotionState::at(Vec3::new(3.0, -2.0, 1.0));
        let c = bound(1.0, state.position);
        for _ in 0..10 {
            let d = c.calculate_delta(SRC, &state, 0.0, DT).unwrap().unwrap();
            assert!(d.position.unwrap().approx_eq(Vec3::ZERO, 1e-15));
        }
    }

    #[test]
    fn factor_zero_converges_to_center() {
        let center = Vec3::new(1.0, 1.0, 0.0);
        let mut state = MotionState::at(Vec3::new(6.0, -4.0, 2.0));
        let mut c = Concentration::new(0.0).unwrap().with_center(center);
        c.bind_sources(&[(SRC, state.position)]);
        let mut last = state.position.distance(center);
        for i in 0..120 {
            step(&mut c, &mut state, i as f64 * DT, DT);
            let d = state.position.distance(center);
            assert!(d < last, "frame {i}: distance did not shrink");
            last = d;
        }
        assert!(last < 1e-3, "still {last} from center after 2 s");
    }

    #[test]
    fn intermediate_factor_rests_at_fraction_of_radius() {
        let mut state = MotionState::at(Vec3::new(4.0, 0.0, 0.0));
        let mut c = bound(0.5, state.position);
        run(&mut c, &mut state, 600);
        assert!(state.position.approx_eq(Vec3::new(2.0, 0.0, 0.0), 1e-9), "{}", state.position);
        assert_eq!(c.rest_radius(SRC), Some(4.0));

        // Still there a second later: a level, not a slower collapse.
        run(&mut c, &mut state, 60);
        assert!(state.position.approx_eq(Vec3::new(2.0, 0.0, 0.0), 1e-9), "{}", state.position);
    }

    #[test]
    fn pull_then_toggle_back_restores_radius() {
        let start = Vec3::new(0.0, -3.0, 1.0);
        let mut state = MotionState::at(start);
        let mut c = bound(0.0, start);
        run(&mut c, &mut state, 600);
        assert!(state.position.length() < 1e-9, "{}", state.position);

        c.toggle();
        assert_eq!(c.factor(), 1.0);
        run(&mut c, &mut state, 600);
        assert!(state.position.approx_eq(start, 1e-9), "{}", state.position);
    }

    #[test]
    fn source_on_center_pushed_out_along_bound_direction() {
        let mut state = MotionState::at(Vec3::ZERO);
        let mut c = bound(1.0, Vec3::new(0.0, 2.0, 0.0));
        run(&mut c, &mut state, 600);
        assert!(state.position.approx_eq(Vec3::new(0.0, 2.0, 0.0), 1e-9), "{}", state.position);
    }

    #[test]
    fn unbound_source_gets_nothing() {
        let mut c = bound(0.0, Vec3::X);
        let state = MotionState::at(Vec3::X);
        assert_eq!(c.calculate_delta(SourceId(7), &state, 0.0, DT), Ok(None));
        assert!(c.calculate_delta(SRC, &state, 0.0, DT).unwrap().is_some());
        c.unbind_source(SRC);
        assert_eq!(c.calculate_delta(SRC, &state, 0.0, DT), Ok(None));
        assert_eq!(c.rest_radius(SRC), None);
    }

    #[test]
    fn toggle_is_involutive() {
        let mut c = Concentration::new(0.3).unwrap();
        c.toggle();
        assert_eq!(c.factor(), 1.0);
        c.toggle();
        assert_eq!(c.factor(), 0.3);
    }

    #[test]
    fn toggle_uses_configured_value() {
        let mut c = Concentration::new(1.0).unwrap().with_toggle_value(0.0).unwrap();
        c.toggle();
        assert_eq!(c.factor(), 0.0);
    }

    #[test]
    fn animation_runs_to_target() {
        let mut c = Concentration::new(1.0).unwrap();
        c.animate_to(0.0, 1.0, Easing::Linear).unwrap();
        assert!(c.status().animating);
        c.begin_frame(0.5, 0.5);
        assert!((c.factor() - 0.5).abs() < 1e-12);
        assert!(c.is_animating());
        c.begin_frame(1.0, 0.5);
        assert_eq!(c.factor(), 0.0);
        assert!(!c.is_animating());
    }

    #[test]
    fn set_factor_cancels_animation() {
        let mut c = Concentration::new(1.0).unwrap();
        c.animate_to(0.0, 2.0, Easing::EaseInOut).unwrap();
        c.set_factor(0.7).unwrap();
        assert!(!c.is_animating());
        c.begin_frame(0.0, 1.0);
        assert_eq!(c.factor(), 0.7);
    }

    #[test]
    fn disabled_yields_none() {
        let mut c = Concentration::new(0.0).unwrap();
        c.set_enabled(false);
        let state = MotionState::at(Vec3::X);
        assert_eq!(c.calculate_delta(SRC, &state, 0.0, DT), Ok(None));
        assert!(!c.status().enabled);
    }

    #[test]
    fn explicit_center_survives_group_binding() {
        let mut fixed = Concentration::new(0.0).unwrap().with_center(Vec3::Z);
        fixed.bind_group_center(Vec3::X);
        assert_eq!(fixed.center(), Vec3::Z);

        let mut floating = Concentration::new(0.0).unwrap();
        floating.bind_group_center(Vec3::X);
        assert_eq!(floating.center(), Vec3::X);
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trajectory_tests {
    use super::*;

    #[test]
    fn circle_quarter_turn_delta() {
        let mut t = Trajectory::new(Shape::circle(1.0).unwrap(), 0.25).unwrap();
        t.begin_frame(1.0, 1.0);
        let d = t.calculate_delta(SRC, &MotionState::default(), 1.0, 1.0).unwrap().unwrap();
        assert!(d.position.unwrap().approx_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut t = Trajectory::new(Shape::circle(2.0).unwrap(), 1.0).unwrap();
        let mut state = MotionState::at(Vec3::new(4.0, 0.0, 1.0));
        for i in 0..60 {
            step(&mut t, &mut state, i as f64 * DT, DT);
        }
        assert!(state.position.approx_eq(Vec3::new(4.0, 0.0, 1.0), 1e-9), "{}", state.position);
    }

    #[test]
    fn line_goes_out_and_back() {
        let mut t = Trajectory::new(Shape::line(Vec3::Y, 4.0).unwrap(), 0.5).unwrap();
        let mut state = MotionState::default();
        step(&mut t, &mut state, 1.0, 1.0);
        assert!(state.position.approx_eq(Vec3::new(0.0, 4.0, 0.0), 1e-12));
        step(&mut t, &mut state, 2.0, 1.0);
        assert!(state.position.approx_eq(Vec3::ZERO, 1e-12));
    }

    #[test]
    fn disabled_freezes_phase_and_resumes() {
        let mut c: MotionComponent = Trajectory::new(Shape::circle(1.0).unwrap(), 0.25).unwrap().into();
        c.begin_frame(1.0, 1.0);
        c.set_enabled(false);
        c.begin_frame(2.0, 1.0);
        assert_eq!(c.calculate_delta(SRC, &MotionState::default(), 2.0, 1.0), Ok(None));
        assert_eq!(c.as_trajectory_mut().unwrap().phase(), 0.25);

        c.set_enabled(true);
        c.begin_frame(3.0, 1.0);
        assert_eq!(c.as_trajectory_mut().unwrap().phase(), 0.5);
        let d = c.calculate_delta(SRC, &MotionState::default(), 3.0, 1.0).unwrap().unwrap();
        // (0,1,0) → (−1,0,0): one quarter step, no jump.
        assert!(d.position.unwrap().approx_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-12));
    }

    #[test]
    fn bounce_reflects_at_end() {
        let mut t = Trajectory::new(Shape::circle(1.0).unwrap(), 1.0)
            .unwrap()
            .with_mode(MovementMode::Bounce);
        t.begin_frame(0.75, 0.75);
        t.begin_frame(1.5, 0.75);
        assert!((t.phase() - 0.5).abs() < 1e-12);
        t.begin_frame(2.25, 0.25);
        assert!((t.phase() - 0.25).abs() < 1e-12, "moving backwards after the bounce");
    }

    #[test]
    fn bounce_folds_steps_longer_than_a_cycle() {
        let mut t = Trajectory::new(Shape::circle(1.0).unwrap(), 1.0)
            .unwrap()
            .with_mode(MovementMode::Bounce);
        // 0 → 1 → 0 → 1 → 0.5, heading back down.
        t.begin_frame(3.5, 3.5);
        assert!((t.phase() - 0.5).abs() < 1e-12);
        t.begin_frame(3.75, 0.25);
        assert!((t.phase() - 0.25).abs() < 1e-12);

        let mut fast = Trajectory::new(Shape::circle(1.0).unwrap(), 1e9)
            .unwrap()
            .with_mode(MovementMode::Bounce);
        fast.begin_frame(1.0, 1.0);
        assert!((0.0..=1.0).contains(&fast.phase()), "{}", fast.phase());
    }

    #[test]
    fn unknown_shape_name_rejected() {
        assert!(matches!(
            Shape::named("hexagon", 1.0),
            Err(ConfigError::UnknownName { kind: "shape", .. })
        ));
        assert_eq!(Shape::named("spiral", 2.0).unwrap().name(), "spiral");
    }

    #[test]
    fn non_finite_path_faults() {
        let mut t = Trajectory::new(Shape::custom(|p| Vec3::new(1.0 / (p - 0.5), 0.0, 0.0)), 0.5).unwrap();
        t.begin_frame(1.0, 1.0);
        // 1 / 0 at phase 0.5 is +inf.
        assert!(matches!(
            t.calculate_delta(SRC, &MotionState::default(), 1.0, 1.0),
            Err(ComponentFault::PathNotFinite { .. })
        ));
    }
}

// ── Rotation ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rotation_tests {
    use super::*;

    #[test]
    fn half_turn_about_origin() {
        let r = AlgorithmicRotation::yaw(PI).unwrap();
        let state = MotionState::at(Vec3::new(5.0, 0.0, 0.0));
        let d = r.calculate_delta(SRC, &state, 1.0, 1.0).unwrap().unwrap();
        assert!(d.position.unwrap().approx_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn source_on_pivot_gives_zero_delta() {
        let r = AlgorithmicRotation::yaw(1.0).unwrap().with_pivot(Vec3::Z);
        let d = r.calculate_delta(SRC, &MotionState::at(Vec3::Z), 0.0, DT).unwrap().unwrap();
        assert_eq!(d.position, Some(Vec3::ZERO));
    }

    #[test]
    fn rotation_is_periodic() {
        let mut r = AlgorithmicRotation::yaw(PI).unwrap().with_pivot(Vec3::new(1.0, 1.0, 0.0));
        let start = Vec3::new(4.0, -1.0, 2.0);
        let mut state = MotionState::at(start);
        // 2π / π = 2 s at 60 fps.
        for i in 0..120 {
            step(&mut r, &mut state, i as f64 * DT, DT);
        }
        assert!(state.position.approx_eq(start, 1e-9), "{}", state.position);
    }

    #[test]
    fn manual_baseline_frame_contributes_nothing() {
        let mut m = ManualRotation::new(1.0, Interpolation::Linear).unwrap();
        m.set_target(Orientation::new(1.0, 0.0, 0.0)).unwrap();
        m.begin_frame(0.0, DT);
        assert_eq!(m.calculate_delta(SRC, &MotionState::at(Vec3::X), 0.0, DT), Ok(None));
        assert_eq!(m.current(), Orientation::ZERO);
    }

    #[test]
    fn manual_converges_monotonically_then_idles() {
        let mut m = ManualRotation::new(1.0, Interpolation::Linear).unwrap();
        let target = Orientation::new(FRAC_PI_2, 0.0, 0.0);
        m.set_target(target).unwrap();
        assert_eq!(m.state(), SeekState::Seeking);

        let mut state = MotionState::at(Vec3::new(2.0, 0.0, 0.0));
        let mut dist = (target - m.current()).max_abs();
        for i in 0..40 {
            step(&mut m, &mut state, i as f64 * 0.1, 0.1);
            let now = (target - m.current()).max_abs();
            assert!(now <= dist, "frame {i}: moved away from target");
            dist = now;
        }
        assert_eq!(m.state(), SeekState::Idle);
        assert_eq!(m.current(), target);
        assert!(state.position.approx_eq(Vec3::new(0.0, 2.0, 0.0), 1e-9), "{}", state.position);
        assert!((state.orientation.yaw - FRAC_PI_2).abs() < 1e-12);

        m.begin_frame(5.0, 0.1);
        let d = m.calculate_delta(SRC, &state, 5.0, 0.1).unwrap().unwrap();
        assert!(d.position.unwrap().approx_eq(Vec3::ZERO, 1e-15));
    }

    #[test]
    fn exponential_approaches_target() {
        let mut m = ManualRotation::new(5.0, Interpolation::Exponential).unwrap();
        m.set_target(Orientation::new(0.0, 1.0, 0.0)).unwrap();
        let mut state = MotionState::at(Vec3::Y);
        for i in 0..200 {
            step(&mut m, &mut state, i as f64 * DT, DT);
        }
        assert_eq!(m.state(), SeekState::Idle);
        assert!(state.position.approx_eq(Orientation::new(0.0, 1.0, 0.0).rotate(Vec3::Y), 1e-6));
    }

    #[test]
    fn retarget_keeps_progress() {
        let mut m = ManualRotation::new(1.0, Interpolation::Linear).unwrap();
        m.set_target(Orientation::new(2.0, 0.0, 0.0)).unwrap();
        let mut state = MotionState::at(Vec3::X);
        for i in 0..6 {
            step(&mut m, &mut state, i as f64 * 0.1, 0.1);
        }
        let reached = m.current();
        assert!((reached.yaw - 0.5).abs() < 1e-12);
        m.set_target(Orientation::new(-1.0, 0.0, 0.0)).unwrap();
        assert_eq!(m.current(), reached);
        m.begin_frame(1.0, 0.1);
        assert!((m.current().yaw - 0.4).abs() < 1e-12);
    }

    #[test]
    fn reenable_reestablishes_baseline() {
        let mut m = ManualRotation::new(1.0, Interpolation::Linear).unwrap();
        m.begin_frame(0.0, DT);
        m.set_target(Orientation::new(1.0, 0.0, 0.0)).unwrap();
        m.set_enabled(false);
        m.set_enabled(true);
        m.begin_frame(DT, DT);
        assert_eq!(m.calculate_delta(SRC, &MotionState::at(Vec3::X), DT, DT), Ok(None));
    }
}

// ── SourceMotion ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod source_motion_tests {
    use super::*;

    fn spinner() -> AlgorithmicRotation {
        AlgorithmicRotation::yaw(1.0).unwrap()
    }

    fn puller(id: SourceId, rest: Vec3) -> Concentration {
        let mut c = Concentration::new(0.2).unwrap();
        c.bind_sources(&[(id, rest)]);
        c
    }

    #[test]
    fn aggregation_ignores_insertion_order() {
        let state = MotionState::at(Vec3::new(3.0, 1.0, 0.0));

        let mut ab = SourceMotion::new(SourceId(0));
        ab.insert("spin", spinner());
        ab.insert("pull", puller(SourceId(0), state.position));

        let mut ba = SourceMotion::new(SourceId(0));
        ba.insert("pull", puller(SourceId(0), state.position));
        ba.insert("spin", spinner());

        let x = ab.aggregate(&state, 0.0, DT, &NoShared);
        let y = ba.aggregate(&state, 0.0, DT, &NoShared);
        assert_eq!(x.delta, y.delta);
        assert_eq!(x.contributions, 2);
    }

    #[test]
    fn channel_sum_matches_individual_deltas() {
        let state = MotionState::at(Vec3::new(-2.0, 5.0, 1.0));
        let parts: [MotionComponent; 3] = [
            spinner().into(),
            puller(SourceId(1), Vec3::new(-4.0, 10.0, 2.0)).into(),
            AlgorithmicRotation::new(Orientation::new(0.0, 0.5, 0.0)).unwrap().into(),
        ];
        let mut sm = SourceMotion::new(SourceId(1));
        let mut expected = Vec3::ZERO;
        for (i, p) in parts.iter().enumerate() {
            let d = p.calculate_delta(SourceId(1), &state, 0.0, DT).unwrap().unwrap();
            expected += d.position.unwrap();
            sm.insert(&format!("c{i}"), p.clone());
        }
        let agg = sm.aggregate(&state, 0.0, DT, &NoShared);
        assert!(agg.delta.position.unwrap().approx_eq(expected, 1e-12));
    }

    #[test]
    fn disabled_only_component_leaves_channel_absent() {
        let mut sm = SourceMotion::new(SourceId(0));
        let mut c = puller(SourceId(0), Vec3::X);
        c.set_enabled(false);
        sm.insert("pull", c);
        let agg = sm.aggregate(&MotionState::at(Vec3::X), 0.0, DT, &NoShared);
        assert_eq!(agg.delta.position, None);
        assert_eq!(agg.contributions, 0);
    }

    #[test]
    fn zero_contribution_is_present() {
        let mut sm = SourceMotion::new(SourceId(0));
        let mut still = Concentration::new(1.0).unwrap();
        still.bind_sources(&[(SourceId(0), Vec3::X)]);
        sm.insert("still", still);
        let agg = sm.aggregate(&MotionState::at(Vec3::X), 0.0, DT, &NoShared);
        assert!(agg.delta.position.is_some());
        assert_eq!(agg.contributions, 1);
    }

    #[test]
    fn radial_level_composes_with_rotation() {
        let id = SourceId(2);
        let mut sm = SourceMotion::new(id);
        sm.insert("spin", spinner());
        let mut half = Concentration::new(0.5).unwrap();
        half.bind_sources(&[(id, Vec3::new(2.0, 0.0, 0.0))]);
        sm.insert("pull", half);

        let mut state = MotionState::at(Vec3::new(2.0, 0.0, 0.0));
        for i in 0..600 {
            let agg = sm.aggregate(&state, i as f64 * DT, DT, &NoShared);
            state.apply(&agg.delta);
        }
        assert!((state.position.length() - 1.0).abs() < 1e-6, "{}", state.position);
        // Ten seconds at 1 rad/s; the pull only lags the angle slightly.
        let turned = state.position.y.atan2(state.position.x);
        let expected = 10.0f64.sin().atan2(10.0f64.cos());
        assert!((turned - expected).abs() < 0.05, "{turned} vs {expected}");
    }

    #[test]
    fn faulting_component_is_skipped_others_continue() {
        let mut sm = SourceMotion::new(SourceId(9));
        let mut bad = Trajectory::new(Shape::custom(|_| Vec3::new(f64::NAN, 0.0, 0.0)), 1.0).unwrap();
        bad.begin_frame(0.0, DT);
        sm.insert("bad", bad);
        sm.insert("spin", spinner());

        let state = MotionState::at(Vec3::X);
        let agg = sm.aggregate(&state, 0.0, DT, &NoShared);
        assert_eq!(agg.faults, 1);
        assert_eq!(agg.contributions, 1);
        assert!(agg.delta.position.unwrap().is_finite());
        // Still installed; faults again next frame.
        assert!(sm.get("bad").is_some());
        assert_eq!(sm.aggregate(&state, DT, DT, &NoShared).faults, 1);
    }

    #[test]
    fn shared_handles_resolve_through_table() {
        let owner = MacroId(3);
        let mut table = Table(HashMap::new());
        table.0.insert((owner, "spin".to_owned()), spinner().into());

        let mut sm = SourceMotion::new(SourceId(0));
        sm.insert_shared("spin", owner);
        sm.insert_shared("missing", owner);

        let state = MotionState::at(Vec3::X);
        let agg = sm.aggregate(&state, 0.0, DT, &table);
        assert_eq!(agg.contributions, 1);
        assert!(sm.local_mut("spin").is_none(), "shared slots are not locally mutable");

        assert_eq!(sm.remove_shared_from(owner), 2);
        assert!(sm.is_empty());
    }

    #[test]
    fn replacing_keeps_position() {
        let mut sm = SourceMotion::new(SourceId(0));
        sm.insert("a", spinner());
        sm.insert("b", puller(SourceId(0), Vec3::X));
        assert!(sm.insert("a", puller(SourceId(0), Vec3::X)).is_some());
        assert_eq!(sm.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(sm.remove("a").is_some());
        assert_eq!(sm.keys().collect::<Vec<_>>(), ["b"]);
    }
}
