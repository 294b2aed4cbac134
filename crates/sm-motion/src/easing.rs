//! Easing curves and the small state machine that animates one scalar.

use std::str::FromStr;

use sm_core::ConfigError;

// ── Easing ────────────────────────────────────────────────────────────────────

/// Shape of an animated transition, mapping normalized time `t ∈ [0, 1]` to
/// normalized progress.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic, slow start.
    EaseIn,
    /// Quadratic, slow finish.
    EaseOut,
    /// Quadratic, slow start and finish.
    EaseInOut,
}

impl Easing {
    /// Progress at normalized time `t` (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear    => t,
            Easing::EaseIn    => t * t,
            Easing::EaseOut   => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Easing::Linear    => "linear",
            Easing::EaseIn    => "ease_in",
            Easing::EaseOut   => "ease_out",
            Easing::EaseInOut => "ease_in_out",
        }
    }
}

impl FromStr for Easing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear"      => Ok(Easing::Linear),
            "ease_in"     => Ok(Easing::EaseIn),
            "ease_out"    => Ok(Easing::EaseOut),
            "ease_in_out" => Ok(Easing::EaseInOut),
            other => Err(ConfigError::UnknownName { kind: "easing", name: other.to_owned() }),
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ScalarAnimation ───────────────────────────────────────────────────────────

/// An in-flight transition of one scalar from `from` to `to`.
///
/// The steady-state value lives in the owner; this struct only exists while a
/// transition is running and is dropped once [`is_finished`][Self::is_finished].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScalarAnimation {
    from:     f64,
    to:       f64,
    elapsed:  f64,
    duration: f64,
    easing:   Easing,
}

impl ScalarAnimation {
    /// `duration` must be non-negative; zero completes on the first advance.
    pub fn new(from: f64, to: f64, duration: f64, easing: Easing) -> Self {
        Self { from, to, elapsed: 0.0, duration, easing }
    }

    /// Step by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt;
        self.value()
    }

    /// Value at the current elapsed time.
    pub fn value(&self) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = self.elapsed / self.duration;
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    /// `true` once the full duration has elapsed.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }
}
