//! Formation generators: initial layouts for macros created from a count.
//!
//! # Built-ins
//!
//! | Name     | Layout (around `center`)                                      |
//! |----------|---------------------------------------------------------------|
//! | `line`   | along +x, `spacing` apart, centered                           |
//! | `circle` | horizontal ring of `radius`, first source on +x               |
//! | `grid`   | square-ish horizontal grid, `spacing` apart, centered         |
//! | `sphere` | Fibonacci lattice on a sphere of `radius`                     |
//! | `spiral` | horizontal Archimedean spiral out to `radius`, two turns      |
//! | `random` | uniform in the cube of half-side `radius` (seeded)            |
//!
//! Generated positions are applied verbatim.  The engine only checks that a
//! generator returned `count` finite points.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use sm_core::error::{require_finite, require_non_negative};
use sm_core::{ConfigError, ConfigResult, FormationRng, Vec3};

/// Layout parameters shared by every generator.  Each generator reads the
/// fields that make sense for it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormationParams {
    pub center:  Vec3,
    pub spacing: f64,
    pub radius:  f64,
}

impl Default for FormationParams {
    fn default() -> Self {
        Self { center: Vec3::ZERO, spacing: 1.0, radius: 1.0 }
    }
}

impl FormationParams {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.center.is_finite() {
            return Err(ConfigError::NonFinite { param: "center" });
        }
        require_finite("spacing", self.spacing)?;
        require_non_negative("radius", self.radius)?;
        Ok(())
    }
}

/// Produces `count` initial positions.
///
/// Must be deterministic given the same `rng` state; randomness comes only
/// from `rng`.
pub trait FormationGenerator: Send + Sync {
    fn generate(&self, count: usize, params: &FormationParams, rng: &mut FormationRng) -> Vec<Vec3>;
}

impl<F> FormationGenerator for F
where
    F: Fn(usize, &FormationParams, &mut FormationRng) -> Vec<Vec3> + Send + Sync,
{
    fn generate(&self, count: usize, params: &FormationParams, rng: &mut FormationRng) -> Vec<Vec3> {
        self(count, params, rng)
    }
}

// ── Built-in generators ───────────────────────────────────────────────────────

/// Offset of slot `i` of `n` from the middle of a row, in units of spacing.
fn centered(i: usize, n: usize) -> f64 {
    i as f64 - (n as f64 - 1.0) / 2.0
}

pub struct Line;

impl FormationGenerator for Line {
    fn generate(&self, count: usize, p: &FormationParams, _rng: &mut FormationRng) -> Vec<Vec3> {
        (0..count)
            .map(|i| p.center + Vec3::X * (centered(i, count) * p.spacing))
            .collect()
    }
}

pub struct Circle;

impl FormationGenerator for Circle {
    fn generate(&self, count: usize, p: &FormationParams, _rng: &mut FormationRng) -> Vec<Vec3> {
        (0..count)
            .map(|i| {
                let (s, c) = (TAU * i as f64 / count as f64).sin_cos();
                p.center + Vec3::new(c * p.radius, s * p.radius, 0.0)
            })
            .collect()
    }
}

pub struct Grid;

impl FormationGenerator for Grid {
    fn generate(&self, count: usize, p: &FormationParams, _rng: &mut FormationRng) -> Vec<Vec3> {
        let cols = (count as f64).sqrt().ceil().max(1.0) as usize;
        let rows = count.div_ceil(cols);
        (0..count)
            .map(|i| {
                let x = centered(i % cols, cols) * p.spacing;
                let y = centered(i / cols, rows) * p.spacing;
                p.center + Vec3::new(x, y, 0.0)
            })
            .collect()
    }
}

pub struct Sphere;

impl FormationGenerator for Sphere {
    fn generate(&self, count: usize, p: &FormationParams, _rng: &mut FormationRng) -> Vec<Vec3> {
        let golden_angle = PI * (3.0 - 5f64.sqrt());
        (0..count)
            .map(|i| {
                let z = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
                let ring = (1.0 - z * z).sqrt();
                let (s, c) = (golden_angle * i as f64).sin_cos();
                p.center + Vec3::new(c * ring, s * ring, z) * p.radius
            })
            .collect()
    }
}

pub struct Spiral;

impl Spiral {
    const TURNS: f64 = 2.0;
}

impl FormationGenerator for Spiral {
    fn generate(&self, count: usize, p: &FormationParams, _rng: &mut FormationRng) -> Vec<Vec3> {
        let last = count.saturating_sub(1).max(1) as f64;
        (0..count)
            .map(|i| {
                let t = i as f64 / last;
                let (s, c) = (TAU * Self::TURNS * t).sin_cos();
                p.center + Vec3::new(c, s, 0.0) * (p.radius * t)
            })
            .collect()
    }
}

pub struct Random;

impl FormationGenerator for Random {
    fn generate(&self, count: usize, p: &FormationParams, rng: &mut FormationRng) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                let x = rng.symmetric(p.radius);
                let y = rng.symmetric(p.radius);
                let z = rng.symmetric(p.radius);
                p.center + Vec3::new(x, y, z)
            })
            .collect()
    }
}

// ── FormationRegistry ─────────────────────────────────────────────────────────

/// Name-keyed generator table.
pub struct FormationRegistry {
    generators: BTreeMap<String, Box<dyn FormationGenerator>>,
}

impl FormationRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self { generators: BTreeMap::new() }
    }

    /// A registry holding every built-in generator.
    pub fn with_builtins() -> Self {
        let mut r = Self::empty();
        r.register("line", Line);
        r.register("circle", Circle);
        r.register("grid", Grid);
        r.register("sphere", Sphere);
        r.register("spiral", Spiral);
        r.register("random", Random);
        r
    }

    /// Add or replace the generator under `name`.
    pub fn register<G: FormationGenerator + 'static>(&mut self, name: &str, generator: G) {
        self.generators.insert(name.to_owned(), Box::new(generator));
    }

    pub fn get(&self, name: &str) -> Option<&dyn FormationGenerator> {
        self.generators.get(name).map(|g| g.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.generators.keys().map(String::as_str)
    }
}

impl Default for FormationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
