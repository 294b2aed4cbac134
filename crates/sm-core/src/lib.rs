//! `sm-core` — foundational types for the `spat_motion` engine.
//!
//! This crate is a dependency of every other `sm-*` crate.  It intentionally
//! has no `sm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `SourceId`, `MacroId`                                 |
//! | [`vec3`]        | `Vec3`, centroid and mean-distance helpers            |
//! | [`orientation`] | `Orientation` (yaw/pitch/roll), composed rotation     |
//! | [`state`]       | `MotionState`, `MotionDelta`                          |
//! | [`time`]        | `FrameIndex`, `SimClock`                              |
//! | [`config`]      | `EngineConfig`                                        |
//! | [`rng`]         | `FormationRng` (seeded, for layout generators)        |
//! | [`error`]       | `ConfigError`, `ConfigResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod orientation;
pub mod rng;
pub mod state;
pub mod time;
pub mod vec3;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{ConfigError, ConfigResult};
pub use ids::{MacroId, SourceId};
pub use orientation::Orientation;
pub use rng::FormationRng;
pub use state::{MotionDelta, MotionState};
pub use time::{FrameIndex, SimClock};
pub use vec3::Vec3;
