//! `sm-motion` — motion components and per-source aggregation.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                    |
//! |--------------------|-------------------------------------------------------------|
//! | [`component`]      | `Motion` trait, closed `MotionComponent` enum, `ComponentKind` |
//! | [`concentration`]  | `Concentration`, `ConcentrationStatus`                      |
//! | [`trajectory`]     | `Shape`, `MovementMode`, `Trajectory`, `MacroTrajectory`    |
//! | [`rotation`]       | `AlgorithmicRotation`, `ManualRotation`, `SeekState`        |
//! | [`easing`]         | `Easing` curves, `ScalarAnimation` state machine            |
//! | [`source_motion`]  | `SourceMotion`, `Slot`, `SharedComponents`, `Aggregate`     |
//! | [`error`]          | `ComponentFault`, `ComponentResult<T>`                      |
//!
//! # Design notes
//!
//! A frame runs in two steps per component:
//!
//! 1. **Advance** (`begin_frame`, `&mut self`): step phase, animations and
//!    seek progress.  Runs once per instance, so a macro's shared component
//!    advances once no matter how many members reference it.
//!
//! 2. **Compute** (`calculate_delta`, `&self`): read the source's current
//!    state and return an offset.  No mutation, so every source can be
//!    computed independently and in any order.
//!
//! Offsets from all of a source's components are summed channel by channel
//! by [`SourceMotion::aggregate`] and applied by the engine.

pub mod component;
pub mod concentration;
pub mod easing;
pub mod error;
pub mod rotation;
pub mod source_motion;
pub mod trajectory;

#[cfg(test)]
mod tests;

pub use component::{ComponentKind, Motion, MotionComponent};
pub use concentration::{Concentration, ConcentrationStatus};
pub use easing::{Easing, ScalarAnimation};
pub use error::{ComponentFault, ComponentResult};
pub use rotation::{AlgorithmicRotation, Interpolation, ManualRotation, SeekState};
pub use source_motion::{Aggregate, NoShared, SharedComponents, Slot, SourceMotion};
pub use trajectory::{MacroTrajectory, MovementMode, PathFn, Shape, Trajectory};
