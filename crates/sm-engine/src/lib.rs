//! `sm-engine` — the frame loop that composes motion for every source.
//!
//! # Frame loop
//!
//! ```text
//! update(dt):
//!   ⓪ Commands: apply everything queued through a CommandSender.
//!   ① Clock   : advance by dt (default 1 / frame_rate).
//!   ② Advance : begin_frame on each enabled shared component (once per
//!               macro) and each enabled local component.
//!   ③ Compute : SourceMotion::aggregate for every source against the
//!               pre-frame registry (parallel with the `parallel` feature).
//!   ④ Apply   : add each aggregate to its source, ascending SourceId.
//!   ⑤ Send    : pending group events, then the frame, to the transport.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`engine`]    | `Engine`, `Target`, `FrameReport`                         |
//! | [`builder`]   | `EngineBuilder`                                           |
//! | [`registry`]  | `SourceRegistry` (fixed-capacity SoA state table)         |
//! | [`macros`]    | `Macro`, `MacroTable`, `MacroSpec`, `Behavior`            |
//! | [`formation`] | `FormationGenerator`, `FormationRegistry`, built-ins      |
//! | [`transport`] | `OutputTransport`, `FrameOutput`, `GroupEvent`, stats     |
//! | [`command`]   | `Command`, `CommandSender`                                |
//! | [`error`]     | `EngineError`, `EngineResult<T>`                          |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the compute step on Rayon's thread pool.          |
//! | `serde`    | `Serialize`/`Deserialize` for specs and parameters.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sm_core::EngineConfig;
//! use sm_engine::{Behavior, EngineBuilder, MacroSpec};
//!
//! let mut engine = EngineBuilder::new(EngineConfig::default()).build()?;
//! engine.create_macro(
//!     MacroSpec::with_count("ring", 8, "circle").behavior(Behavior::Orbit),
//! )?;
//! for _ in 0..60 {
//!     engine.update(None)?;
//! }
//! ```

pub mod builder;
pub mod command;
pub mod engine;
pub mod error;
pub mod formation;
pub mod macros;
pub mod registry;
pub mod transport;


pub use builder::EngineBuilder;
pub use command::{Command, CommandSender};
pub use engine::{Engine, FrameReport, Target};
pub use error::{EngineError, EngineResult};
pub use formation::{FormationGenerator, FormationParams, FormationRegistry};
pub use macros::{Behavior, Macro, MacroSource, MacroSpec, MacroTable};
pub use registry::SourceRegistry;
pub use transport::{FrameOutput, GroupEvent, NullTransport, OutputTransport, ParamUpdate, TransportStats};
