//! Cross-thread configuration queue.
//!
//! A control surface running on another thread cannot touch the engine
//! directly.  It sends [`Command`]s through a [`CommandSender`]; the engine
//! drains the queue at the start of the next [`update`][crate::Engine::update],
//! so a change is applied whole between frames, never in the middle of one.
//!
//! ```rust,ignore
//! let tx = engine.command_sender();
//! std::thread::spawn(move || {
//!     tx.send(Command::ToggleConcentration {
//!         target: Target::Macro("ring".into()),
//!         key:    "concentration".into(),
//!     })
//! });
//! ```

use std::sync::mpsc::{self, Receiver, Sender};

use sm_core::{MotionState, Orientation, SourceId};
use sm_motion::{Easing, MotionComponent};

use crate::{Engine, EngineError, EngineResult, MacroSpec, OutputTransport, Target};

/// One configuration call, in data form.  Each variant maps to the
/// [`Engine`] method of the same name.
#[derive(Clone, Debug)]
pub enum Command {
    AddSource(MotionState),
    RemoveSource(SourceId),
    SetAperture { id: SourceId, aperture: f64 },
    CreateMacro(MacroSpec),
    DeleteMacro { name: String, release_sources: bool },
    RenameMacro { from: String, to: String },
    AddMacroMembers { name: String, ids: Vec<SourceId> },
    RemoveMacroMembers { name: String, ids: Vec<SourceId> },
    SetComponent { target: Target, key: String, component: MotionComponent },
    ClearComponent { target: Target, key: String },
    SetComponentEnabled { target: Target, key: String, enabled: bool },
    SetConcentration { target: Target, key: String, factor: f64 },
    AnimateConcentration {
        target:   Target,
        key:      String,
        factor:   f64,
        duration: f64,
        easing:   Easing,
    },
    ToggleConcentration { target: Target, key: String },
    SetRotationTarget { target: Target, key: String, orientation: Orientation },
}

/// Sending half of the engine's command queue.  Cheap to clone.
#[derive(Clone, Debug)]
pub struct CommandSender(Sender<Command>);

impl CommandSender {
    /// Queue `cmd` for the next frame.  Fails only if the engine is gone.
    pub fn send(&self, cmd: Command) -> EngineResult<()> {
        self.0.send(cmd).map_err(|_| EngineError::Disconnected)
    }
}

pub(crate) fn channel() -> (CommandSender, Receiver<Command>) {
    let (tx, rx) = mpsc::channel();
    (CommandSender(tx), rx)
}

impl<T: OutputTransport> Engine<T> {
    /// Apply one command immediately.
    pub fn apply(&mut self, cmd: Command) -> EngineResult<()> {
        match cmd {
            Command::AddSource(state) => self.add_source(state).map(drop),
            Command::RemoveSource(id) => self.remove_source(id),
            Command::SetAperture { id, aperture } => self.set_aperture(id, aperture),
            Command::CreateMacro(spec) => self.create_macro(spec).map(drop),
            Command::DeleteMacro { name, release_sources } => {
                self.delete_macro(&name, release_sources).map(drop)
            }
            Command::RenameMacro { from, to } => self.rename_macro(&from, &to),
            Command::AddMacroMembers { name, ids } => self.add_macro_members(&name, &ids),
            Command::RemoveMacroMembers { name, ids } => self.remove_macro_members(&name, &ids),
            Command::SetComponent { target, key, component } => {
                self.set_component(target, &key, component)
            }
            Command::ClearComponent { target, key } => self.clear_component(target, &key),
            Command::SetComponentEnabled { target, key, enabled } => {
                self.set_component_enabled(target, &key, enabled)
            }
            Command::SetConcentration { target, key, factor } => {
                self.set_concentration(target, &key, factor)
            }
            Command::AnimateConcentration { target, key, factor, duration, easing } => {
                self.animate_concentration(target, &key, factor, duration, easing)
            }
            Command::ToggleConcentration { target, key } => self.toggle_concentration(target, &key),
            Command::SetRotationTarget { target, key, orientation } => {
                self.set_rotation_target(target, &key, orientation)
            }
        }
    }
}
