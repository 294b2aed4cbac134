use sm_core::{ConfigError, SourceId};
use sm_motion::ComponentKind;
use thiserror::Error;

/// Caller-visible configuration and capacity errors.
///
/// Every operation that returns one of these has left the engine exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("capacity exceeded: requested {requested} sources, {available} available")]
    Capacity { requested: usize, available: usize },

    #[error("no such source: {0}")]
    SourceNotFound(SourceId),

    #[error("no such macro: {0:?}")]
    MacroNotFound(String),

    #[error("macro {0:?} already exists")]
    MacroExists(String),

    #[error("macro name {0:?} was used before and cannot be reused")]
    MacroNameRetired(String),

    #[error("{id} already belongs to macro {group:?}")]
    AlreadyInMacro { id: SourceId, group: String },

    #[error("{id} is not a member of macro {group:?}")]
    NotInMacro { id: SourceId, group: String },

    #[error("{id} has its own component {key:?}; a macro component cannot replace it")]
    KeyConflict { id: SourceId, key: String },

    #[error("no component {0:?}")]
    ComponentNotFound(String),

    #[error("component {key:?} is a {found}, expected {expected}")]
    WrongComponentKind {
        key:      String,
        expected: ComponentKind,
        found:    ComponentKind,
    },

    #[error("unknown formation {0:?}")]
    UnknownFormation(String),

    #[error("unknown behavior {0:?}")]
    UnknownBehavior(String),

    #[error("invalid frame delta {0}: must be finite and non-negative")]
    InvalidDt(f64),

    #[error("engine has been dropped")]
    Disconnected,
}

pub type EngineResult<T> = Result<T, EngineError>;
