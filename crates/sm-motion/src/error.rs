//! Error types for sm-motion.
//!
//! Parameter validation uses [`sm_core::ConfigError`] directly.  The only
//! error defined here is the per-frame computation fault, which never leaves
//! [`SourceMotion::aggregate`][crate::SourceMotion::aggregate].

use thiserror::Error;

/// A motion component failed to produce a usable delta this frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentFault {
    #[error("non-finite {channel} offset")]
    NonFinite { channel: &'static str },

    #[error("path function returned a non-finite point at phase {phase}")]
    PathNotFinite { phase: f64 },

    #[error("{0}")]
    Other(String),
}

/// Result of one `calculate_delta` call.
pub type ComponentResult<T> = Result<T, ComponentFault>;
