//! Configuration error type.
//!
//! Every parameter check in the workspace funnels through `ConfigError`.
//! Sub-crates wrap it in their own error enums via `#[from]`.  Values are
//! rejected, never clamped: a caller that passes `factor = 1.2` gets an
//! `OutOfRange` back and engine state is untouched.

use thiserror::Error;

/// Invalid parameter supplied by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        value: f64,
        min:   f64,
        max:   f64,
    },

    #[error("{param} must be finite")]
    NonFinite { param: &'static str },

    #[error("unknown {kind} {name:?}")]
    UnknownName { kind: &'static str, name: String },

    #[error("configuration error: {0}")]
    Invalid(String),
}

/// Shorthand result type for parameter validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reject NaN and infinities.
pub fn require_finite(param: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { param })
    }
}

/// Reject values outside the closed interval `[min, max]` (and non-finite ones).
pub fn require_range(param: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<f64> {
    require_finite(param, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { param, value, min, max });
    }
    Ok(value)
}

/// Reject negative values (and non-finite ones).
pub fn require_non_negative(param: &'static str, value: f64) -> ConfigResult<f64> {
    require_range(param, value, 0.0, f64::INFINITY)
}
