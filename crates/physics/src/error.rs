//! Errors raised when building a movement controller.

use thiserror::Error;

/// Errors from constructing or configuring the movement core.
///
/// Per-tick problems (an invalid `dt`, a sensor query that finds nothing)
/// are never errors: the tick is skipped or the query returns `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MovementError {
    /// A required attachment of the character rig is absent.
    #[error("character rig is missing its {0}")]
    MissingDependency(&'static str),

    /// A tuning value is outside its physical range.
    #[error("invalid movement config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

impl MovementError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfig { field, reason }
    }
}
