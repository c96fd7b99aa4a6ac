//! Error types used by supervised work and task groups.
//!
//! - [`WorkError`]: the failure indicator returned by tracked work.
//! - [`GroupError`]: errors raised by a [`TaskGroup`](crate::TaskGroup).
//!
//! A [`WorkError`] is an *ordinary* failure: it is never retried by the
//! supervision loop. Panics are the only thing that triggers a restart.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by tracked work.
///
/// Returned from a tracked attempt, a `WorkError` ends supervision and is
/// recorded by the tracker as the reason the group is dying.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkError {
    /// Work finished with an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Work panicked and the panic escaped containment.
    #[error("panicked: {info}")]
    Panicked {
        /// Rendered panic payload.
        info: String,
    },
}

impl WorkError {
    /// Shorthand for [`WorkError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use respawn::WorkError;
    ///
    /// let err = WorkError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        WorkError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use respawn::WorkError;
    ///
    /// assert_eq!(WorkError::fail("eof").as_label(), "work_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkError::Fail { .. } => "work_failed",
            WorkError::Panicked { .. } => "work_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkError::Fail { error } => format!("error: {error}"),
            WorkError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by a task group.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// Every tracked future already finished; the group accepts no new work.
    #[error("task group is dead; cannot launch new work")]
    Dead,
}

impl GroupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GroupError::Dead => "group_dead",
        }
    }
}
