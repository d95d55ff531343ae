//! Packing error types.

use thiserror::Error;

/// Errors a placement call can return.
///
/// Running out of capacity is not an error: that outcome is reported as
/// [`PackingResult::has_capacity`] = false so callers can fall back to
/// another strategy or grow the cluster.
///
/// [`PackingResult::has_capacity`]: crate::PackingResult::has_capacity
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PackingError {
    /// The caller's cancellation token fired mid-placement. No partial
    /// result is produced.
    #[error("placement cancelled")]
    Cancelled,

    /// An input violated an invariant (negative resource components). A
    /// caller bug, not a data-driven condition.
    #[error("invalid placement input: {0}")]
    InvalidInput(String),
}

/// Error from parsing a strategy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown packing strategy {0:?}")]
pub struct UnknownStrategy(pub String);
