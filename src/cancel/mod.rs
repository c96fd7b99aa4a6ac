//! # Cancellation sources.
//!
//! The supervision loops only depend on these traits, never on a concrete
//! signal:
//! - [`CancelSource`]: a one-way, permanently latching "stop" signal;
//! - [`Tracker`]: a cancel source that also launches tracked work (a task
//!   group whose "dying" latch is the signal).
//!
//! Implementations shipped here:
//! - `tokio_util::sync::CancellationToken` (plain signal);
//! - [`TaskGroup`] (tracked group).

mod group;
mod source;

pub use group::TaskGroup;
pub use source::{CancelSource, Tracker};
