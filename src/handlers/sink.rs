//! # Error sinks.
//!
//! An [`ErrorSink`] is where formatted fault reports end up. The default,
//! [`TracingSink`], emits them as `tracing` error events.

use std::sync::Arc;

/// Shared handle to an error sink.
pub type ErrorSinkRef = Arc<dyn ErrorSink>;

/// Destination for formatted fault reports.
pub trait ErrorSink: Send + Sync + 'static {
    /// Writes one report.
    fn write(&self, message: &str);
}

impl<F> ErrorSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn write(&self, message: &str) {
        self(message)
    }
}

/// Writes reports as `tracing` events at `ERROR` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn write(&self, message: &str) {
        tracing::error!(target: "respawn", "{message}");
    }
}
