//! # LogHandler: default fault reporter
//!
//! Formats each fault with its backtrace and writes it to the error sink.
//! The backtrace part is capped at [`MAX_TRACE_BYTES`] so a deep stack cannot
//! flood the logs.
//!
//! ## Example output
//! ```text
//! observed a panic: index out of bounds: the len is 3 but the index is 7
//!    0: std::backtrace::Backtrace::force_capture
//!    ...
//! ```


use crate::fault::Fault;
use crate::handlers::{ErrorSink, FaultHandler};

/// Upper bound on the rendered backtrace, in bytes.
pub const MAX_TRACE_BYTES: usize = 64 << 10;

/// Default handler: writes `observed a panic: ...` plus a bounded backtrace.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl LogHandler {
    /// Construct a new [`LogHandler`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders the report written to the sink.
    pub fn format(fault: &Fault) -> String {
        let mut trace = fault.backtrace().to_string();
        truncate_at_boundary(&mut trace, MAX_TRACE_BYTES);
        match fault.message() {
            Some(msg) => format!("observed a panic: {msg}\n{trace}"),
            None => format!(
                "observed a panic: opaque payload ({:?})\n{trace}",
                fault.payload().type_id()
            ),
        }
    }
}

impl FaultHandler for LogHandler {
    fn on_fault(&self, fault: &Fault, sink: &dyn ErrorSink) {
        sink.write(&Self::format(fault));
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

fn truncate_at_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
