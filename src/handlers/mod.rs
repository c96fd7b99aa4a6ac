//! # Fault handlers and error sinks.
//!
//! Every contained [`Fault`](crate::Fault) is delivered to the handlers held by
//! a [`SupervisorConfig`](crate::SupervisorConfig), in registration order,
//! followed by any attempt-local extras.
//!
//! ## Architecture
//! ```text
//! panic ──► contain() ──► config.handlers() (snapshot)
//!                              │
//!                              ├──► LogHandler ──► ErrorSink::write(&str)
//!                              ├──► custom handler (metrics, alerts, ...)
//!                              └──► extra handlers (per call)
//! ```
//!
//! Handlers are observational: they cannot change whether the loop restarts.
//!
//! ## Implementing a handler
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use respawn::{ErrorSink, Fault, FaultHandler};
//!
//! #[derive(Default)]
//! struct PanicCounter(AtomicUsize);
//!
//! impl FaultHandler for PanicCounter {
//!     fn on_fault(&self, _fault: &Fault, _sink: &dyn ErrorSink) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "panic-counter" }
//! }
//! ```

mod handler;
mod log;
mod sink;

pub use handler::{FaultHandler, FaultHandlerRef};
pub use log::{LogHandler, MAX_TRACE_BYTES};
pub use sink::{ErrorSink, ErrorSinkRef, TracingSink};
