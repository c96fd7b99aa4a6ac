//! # Fault handler trait.
//!
//! [`FaultHandler`] is the extension point for reacting to contained panics.
//!
//! ## Rules
//! - Handlers run synchronously on the task that faulted, after unwinding.
//! - Handlers run **outside** the protected scope: a handler that panics
//!   propagates that panic to whoever called containment. Don't panic.
//! - Handlers may register further handlers; the new ones apply to later
//!   faults only.

use std::sync::Arc;

use crate::fault::Fault;
use crate::handlers::ErrorSink;

/// Shared handle to a fault handler.
pub type FaultHandlerRef = Arc<dyn FaultHandler>;

/// Observer of contained panics.
pub trait FaultHandler: Send + Sync + 'static {
    /// Handles one fault.
    ///
    /// `sink` is the config's error sink at the moment of containment.
    fn on_fault(&self, fault: &Fault, sink: &dyn ErrorSink);

    /// Returns the handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    /// Override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> FaultHandler for F
where
    F: Fn(&Fault) + Send + Sync + 'static,
{
    fn on_fault(&self, fault: &Fault, _sink: &dyn ErrorSink) {
        self(fault)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
