//! # Supervision configuration.
//!
//! Provides [`SupervisorConfig`]: the shared, thread-safe home of everything
//! containment consults when a unit of work panics.
//!
//! Config is used in two ways:
//! 1. **Injected**: `Supervisor::new(Arc<SupervisorConfig>)`, or passed by
//!    reference to [`contain`](crate::contain) / [`contain_async`](crate::contain_async).
//! 2. **Process-wide default**: [`SupervisorConfig::global`], used by the
//!    crate-root `supervise*` functions.
//!
//! ## Fields
//! - `reraise`: resume the panic after all handlers ran (default `false`)
//! - `sink`: where [`LogHandler`] writes its report (default [`TracingSink`])
//! - `handlers`: ordered fault handlers (default: one [`LogHandler`])
//!
//! Every field can be changed at any time through `&self`; in-flight
//! containments keep the snapshot they already took.

use std::sync::{
    Arc, OnceLock, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::handlers::{
    ErrorSink, ErrorSinkRef, FaultHandler, FaultHandlerRef, LogHandler, TracingSink,
};

static GLOBAL: OnceLock<Arc<SupervisorConfig>> = OnceLock::new();

/// Shared configuration for fault containment.
///
/// ## Example
/// ```
/// use std::sync::Arc;
/// use respawn::{Fault, SupervisorConfig};
///
/// let cfg = Arc::new(SupervisorConfig::new());
/// cfg.register(|fault: &Fault| eprintln!("worker died: {fault}"));
/// assert_eq!(cfg.handlers().len(), 2);
/// assert!(!cfg.reraise());
/// ```
pub struct SupervisorConfig {
    reraise: AtomicBool,
    sink: RwLock<ErrorSinkRef>,
    handlers: RwLock<Vec<FaultHandlerRef>>,
}

impl SupervisorConfig {
    /// Default configuration: no re-raise, [`TracingSink`], one [`LogHandler`].
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_handler(LogHandler::new())
    }

    /// Configuration without any handler. Faults are still contained.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            reraise: AtomicBool::new(false),
            sink: RwLock::new(Arc::new(TracingSink)),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Process-wide default configuration, created on first use.
    ///
    /// Handlers registered here apply to every crate-root `supervise*` call.
    pub fn global() -> Arc<SupervisorConfig> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SupervisorConfig::new())))
    }

    /// Sets the re-raise flag (builder style).
    #[must_use]
    pub fn with_reraise(self, reraise: bool) -> Self {
        self.set_reraise(reraise);
        self
    }

    /// Replaces the error sink (builder style).
    #[must_use]
    pub fn with_sink(self, sink: impl ErrorSink) -> Self {
        self.set_sink(sink);
        self
    }

    /// Appends a handler (builder style).
    #[must_use]
    pub fn with_handler(self, handler: impl FaultHandler) -> Self {
        self.register(handler);
        self
    }

    /// Whether contained panics are resumed after handling.
    #[inline]
    pub fn reraise(&self) -> bool {
        self.reraise.load(Ordering::Acquire)
    }

    /// Changes the re-raise flag for subsequent faults.
    pub fn set_reraise(&self, reraise: bool) {
        self.reraise.store(reraise, Ordering::Release);
    }

    /// Returns the current error sink.
    pub fn sink(&self) -> ErrorSinkRef {
        Arc::clone(&self.sink.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the error sink for subsequent faults.
    pub fn set_sink(&self, sink: impl ErrorSink) {
        let sink: ErrorSinkRef = Arc::new(sink);
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = sink;
    }

    /// Appends a handler; it runs after every handler registered before it.
    pub fn register(&self, handler: impl FaultHandler) {
        self.register_ref(Arc::new(handler));
    }

    /// Appends an already shared handler.
    pub fn register_ref(&self, handler: FaultHandlerRef) {
        tracing::trace!(handler = handler.name(), "fault handler registered");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Snapshot of the registered handlers, in registration order.
    pub fn handlers(&self) -> Vec<FaultHandlerRef> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SupervisorConfig {
    /// Same as [`SupervisorConfig::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SupervisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.handlers().iter().map(|h| h.name()).collect();
        f.debug_struct("SupervisorConfig")
            .field("reraise", &self.reraise())
            .field("handlers", &names)
            .finish_non_exhaustive()
    }
}
