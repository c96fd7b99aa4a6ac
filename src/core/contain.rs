//! # Fault containment.
//!
//! Runs work inside a protected scope so a panic does not unwind past it.
//! A caught panic becomes a [`Fault`] and is delivered to handlers.
//!
//! ## Flow
//! ```text
//! work ──► catch_unwind ──► Ok(v)   ──► Contained::Completed(v)   (no handler runs)
//!                      └──► Err(p)  ──► Fault::new(p)
//!                                        ├─► config.handlers()  (registration order)
//!                                        ├─► extra handlers     (given order)
//!                                        └─► reraise? ──► resume_unwind(p)
//!                                                    else Contained::Faulted
//! ```
//!
//! ## Rules
//! - Handlers see a **snapshot** of the registry taken at containment time.
//! - Handlers run outside the protected scope; a panicking handler propagates.
//! - Only unwinding panics are contained; with `panic = "abort"` the process
//!   exits before any handler runs.

use std::{
    future::Future,
    panic::{self, AssertUnwindSafe},
};

use futures::FutureExt;

use crate::{core::SupervisorConfig, fault::Fault, handlers::FaultHandler};

/// Outcome of running work under containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contained<T> {
    /// Work returned normally.
    Completed(T),
    /// Work panicked; the fault was handled and swallowed.
    Faulted,
}

impl<T> Contained<T> {
    /// True if the work panicked.
    pub fn is_faulted(&self) -> bool {
        matches!(self, Contained::Faulted)
    }

    /// Returns the value of a normal completion.
    pub fn completed(self) -> Option<T> {
        match self {
            Contained::Completed(v) => Some(v),
            Contained::Faulted => None,
        }
    }
}

/// Runs `work` on the current thread, containing any panic.
///
/// # Example
/// ```
/// use respawn::{contain, Contained, SupervisorConfig};
///
/// let cfg = SupervisorConfig::empty();
/// let v: Vec<u8> = Vec::new();
/// let out = contain(&cfg, || v[3], &[]);
/// assert_eq!(out, Contained::Faulted);
/// assert_eq!(contain(&cfg, || 1 + 1, &[]), Contained::Completed(2));
/// ```
///
/// # Panics
/// Resumes the original panic after all handlers ran if
/// [`SupervisorConfig::reraise`] is set. A panicking handler also propagates.
pub fn contain<F, R>(config: &SupervisorConfig, work: F, extra: &[&dyn FaultHandler]) -> Contained<R>
where
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(v) => Contained::Completed(v),
        Err(payload) => {
            handle_fault(config, Fault::new(payload), extra);
            Contained::Faulted
        }
    }
}

/// Polls `fut` to completion, containing any panic raised while polling.
///
/// Same semantics as [`contain`]; this is what the supervision loops use for
/// every attempt.
pub async fn contain_async<Fut>(
    config: &SupervisorConfig,
    fut: Fut,
    extra: &[&dyn FaultHandler],
) -> Contained<Fut::Output>
where
    Fut: Future,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(v) => Contained::Completed(v),
        Err(payload) => {
            handle_fault(config, Fault::new(payload), extra);
            Contained::Faulted
        }
    }
}

fn handle_fault(config: &SupervisorConfig, fault: Fault, extra: &[&dyn FaultHandler]) {
    let sink = config.sink();
    for handler in config.handlers() {
        handler.on_fault(&fault, &*sink);
    }
    for handler in extra {
        handler.on_fault(&fault, &*sink);
    }
    if config.reraise() {
        panic::resume_unwind(fault.into_payload());
    }
}
