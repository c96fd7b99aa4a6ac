//! # respawn
//!
//! **respawn** keeps a unit of work alive: it runs the work on a tokio task,
//! catches any panic it raises, and relaunches it until it returns normally
//! or a cancellation signal fires.
//!
//! It is deliberately small: no backoff, no restart limits, no queueing.
//! Build those into the work itself or into a larger orchestrator.
//!
//! ## Architecture
//! ```text
//!   caller ──► supervise(cancel, work) ──► tokio::spawn(loop)
//!                                               │
//!     ┌─────────────────────────────────────────┘
//!     ▼
//!   loop {
//!     ├─► cancel.is_cancelled()? ──► Exit::Cancelled
//!     ├─► spawn attempt: contain_async(work.spawn())
//!     │        │
//!     │        ├─ panic ──► SupervisorConfig handlers (LogHandler ─► ErrorSink)
//!     │        │            └─► reraise? resume_unwind
//!     │        ▼
//!     └─► select! { biased;
//!           cancel.cancelled()   ──► Exit::Cancelled (attempt left running)
//!           attempt completed    ──► Exit::Completed
//!           attempt faulted      ──► restart
//!         }
//!   }
//! ```
//!
//! The tracked flavour launches each attempt through a [`Tracker`] (for
//! example a [`TaskGroup`]) so the group accounts for every restart; it polls
//! the group's dying signal between attempts.
//!
//! ## Features
//! | Area              | Description                                          | Key types / functions                        |
//! |-------------------|------------------------------------------------------|----------------------------------------------|
//! | **Supervision**   | Restart on panic until done or cancelled.            | [`Supervisor`], [`supervise`], [`Exit`]      |
//! | **Containment**   | Catch panics and dispatch them to handlers.          | [`contain`], [`contain_async`], [`Fault`]    |
//! | **Handlers**      | Observe contained panics (logging, metrics).         | [`FaultHandler`], [`LogHandler`], [`ErrorSink`] |
//! | **Cancellation**  | Plain tokens or tracked task groups.                 | [`CancelSource`], [`Tracker`], [`TaskGroup`] |
//! | **Work**          | Closures or custom types producing one future per attempt. | [`Work`], [`WorkFn`]                  |
//! | **Configuration** | Shared, runtime-mutable containment settings.        | [`SupervisorConfig`]                         |
//! | **Errors**        | Failure indicators and group errors.                 | [`WorkError`], [`GroupError`]                |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use respawn::{WorkFn, supervise_blocking};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let stop = CancellationToken::new();
//!     let runs = Arc::new(AtomicU32::new(0));
//!
//!     let work = WorkFn::new("poller", {
//!         let (stop, runs) = (stop.clone(), Arc::clone(&runs));
//!         move || {
//!             let (stop, runs) = (stop.clone(), Arc::clone(&runs));
//!             async move {
//!                 let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
//!                 if n == 3 {
//!                     stop.cancel();
//!                 }
//!                 if n <= 3 {
//!                     panic!("upstream went away");
//!                 }
//!             }
//!         }
//!     });
//!
//!     let exit = supervise_blocking(stop, work).await;
//!     assert!(exit.is_cancelled());
//!     assert_eq!(runs.load(Ordering::SeqCst), 3);
//! }
//! ```
//!
//! ## Panics and `panic = "abort"`
//! Containment relies on unwinding. With `panic = "abort"` a panicking attempt
//! takes the process down before any handler runs.
mod cancel;
mod core;
mod error;
mod fault;
mod handlers;
mod work;

// ---- Public re-exports ----

pub use cancel::{CancelSource, TaskGroup, Tracker};
pub use self::core::{
    Contained, Exit, Supervisor, SupervisorConfig, contain, contain_async, supervise,
    supervise_blocking, supervise_tracked, supervise_tracked_blocking,
};
pub use error::{GroupError, WorkError};
pub use fault::Fault;
pub use handlers::{
    ErrorSink, ErrorSinkRef, FaultHandler, FaultHandlerRef, LogHandler, MAX_TRACE_BYTES,
    TracingSink,
};
pub use work::{BoxWorkFuture, TrackedWorkRef, Work, WorkFn, WorkRef};
