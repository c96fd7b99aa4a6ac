//! # Closure-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! attempt. State that must survive restarts lives outside the closure, shared
//! explicitly through `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use respawn::{Work, WorkFn, WorkRef};
//!
//! let attempts = Arc::new(AtomicUsize::new(0));
//! let w: WorkRef = WorkFn::arc("worker", {
//!     let attempts = Arc::clone(&attempts);
//!     move || {
//!         let attempts = Arc::clone(&attempts);
//!         async move {
//!             attempts.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! });
//!
//! assert_eq!(w.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::work::unit::{BoxWorkFuture, Work};

/// Closure-backed unit of work.
#[derive(Debug)]
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new closure-backed unit of work.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a shared handle.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the work and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Work for WorkFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    type Output = Fut::Output;

    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self) -> BoxWorkFuture<Self::Output> {
        Box::pin((self.f)())
    }
}
