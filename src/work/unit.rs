//! # Restartable unit of work.
//!
//! A [`Work`] hands out a **fresh** future for every attempt. The supervision
//! loop calls [`Work::spawn`] once per attempt, strictly sequentially, so an
//! implementation never sees two of its attempts running at the same time.
//!
//! Two output shapes are supervised:
//! - `Output = ()` for plain supervision ([`WorkRef`]);
//! - `Output = Result<(), WorkError>` for tracked supervision ([`TrackedWorkRef`]),
//!   where an `Err` is handed to the tracker instead of being retried.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::error::WorkError;

/// Boxed future returned by [`Work::spawn`].
pub type BoxWorkFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Shared handle to plain work.
pub type WorkRef = Arc<dyn Work<Output = ()>>;

/// Shared handle to tracked work.
pub type TrackedWorkRef = Arc<dyn Work<Output = Result<(), WorkError>>>;

/// # Restartable unit of work.
///
/// # Example
/// ```
/// use respawn::{BoxWorkFuture, Work};
///
/// struct Poller;
///
/// impl Work for Poller {
///     type Output = ();
///
///     fn name(&self) -> &str { "poller" }
///
///     fn spawn(&self) -> BoxWorkFuture<()> {
///         Box::pin(async {
///             // poll something...
///         })
///     }
/// }
/// ```
pub trait Work: Send + Sync + 'static {
    /// Value produced by one attempt.
    type Output: Send + 'static;

    /// Returns a stable, human-readable name used in logs.
    fn name(&self) -> &str;

    /// Creates the future for a single attempt.
    ///
    /// The future is polled on its own tokio task; a panic inside it is
    /// contained and causes a new call to `spawn`.
    fn spawn(&self) -> BoxWorkFuture<Self::Output>;
}

impl<W: Work + ?Sized> Work for Arc<W> {
    type Output = W::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn spawn(&self) -> BoxWorkFuture<Self::Output> {
        (**self).spawn()
    }
}
