//! # Cancellation capability traits.
//!
//! ## Rules
//! - A source transitions active → cancelled exactly once and never back.
//! - [`CancelSource::is_cancelled`] never blocks.
//! - [`CancelSource::cancelled`] completes immediately if already cancelled.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{GroupError, WorkError},
    work::BoxWorkFuture,
};

/// One-way, permanently latching cancellation signal.
#[async_trait]
pub trait CancelSource: Send + Sync + 'static {
    /// Non-blocking poll of the signal.
    fn is_cancelled(&self) -> bool;

    /// Waits until the signal is set.
    async fn cancelled(&self);
}

/// A task group that tracks every launched attempt.
///
/// The signal inherited from [`CancelSource`] is the group's "dying" latch.
/// The group owns its completion bookkeeping; an `Err` returned by a launched
/// future is the group's business (typically recorded as the reason it dies).
pub trait Tracker: CancelSource {
    /// Schedules `work` for tracked concurrent execution.
    fn launch(&self, work: BoxWorkFuture<Result<(), WorkError>>) -> Result<(), GroupError>;
}

#[async_trait]
impl CancelSource for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }

    async fn cancelled(&self) {
        CancellationToken::cancelled(self).await
    }
}

#[async_trait]
impl<T: CancelSource + ?Sized> CancelSource for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }

    async fn cancelled(&self) {
        (**self).cancelled().await
    }
}

impl<T: Tracker + ?Sized> Tracker for Arc<T> {
    fn launch(&self, work: BoxWorkFuture<Result<(), WorkError>>) -> Result<(), GroupError> {
        (**self).launch(work)
    }
}
