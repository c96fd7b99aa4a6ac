//! # TaskGroup: lifecycle tracker for related tasks.
//!
//! A [`TaskGroup`] tracks the futures launched through it as **alive**,
//! **dying**, or **dead**, together with the reason for death.
//!
//! ## Lifecycle
//! ```text
//!   alive ──kill(reason) / Err from a tracked future / last future done──► dying
//!   dying ──last tracked future done──► dead
//! ```
//!
//! ## Rules
//! - `dying` latches once; only the first non-`None` reason is kept.
//! - A tracked future returning `Err(e)` kills the group with `e`.
//! - A tracked future that panics is recorded as [`WorkError::Panicked`].
//! - Once dead, [`TaskGroup::launch`] refuses new work with [`GroupError::Dead`].
//! - Tracked futures must watch [`TaskGroup::dying`] themselves; the group
//!   never aborts them.

use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    cancel::{CancelSource, Tracker},
    error::{GroupError, WorkError},
    fault::panic_message,
    work::BoxWorkFuture,
};

/// Cloneable handle to a group of tracked tasks.
///
/// # Example
/// ```
/// use respawn::{TaskGroup, WorkError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let group = TaskGroup::new();
/// let dying = group.dying();
/// group
///     .launch(Box::pin(async move {
///         dying.cancelled().await;
///         Ok(())
///     }))
///     .unwrap();
///
/// group.kill(Some(WorkError::fail("shutting down")));
/// assert_eq!(group.wait().await, Err(WorkError::fail("shutting down")));
/// # }
/// ```
#[derive(Clone, Default)]
pub struct TaskGroup {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    dying: CancellationToken,
    dead: CancellationToken,
}

#[derive(Default)]
struct State {
    alive: usize,
    reason: Option<WorkError>,
}

impl TaskGroup {
    /// Creates an empty, alive group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `work` on the tokio runtime and tracks its termination.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(&self, work: BoxWorkFuture<Result<(), WorkError>>) -> Result<(), GroupError> {
        {
            let mut state = self.inner.lock();
            if self.inner.dead.is_cancelled() {
                return Err(GroupError::Dead);
            }
            state.alive += 1;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let res = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(WorkError::Panicked {
                        info: panic_message(payload.as_ref()),
                    })
                });
            inner.finish(res);
        });
        Ok(())
    }

    /// Puts the group into the dying state.
    ///
    /// May be called many times; only the first non-`None` reason is kept.
    pub fn kill(&self, reason: Option<WorkError>) {
        let mut state = self.inner.lock();
        self.inner.kill_locked(&mut state, reason);
    }

    /// Signal that latches when the group starts dying.
    pub fn dying(&self) -> CancellationToken {
        self.inner.dying.clone()
    }

    /// True until the group starts dying.
    pub fn is_alive(&self) -> bool {
        !self.inner.dying.is_cancelled()
    }

    /// True once every tracked future finished.
    pub fn is_dead(&self) -> bool {
        self.inner.dead.is_cancelled()
    }

    /// Current reason for death, if any was recorded.
    pub fn reason(&self) -> Option<WorkError> {
        self.inner.lock().reason.clone()
    }

    /// Waits until every tracked future finished, then returns the reason.
    pub async fn wait(&self) -> Result<(), WorkError> {
        self.inner.dead.cancelled().await;
        match self.reason() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Inner {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn kill_locked(&self, state: &mut State, reason: Option<WorkError>) {
        if state.reason.is_none() {
            state.reason = reason;
        }
        if !self.dying.is_cancelled() {
            match &state.reason {
                Some(err) => tracing::debug!(label = err.as_label(), reason = %err.as_message(), "task group dying"),
                None => tracing::debug!("task group dying"),
            }
            self.dying.cancel();
        }
    }

    fn finish(&self, res: Result<(), WorkError>) {
        let mut state = self.lock();
        state.alive -= 1;
        if state.alive == 0 || res.is_err() {
            self.kill_locked(&mut state, res.err());
            if state.alive == 0 {
                tracing::debug!("task group dead");
                self.dead.cancel();
            }
        }
    }
}

#[async_trait]
impl CancelSource for TaskGroup {
    fn is_cancelled(&self) -> bool {
        self.inner.dying.is_cancelled()
    }

    async fn cancelled(&self) {
        self.inner.dying.cancelled().await
    }
}

impl Tracker for TaskGroup {
    fn launch(&self, work: BoxWorkFuture<Result<(), WorkError>>) -> Result<(), GroupError> {
        TaskGroup::launch(self, work)
    }
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("TaskGroup")
            .field("alive", &state.alive)
            .field("dying", &self.inner.dying.is_cancelled())
            .field("dead", &self.inner.dead.is_cancelled())
            .field("reason", &state.reason)
            .finish()
    }
}
