//! # Supervision loops: restart on panic until done or cancelled.
//!
//! Keeps one unit of work alive by relaunching it after every contained
//! panic. Two flavours share the same state machine:
//! - **plain** ([`run_plain`]): waits on the attempt *and* the cancel source;
//! - **tracked** ([`run_tracked`]): launches attempts through a [`Tracker`]
//!   and only polls its dying signal between attempts.
//!
//! ## State machine
//! ```text
//!         ┌──────────── contained panic, not cancelled ─────────────┐
//!         ▼                                                         │
//! Idle ──► AttemptRunning ──► normal return ──► Stopped(Completed)  │
//!              │  ▲                                                 │
//!              │  └──────────────── Restarting ◄────────────────────┘
//!              └──► cancel observed ──► Stopped(Cancelled)
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**: attempt N+1 is spawned only after attempt
//!   N reported back to the loop.
//! - Cancellation wins over a pending restart when both are ready.
//! - Cancellation never aborts a running attempt; in plain mode its handle is
//!   dropped and its outcome ignored.
//! - A returned `Err` from tracked work is **not** retried; it is left to the
//!   tracker.
//! - A faulted tracked attempt is held open until its successor is launched,
//!   so the tracker never sees zero live attempts between restarts.
//! - No backoff, no restart limit.

use std::{panic, sync::Arc};

use tokio::sync::oneshot;

use crate::{
    cancel::{CancelSource, Tracker},
    core::{
        SupervisorConfig,
        contain::{Contained, contain, contain_async},
    },
    error::WorkError,
    work::{BoxWorkFuture, Work},
};

/// How a supervision loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// An attempt returned without panicking.
    Completed {
        /// Attempts launched, including the successful one.
        attempts: u64,
    },
    /// The cancel source fired before an attempt completed.
    Cancelled {
        /// Attempts launched before cancellation was observed.
        attempts: u64,
    },
    /// The last attempt ended without reporting back: the runtime dropped it,
    /// the tracker refused it, or its panic was re-raised into the tracker.
    Abandoned {
        /// Attempts launched, including the lost one.
        attempts: u64,
    },
}

impl Exit {
    /// Number of attempts launched by the loop.
    pub fn attempts(&self) -> u64 {
        match *self {
            Exit::Completed { attempts }
            | Exit::Cancelled { attempts }
            | Exit::Abandoned { attempts } => attempts,
        }
    }

    /// True if the work finished on its own.
    pub fn is_completed(&self) -> bool {
        matches!(self, Exit::Completed { .. })
    }

    /// True if the loop stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Exit::Cancelled { .. })
    }
}

/// Plain loop: one attempt per tokio task, raced against `cancel`.
///
/// # Panics
/// If [`SupervisorConfig::reraise`] is set, the first panic of an attempt is
/// resumed here after its handlers ran.
pub(crate) async fn run_plain<C, W>(config: Arc<SupervisorConfig>, cancel: C, work: W) -> Exit
where
    C: CancelSource,
    W: Work<Output = ()>,
{
    let mut attempts: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            tracing::debug!(work = work.name(), attempts, "cancelled; not restarting");
            return Exit::Cancelled { attempts };
        }

        attempts += 1;
        tracing::trace!(work = work.name(), attempt = attempts, "attempt starting");
        let Some(fut) = start(&config, &work, attempts) else {
            tokio::task::yield_now().await;
            continue;
        };
        let cfg = Arc::clone(&config);
        let mut attempt = tokio::spawn(async move { contain_async(&cfg, fut, &[]).await });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(work = work.name(), attempts, "cancelled; attempt left running");
                return Exit::Cancelled { attempts };
            }
            joined = &mut attempt => match joined {
                Ok(Contained::Completed(())) => {
                    tracing::debug!(work = work.name(), attempts, "completed");
                    return Exit::Completed { attempts };
                }
                Ok(Contained::Faulted) => {
                    tracing::debug!(work = work.name(), attempt = attempts, "attempt panicked; restarting");
                }
                Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                Err(_) => {
                    tracing::debug!(work = work.name(), attempts, "attempt dropped by runtime");
                    return Exit::Abandoned { attempts };
                }
            }
        }
    }
}

/// Reported by a tracked attempt back to its loop.
enum Outcome {
    /// The work returned; its result goes to the tracker.
    Returned,
    /// The work panicked. The attempt stays tracked until the sender is
    /// dropped, which the loop does once the successor is launched or the
    /// loop stops.
    Faulted(oneshot::Sender<()>),
}

/// Tracked loop: attempts launched through `tracker`, dying polled between them.
pub(crate) async fn run_tracked<T, W>(config: Arc<SupervisorConfig>, tracker: T, work: W) -> Exit
where
    T: Tracker,
    W: Work<Output = Result<(), WorkError>>,
{
    let mut attempts: u64 = 0;
    // keeps the previous faulted attempt inside the tracker until its successor is launched
    let mut predecessor: Option<oneshot::Sender<()>> = None;

    loop {
        if tracker.is_cancelled() {
            tracing::debug!(work = work.name(), attempts, "tracker dying; not restarting");
            return Exit::Cancelled { attempts };
        }

        attempts += 1;
        tracing::trace!(work = work.name(), attempt = attempts, "attempt starting");
        let Some(fut) = start(&config, &work, attempts) else {
            tokio::task::yield_now().await;
            continue;
        };
        let (done_tx, done_rx) = oneshot::channel::<Outcome>();
        let cfg = Arc::clone(&config);
        let launched = tracker.launch(Box::pin(async move {
            match contain_async(&cfg, fut, &[]).await {
                Contained::Completed(res) => {
                    let _ = done_tx.send(Outcome::Returned);
                    res
                }
                Contained::Faulted => {
                    let (release_tx, release_rx) = oneshot::channel();
                    if done_tx.send(Outcome::Faulted(release_tx)).is_ok() {
                        let _ = release_rx.await;
                    }
                    Ok(())
                }
            }
        }));
        drop(predecessor.take());
        if let Err(err) = launched {
            tracing::warn!(work = work.name(), error = %err, "tracker refused attempt");
            return Exit::Abandoned { attempts };
        }

        match done_rx.await {
            Ok(Outcome::Returned) => {
                tracing::debug!(work = work.name(), attempts, "completed");
                return Exit::Completed { attempts };
            }
            Ok(Outcome::Faulted(release)) => {
                tracing::debug!(work = work.name(), attempt = attempts, "attempt panicked; restarting");
                predecessor = Some(release);
            }
            Err(_) => {
                tracing::debug!(work = work.name(), attempts, "attempt lost to tracker");
                return Exit::Abandoned { attempts };
            }
        }
    }
}

/// Builds the attempt's future; a panic while building it counts as a fault.
fn start<W: Work>(config: &SupervisorConfig, work: &W, attempt: u64) -> Option<BoxWorkFuture<W::Output>> {
    let fut = contain(config, || work.spawn(), &[]).completed();
    if fut.is_none() {
        tracing::debug!(work = work.name(), attempt, "attempt panicked before start; restarting");
    }
    fut
}
