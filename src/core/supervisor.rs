//! # Supervisor: binds a configuration to the supervision loops.
//!
//! [`Supervisor`] is a cheap, cloneable handle around an
//! `Arc<SupervisorConfig>`. Every loop it starts routes contained panics
//! through that config's handlers.
//!
//! ## Entry points
//! | method            | cancel source | returns                 |
//! |-------------------|---------------|-------------------------|
//! | [`spawn`]         | [`CancelSource`] | `JoinHandle<Exit>` at once |
//! | [`run`]           | [`CancelSource`] | [`Exit`] when stopped   |
//! | [`spawn_tracked`] | [`Tracker`]      | `JoinHandle<Exit>` at once |
//! | [`run_tracked`]   | [`Tracker`]      | [`Exit`] when stopped   |
//!
//! The crate-root `supervise*` functions are the same calls on
//! [`Supervisor::global`].
//!
//! [`spawn`]: Supervisor::spawn
//! [`run`]: Supervisor::run
//! [`spawn_tracked`]: Supervisor::spawn_tracked
//! [`run_tracked`]: Supervisor::run_tracked
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use respawn::{Exit, Supervisor, SupervisorConfig, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::new(Arc::new(SupervisorConfig::empty()));
//!     let tries = Arc::new(AtomicU32::new(0));
//!
//!     let work = WorkFn::new("flaky", {
//!         let tries = Arc::clone(&tries);
//!         move || {
//!             let tries = Arc::clone(&tries);
//!             async move {
//!                 if tries.fetch_add(1, Ordering::SeqCst) < 2 {
//!                     panic!("not yet");
//!                 }
//!             }
//!         }
//!     });
//!
//!     let exit = sup.run(CancellationToken::new(), work).await;
//!     assert_eq!(exit, Exit::Completed { attempts: 3 });
//! }
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    cancel::{CancelSource, Tracker},
    core::{
        SupervisorConfig,
        actor::{Exit, run_plain, run_tracked},
    },
    error::WorkError,
    work::Work,
};

/// Starts supervision loops under a shared [`SupervisorConfig`].
#[derive(Clone, Debug)]
pub struct Supervisor {
    config: Arc<SupervisorConfig>,
}

impl Supervisor {
    /// Creates a supervisor using `config` for fault containment.
    pub fn new(config: Arc<SupervisorConfig>) -> Self {
        Self { config }
    }

    /// Supervisor bound to [`SupervisorConfig::global`].
    pub fn global() -> Self {
        Self::new(SupervisorConfig::global())
    }

    /// Configuration used by this supervisor.
    pub fn config(&self) -> &Arc<SupervisorConfig> {
        &self.config
    }

    /// Starts supervising `work` on a new tokio task and returns immediately.
    ///
    /// Dropping the handle detaches the loop; it keeps running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C, W>(&self, cancel: C, work: W) -> JoinHandle<Exit>
    where
        C: CancelSource,
        W: Work<Output = ()>,
    {
        tokio::spawn(run_plain(Arc::clone(&self.config), cancel, work))
    }

    /// Supervises `work` until it returns without panicking or `cancel` fires.
    ///
    /// An attempt still running when `cancel` fires is left to finish on its
    /// own; its outcome is ignored.
    ///
    /// # Panics
    /// Resumes an attempt's panic if the config's re-raise flag is set.
    pub async fn run<C, W>(&self, cancel: C, work: W) -> Exit
    where
        C: CancelSource,
        W: Work<Output = ()>,
    {
        run_plain(Arc::clone(&self.config), cancel, work).await
    }

    /// Tracked variant of [`spawn`](Self::spawn).
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_tracked<T, W>(&self, tracker: T, work: W) -> JoinHandle<Exit>
    where
        T: Tracker,
        W: Work<Output = Result<(), WorkError>>,
    {
        tokio::spawn(run_tracked(Arc::clone(&self.config), tracker, work))
    }

    /// Supervises `work` through `tracker` until it returns or the tracker is dying.
    ///
    /// Every attempt is launched with [`Tracker::launch`], so the tracker
    /// accounts for each restart. An `Err` returned by the work stops
    /// supervision and is handed to the tracker; it is not retried.
    pub async fn run_tracked<T, W>(&self, tracker: T, work: W) -> Exit
    where
        T: Tracker,
        W: Work<Output = Result<(), WorkError>>,
    {
        run_tracked(Arc::clone(&self.config), tracker, work).await
    }
}

impl Default for Supervisor {
    /// Same as [`Supervisor::global`].
    fn default() -> Self {
        Self::global()
    }
}

/// Restarts `work` after every panic until it returns or `cancel` fires.
/// Returns immediately; see [`Supervisor::spawn`].
///
/// Must be called from within a tokio runtime.
pub fn supervise<C, W>(cancel: C, work: W) -> JoinHandle<Exit>
where
    C: CancelSource,
    W: Work<Output = ()>,
{
    Supervisor::global().spawn(cancel, work)
}

/// Like [`supervise`] but completes only when supervision stops.
/// See [`Supervisor::run`].
pub async fn supervise_blocking<C, W>(cancel: C, work: W) -> Exit
where
    C: CancelSource,
    W: Work<Output = ()>,
{
    Supervisor::global().run(cancel, work).await
}

/// Tracked variant of [`supervise`]; see [`Supervisor::spawn_tracked`].
///
/// Must be called from within a tokio runtime.
pub fn supervise_tracked<T, W>(tracker: T, work: W) -> JoinHandle<Exit>
where
    T: Tracker,
    W: Work<Output = Result<(), WorkError>>,
{
    Supervisor::global().spawn_tracked(tracker, work)
}

/// Tracked variant of [`supervise_blocking`]; see [`Supervisor::run_tracked`].
pub async fn supervise_tracked_blocking<T, W>(tracker: T, work: W) -> Exit
where
    T: Tracker,
    W: Work<Output = Result<(), WorkError>>,
{
    Supervisor::global().run_tracked(tracker, work).await
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::{
        cancel::TaskGroup,
        error::GroupError,
        fault::Fault,
        work::{BoxWorkFuture, WorkFn},
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn crash(msg: &str) {
        panic!("{msg}")
    }

    fn fault() -> Result<(), WorkError> {
        panic!("panicked")
    }

    fn out_of_bounds() -> u8 {
        let v: Vec<u8> = Vec::new();
        v[1]
    }

    fn quiet() -> Supervisor {
        Supervisor::new(Arc::new(SupervisorConfig::empty()))
    }

    fn counting(
        counter: &Arc<AtomicU32>,
        body: impl Fn(u32) + Send + Sync + 'static,
    ) -> WorkFn<impl Fn() -> BoxWorkFuture<()> + Send + Sync + 'static> {
        let counter = Arc::clone(counter);
        let body = Arc::new(body);
        WorkFn::new("test-work", move || {
            let counter = Arc::clone(&counter);
            let body = Arc::clone(&body);
            Box::pin(async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                body(n);
            }) as BoxWorkFuture<()>
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_always_panicking_work_restarts_until_cancelled() {
        let counter = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let work = counting(&counter, |_| panic!("always"));

        let handle = quiet().spawn(token.clone(), work);
        tokio::time::timeout(WAIT, async {
            while counter.load(Ordering::SeqCst) < 25 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("loop should keep restarting");

        token.cancel();
        let exit = tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
        assert!(exit.is_cancelled());
        assert!(exit.attempts() >= 25);
    }

    #[tokio::test]
    async fn test_completes_on_attempt_k_without_extra_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let work = counting(&counter, |n| {
            if n < 3 {
                panic!("attempt {n}");
            }
        });

        let exit = tokio::time::timeout(WAIT, quiet().run(CancellationToken::new(), work))
            .await
            .expect("returns after success");

        assert_eq!(exit, Exit::Completed { attempts: 3 });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_clean_work_runs_exactly_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let work = counting(&counter, |_| {});

        let exit = tokio::time::timeout(Duration::from_secs(1), quiet().run(CancellationToken::new(), work))
            .await
            .expect("returns without cancellation");

        assert_eq!(exit, Exit::Completed { attempts: 1 });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_launches_nothing() {
        let counter = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        token.cancel();

        let exit = quiet().run(token, counting(&counter, |_| panic!("never"))).await;

        assert_eq!(exit, Exit::Cancelled { attempts: 0 });
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_in_flight_attempt_is_not_relaunched_after_cancel() {
        let counter = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let work = WorkFn::new("slow-panic", {
            let counter = Arc::clone(&counter);
            let token = token.clone();
            move || {
                let counter = Arc::clone(&counter);
                let token = token.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    token.cancel();
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    crash("late fault");
                }
            }
        });

        let exit = tokio::time::timeout(WAIT, quiet().run(token, work)).await.unwrap();
        assert_eq!(exit, Exit::Cancelled { attempts: 1 });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_counter_reaches_exactly_three() {
        let counter = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let work = counting(&counter, {
            let token = token.clone();
            move |n| {
                if n == 3 {
                    token.cancel();
                }
                panic!("panicked");
            }
        });

        let exit = tokio::time::timeout(WAIT, quiet().run(token, work)).await.unwrap();

        assert_eq!(exit, Exit::Cancelled { attempts: 3 });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_every_fault_reaches_handlers_once() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let cfg = SupervisorConfig::empty().with_handler({
            let seen = Arc::clone(&seen);
            move |fault: &Fault| seen.lock().unwrap().push(fault.to_string())
        });
        let counter = Arc::new(AtomicU32::new(0));
        let work = counting(&counter, |n| {
            if n < 3 {
                panic!("fault {n}");
            }
        });

        let exit = Supervisor::new(Arc::new(cfg))
            .run(CancellationToken::new(), work)
            .await;

        assert!(exit.is_completed());
        assert_eq!(*seen.lock().unwrap(), vec!["fault 1", "fault 2"]);
    }

    #[tokio::test]
    async fn test_reraise_propagates_to_loop_driver() {
        let handled = Arc::new(AtomicU32::new(0));
        let cfg = SupervisorConfig::empty().with_reraise(true).with_handler({
            let handled = Arc::clone(&handled);
            move |_: &Fault| {
                handled.fetch_add(1, Ordering::SeqCst);
            }
        });
        let counter = Arc::new(AtomicU32::new(0));
        let work = counting(&counter, |_| panic!("escalate"));

        let joined = Supervisor::new(Arc::new(cfg))
            .spawn(CancellationToken::new(), work)
            .await;

        let err = joined.expect_err("loop should unwind");
        assert!(err.is_panic());
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tracked_counter_reaches_exactly_three() {
        let group = TaskGroup::new();
        let dying = group.dying();
        group
            .launch(Box::pin(async move {
                dying.cancelled().await;
                Ok(())
            }))
            .unwrap();

        let counter = Arc::new(AtomicU32::new(0));
        let work = WorkFn::new("tracked", {
            let counter = Arc::clone(&counter);
            let group = group.clone();
            move || {
                let counter = Arc::clone(&counter);
                let group = group.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                        group.kill(None);
                    }
                    fault()
                }
            }
        });

        let exit = tokio::time::timeout(WAIT, quiet().run_tracked(group.clone(), work))
            .await
            .unwrap();

        assert_eq!(exit, Exit::Cancelled { attempts: 3 });
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(tokio::time::timeout(WAIT, group.wait()).await.unwrap(), Ok(()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tracked_restarts_when_work_is_alone_in_group() {
        for _ in 0..50 {
            let group = TaskGroup::new();
            let counter = Arc::new(AtomicU32::new(0));
            let work = WorkFn::new("alone", {
                let counter = Arc::clone(&counter);
                let group = group.clone();
                move || {
                    let counter = Arc::clone(&counter);
                    let group = group.clone();
                    async move {
                        if counter.fetch_add(1, Ordering::SeqCst) + 1 == 5 {
                            group.kill(None);
                        }
                        fault()
                    }
                }
            });

            let exit = tokio::time::timeout(WAIT, quiet().run_tracked(group.clone(), work))
                .await
                .unwrap();

            assert_eq!(exit, Exit::Cancelled { attempts: 5 });
            assert_eq!(tokio::time::timeout(WAIT, group.wait()).await.unwrap(), Ok(()));
            assert_eq!(counter.load(Ordering::SeqCst), 5);
        }
    }

    #[tokio::test]
    async fn test_tracked_error_stops_after_one_attempt_and_kills_group() {
        let group = TaskGroup::new();
        let counter = Arc::new(AtomicU32::new(0));
        let work = WorkFn::new("tracked-err", {
            let counter = Arc::clone(&counter);
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(WorkError::fail("bad config"))
                }
            }
        });

        let exit = quiet().run_tracked(group.clone(), work).await;

        assert_eq!(exit, Exit::Completed { attempts: 1 });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let reason = tokio::time::timeout(WAIT, group.wait()).await.unwrap();
        assert_eq!(reason, Err(WorkError::fail("bad config")));
    }

    #[tokio::test]
    async fn test_tracked_dead_group_stops_without_launching() {
        let group = TaskGroup::new();
        group.launch(Box::pin(async { Ok(()) })).unwrap();
        tokio::time::timeout(WAIT, group.wait()).await.unwrap().unwrap();

        // dead groups are dying too, so the loop never gets to launch
        let work = WorkFn::new("late", || async { Ok::<(), WorkError>(()) });
        let exit = quiet().run_tracked(group, work).await;
        assert_eq!(exit, Exit::Cancelled { attempts: 0 });
    }

    #[tokio::test]
    async fn test_tracked_reraise_escalates_to_group() {
        let group = TaskGroup::new();
        let cfg = SupervisorConfig::empty().with_reraise(true);
        let work = WorkFn::new("escalating", || async {
            let _ = out_of_bounds();
            Ok::<(), WorkError>(())
        });

        let exit = Supervisor::new(Arc::new(cfg)).run_tracked(group.clone(), work).await;

        assert_eq!(exit, Exit::Abandoned { attempts: 1 });
        let reason = tokio::time::timeout(WAIT, group.wait()).await.unwrap();
        assert!(matches!(reason, Err(WorkError::Panicked { .. })));
    }

    struct RefusingTracker;

    #[async_trait::async_trait]
    impl CancelSource for RefusingTracker {
        fn is_cancelled(&self) -> bool {
            false
        }

        async fn cancelled(&self) {
            std::future::pending::<()>().await
        }
    }

    impl Tracker for RefusingTracker {
        fn launch(&self, _work: BoxWorkFuture<Result<(), WorkError>>) -> Result<(), GroupError> {
            Err(GroupError::Dead)
        }
    }

    #[tokio::test]
    async fn test_refused_launch_abandons() {
        let work = WorkFn::new("refused", || async { Ok::<(), WorkError>(()) });
        let exit = quiet().run_tracked(RefusingTracker, work).await;
        assert_eq!(exit, Exit::Abandoned { attempts: 1 });
    }

    #[tokio::test]
    async fn test_global_entry_points() {
        let counter = Arc::new(AtomicU32::new(0));
        let work = counting(&counter, |n| {
            if n == 1 {
                panic!("first try");
            }
        });

        let exit = tokio::time::timeout(WAIT, supervise(CancellationToken::new(), work))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit, Exit::Completed { attempts: 2 });

        let group = TaskGroup::new();
        let work = WorkFn::new("global-tracked", || async { Ok::<(), WorkError>(()) });
        let exit = supervise_tracked_blocking(group.clone(), work).await;
        assert_eq!(exit, Exit::Completed { attempts: 1 });
        assert_eq!(tokio::time::timeout(WAIT, group.wait()).await.unwrap(), Ok(()));
    }
}
