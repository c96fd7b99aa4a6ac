//! # Example: Tracked supervision with a TaskGroup
//!
//! A listener keeps crashing; after a few restarts the group is killed from
//! outside. Every attempt is launched through the group, so `wait()` only
//! returns once the last attempt is gone.
//!
//! Run with:
//! ```bash
//! cargo run --example task_group
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use respawn::{Supervisor, SupervisorConfig, TaskGroup, WorkError, WorkFn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    std::panic::set_hook(Box::new(|_| {}));

    let group = TaskGroup::new();
    let sup = Supervisor::new(Arc::new(SupervisorConfig::new()));

    let attempts = Arc::new(AtomicU32::new(0));
    let listener = WorkFn::new("listener", {
        let attempts = Arc::clone(&attempts);
        move || {
            let attempts = Arc::clone(&attempts);
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                println!("[listener] attempt {n}");
                tokio::time::sleep(Duration::from_millis(50)).await;
                if n > 0 {
                    panic!("socket closed under us");
                }
                Ok::<(), WorkError>(())
            }
        }
    });

    let handle = sup.spawn_tracked(group.clone(), listener);

    tokio::time::sleep(Duration::from_millis(180)).await;
    println!("[main] killing group");
    group.kill(Some(WorkError::fail("operator shutdown")));

    let exit = handle.await?;
    println!("[main] supervision: {exit:?}");
    match group.wait().await {
        Ok(()) => println!("[main] group finished cleanly"),
        Err(reason) => println!("[main] group died: {reason}"),
    }
    Ok(())
}
