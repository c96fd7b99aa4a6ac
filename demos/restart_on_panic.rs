//! # Example: Restart on panic
//!
//! A worker that panics on its first attempts and succeeds afterwards.
//! Every panic is reported through a custom handler and the default
//! `LogHandler` (printed via `tracing`).
//!
//! Run with:
//! ```bash
//! RUST_LOG=respawn=debug cargo run --example restart_on_panic
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use respawn::{Fault, Supervisor, SupervisorConfig, WorkFn};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "respawn=debug".into()))
        .init();
    std::panic::set_hook(Box::new(|_| {}));

    let faults = Arc::new(AtomicU32::new(0));
    let cfg = SupervisorConfig::new().with_handler({
        let faults = Arc::clone(&faults);
        move |fault: &Fault| {
            let n = faults.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[fault #{n}] {fault}");
        }
    });
    let sup = Supervisor::new(Arc::new(cfg));

    let attempts = Arc::new(AtomicU32::new(0));
    let worker = WorkFn::new("flaky-worker", {
        let attempts = Arc::clone(&attempts);
        move || {
            let attempts = Arc::clone(&attempts);
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                println!("[worker] attempt {n}");
                if n < 4 {
                    let peers: Vec<&str> = Vec::new();
                    println!("[worker] talking to {}", peers[n as usize]);
                }
                println!("[worker] finished cleanly");
            }
        }
    });

    let exit = sup.run(CancellationToken::new(), worker).await;
    println!("[supervisor] {exit:?}");
    println!("[supervisor] faults handled: {}", faults.load(Ordering::SeqCst));
    Ok(())
}
