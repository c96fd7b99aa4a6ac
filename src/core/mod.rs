//! Runtime core: containment, configuration and the supervision loops.
//!
//! Internal modules:
//! - [`config`]: shared handler registry, error sink and re-raise flag;
//! - [`contain`]: runs work in a protected scope and dispatches faults;
//! - [`actor`]: the restart-on-panic loops (plain and tracked);
//! - [`supervisor`]: public entry points binding a config to the loops.

mod actor;
mod config;
mod contain;
mod supervisor;

pub use actor::Exit;
pub use config::SupervisorConfig;
pub use contain::{Contained, contain, contain_async};
pub use supervisor::{
    Supervisor, supervise, supervise_blocking, supervise_tracked, supervise_tracked_blocking,
};
