//! # Units of work.
//!
//! - [`Work`] - trait for restartable work producing one future per attempt
//! - [`WorkFn`] - closure-backed implementation
//! - [`WorkRef`] / [`TrackedWorkRef`] - shared handles (`Arc<dyn Work<..>>`)

mod unit;
mod work_fn;

pub use unit::{BoxWorkFuture, TrackedWorkRef, Work, WorkRef};
pub use work_fn::WorkFn;
