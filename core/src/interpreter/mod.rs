//! # Interpreter - Driving Processes Against Executors
//!
//! ## Core Principles
//!
//! 1. **Loop, not recursion**: the simple interpreter is an explicit loop over
//!    process nodes; `Await` is the only point where anything outside the
//!    process runs
//! 2. **Executors run effects**: the process core never performs a request,
//!    it hands it to an `Executor` (or a `Capability`) and feeds the outcome
//!    back into the waiting continuation
//! 3. **Scoped release**: the executor is shut down exactly once when the
//!    walk ends, independent of any cleanup inside the process itself
//!
//! ## Interpreters
//!
//! - [`run`] - synchronous loop over a strict executor
//! - [`Cursor`] - the same loop, one emitted value at a time
//! - [`run_with`] - effect-polymorphic loop over a [`Capability`]
//! - [`run_trampolined`] - `run_with` in the stack-safe [`Io`] effect
//! - [`run_async`] - `run_with` as a future

pub mod capability;
pub mod exec_loop;
pub mod executor;
pub mod future;
pub mod pool;
pub mod trampoline;

#[cfg(test)]
mod tests;

pub use capability::{run_with, Capability};
pub use exec_loop::{advance, run, run_until_done, Cursor, Step};
pub use executor::{from_fn, Executor, ExecutorGuard, FnExecutor};
pub use future::{run_async, AsyncEffect, FutureCapability, Task};
pub use pool::PooledExecutor;
pub use trampoline::{run_trampolined, Io, TrampolineCapability};
