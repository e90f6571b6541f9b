//! # Process - Resumable Effectful Sequences
//!
//! A `Process<F, O>` lazily describes a sequence of `O` outputs interleaved
//! with effect requests of type `F`.
//!
//! ## Core Principles
//!
//! 1. **Three nodes**: `Emit` produces a value, `Await` requests an effect and
//!    branches on its outcome, `Halt` ends with a `Cause`
//! 2. **Pure construction**: combinators build new processes and never run
//!    effects; an interpreter walks the result exactly once
//! 3. **Explicit causes**: `End` and `Kill` are sentinels distinguished from
//!    failures by pattern matching, never by identity
//! 4. **Guaranteed cleanup**: `on_complete` / `resource` run their cleanup
//!    exactly once under every cause, immune to `Kill`

mod algebra;
mod finalizer;
pub mod pipe;
pub mod types;

#[cfg(test)]
mod tests;

pub use finalizer::resource;
pub use pipe::Pipe;
pub use types::{Cause, Effect, Failure, Outcome, Process, Recv, RunError, Tail};
