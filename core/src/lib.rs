pub mod cli;
pub mod config;
pub mod interpreter;
pub mod process;
pub mod source;

#[cfg(test)]
mod test_helpers;

// Re-export the core model
pub use process::{resource, Cause, Effect, Failure, Outcome, Pipe, Process, RunError};

// Re-export the interpreters most callers need
pub use interpreter::{run, run_async, run_trampolined, Cursor, Executor};
