//! Type definitions for the process algebra
//!
//! - Process nodes (Emit, Await, Halt) and the `Effect` request contract
//! - Termination causes (End, Kill, Failed) and failures

pub mod cause;
pub mod node;

pub use cause::{Cause, Failure, RunError};
pub use node::{Effect, Outcome, Process, Recv, Tail};
