//! # Sources - Line-Oriented Resources
//!
//! `SourceOp` is a small effect for reading named, line-oriented sources
//! through handles. [`lines`] is the canonical resource-safe reader built on
//! it: the handle is opened once, read until exhausted, and closed exactly
//! once however reading stops.
//!
//! Executors:
//! - [`MemorySource`] - in-memory lines with failure injection and a log
//! - [`FileSource`] - files on disk
//!
//! [`ticks`] is an unrelated timed source built on [`Task`], used to
//! exercise the asynchronous interpreters.
//!
//! [`Task`]: crate::interpreter::Task

pub mod file;
pub mod memory;
pub mod ticker;


pub use file::FileSource;
pub use memory::{MemorySource, SourceLog};
pub use ticker::ticks;

use crate::process::{resource, Effect, Failure, Process};
use serde::{Deserialize, Serialize};

pub type HandleId = u64;

/// A request against a line-oriented source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceOp {
    /// Open the named source
    Open(String),
    /// Read the next line; `Line(None)` once exhausted
    ReadLine(HandleId),
    Close(HandleId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceReply {
    Opened(HandleId),
    Line(Option<String>),
    Closed,
}

impl Effect for SourceOp {
    type Output = SourceReply;
}

/// Emit every line of `name`, closing it exactly once afterwards
pub fn lines(name: impl Into<String>) -> Process<SourceOp, String> {
    resource(
        SourceOp::Open(name.into()),
        |reply| match reply {
            SourceReply::Opened(handle) => read_from(handle),
            other => unexpected("Open", other),
        },
        |reply| match reply {
            SourceReply::Opened(handle) => Process::eval_(SourceOp::Close(*handle)),
            _ => Process::halt(),
        },
    )
}

fn read_from(handle: HandleId) -> Process<SourceOp, String> {
    Process::awaiting(SourceOp::ReadLine(handle), move |outcome| match outcome {
        Ok(SourceReply::Line(Some(line))) => {
            Process::emit(line).append_with(move || read_from(handle))
        }
        Ok(SourceReply::Line(None)) => Process::halt(),
        Ok(other) => unexpected("ReadLine", other),
        Err(cause) => Process::Halt(cause),
    })
}

fn unexpected<O: 'static>(op: &str, reply: SourceReply) -> Process<SourceOp, O> {
    Process::fail(Failure::effect(format!(
        "unexpected reply to {op}: {reply:?}"
    )))
}
