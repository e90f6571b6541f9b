//! In-memory source executor

use super::{HandleId, SourceOp, SourceReply};
use crate::interpreter::Executor;
use crate::process::Failure;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Everything a `MemorySource` was asked to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLog {
    /// Names passed to successful opens, in order
    pub opened: Vec<String>,
    /// Handles passed to successful closes, in order
    pub closed: Vec<HandleId>,
    pub reads: usize,
    pub shutdowns: usize,
}

impl SourceLog {
    /// Handles opened but never closed
    pub fn leaked(&self) -> usize {
        self.opened.len().saturating_sub(self.closed.len())
    }
}

#[derive(Debug)]
struct OpenHandle {
    name: String,
    position: usize,
}

/// Serves named lists of lines
#[derive(Debug, Default)]
pub struct MemorySource {
    sources: HashMap<String, Vec<String>>,
    handles: HashMap<HandleId, OpenHandle>,
    next_handle: HandleId,
    fail_read_at: Option<usize>,
    fail_close: bool,
    log: Rc<RefCell<SourceLog>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<I, S>(mut self, name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources
            .insert(name.into(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Fail the read of the line at `index` (zero-based) of any handle
    pub fn fail_read_at(mut self, index: usize) -> Self {
        self.fail_read_at = Some(index);
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Shared view of the log, readable after the executor has been consumed
    pub fn log(&self) -> Rc<RefCell<SourceLog>> {
        Rc::clone(&self.log)
    }

    fn open(&mut self, name: String) -> Result<SourceReply, Failure> {
        if !self.sources.contains_key(&name) {
            return Err(Failure::effect(format!("no such source: {name}")));
        }
        self.next_handle += 1;
        let handle = self.next_handle;
        self.log.borrow_mut().opened.push(name.clone());
        self.handles.insert(handle, OpenHandle { name, position: 0 });
        Ok(SourceReply::Opened(handle))
    }

    fn read_line(&mut self, handle: HandleId) -> Result<SourceReply, Failure> {
        let open = self
            .handles
            .get_mut(&handle)
            .ok_or_else(|| Failure::effect(format!("read from unknown handle {handle}")))?;
        self.log.borrow_mut().reads += 1;

        if self.fail_read_at == Some(open.position) {
            return Err(Failure::effect(format!(
                "read failed at line {} of {}",
                open.position, open.name
            )));
        }

        let line = self
            .sources
            .get(&open.name)
            .and_then(|lines| lines.get(open.position))
            .cloned();
        if line.is_some() {
            open.position += 1;
        }
        Ok(SourceReply::Line(line))
    }

    fn close(&mut self, handle: HandleId) -> Result<SourceReply, Failure> {
        if self.handles.remove(&handle).is_none() {
            return Err(Failure::effect(format!("close of unknown handle {handle}")));
        }
        self.log.borrow_mut().closed.push(handle);
        if self.fail_close {
            return Err(Failure::effect(format!("close failed for handle {handle}")));
        }
        Ok(SourceReply::Closed)
    }
}

impl Executor<SourceOp> for MemorySource {
    fn execute(&mut self, request: SourceOp) -> Result<SourceReply, Failure> {
        trace!(?request, "memory source");
        match request {
            SourceOp::Open(name) => self.open(name),
            SourceOp::ReadLine(handle) => self.read_line(handle),
            SourceOp::Close(handle) => self.close(handle),
        }
    }

    fn shutdown(&mut self) {
        self.log.borrow_mut().shutdowns += 1;
    }
}
