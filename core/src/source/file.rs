//! File-backed source executor

use super::{HandleId, SourceOp, SourceReply};
use crate::interpreter::Executor;
use crate::process::Failure;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Reads sources as paths relative to a root directory
///
/// Absolute names are used as they are.
#[derive(Debug)]
pub struct FileSource {
    root: PathBuf,
    handles: HashMap<HandleId, (PathBuf, Lines<BufReader<File>>)>,
    next_handle: HandleId,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Number of handles currently open
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Executor<SourceOp> for FileSource {
    fn execute(&mut self, request: SourceOp) -> Result<SourceReply, Failure> {
        match request {
            SourceOp::Open(name) => {
                let path = self.root.join(&name);
                let file = File::open(&path)
                    .map_err(|e| Failure::effect(format!("failed to open {}: {e}", path.display())))?;
                self.next_handle += 1;
                debug!(handle = self.next_handle, path = %path.display(), "opened file");
                self.handles
                    .insert(self.next_handle, (path, BufReader::new(file).lines()));
                Ok(SourceReply::Opened(self.next_handle))
            }
            SourceOp::ReadLine(handle) => {
                let (path, lines) = self
                    .handles
                    .get_mut(&handle)
                    .ok_or_else(|| Failure::effect(format!("read from unknown handle {handle}")))?;
                match lines.next() {
                    Some(Ok(line)) => Ok(SourceReply::Line(Some(line))),
                    Some(Err(e)) => Err(Failure::effect(format!(
                        "failed to read {}: {e}",
                        path.display()
                    ))),
                    None => Ok(SourceReply::Line(None)),
                }
            }
            SourceOp::Close(handle) => match self.handles.remove(&handle) {
                Some((path, _)) => {
                    debug!(handle, path = %path.display(), "closed file");
                    Ok(SourceReply::Closed)
                }
                None => Err(Failure::effect(format!("close of unknown handle {handle}"))),
            },
        }
    }

    fn shutdown(&mut self) {
        for (handle, (path, _)) in self.handles.drain() {
            warn!(handle, path = %path.display(), "file left open at shutdown");
        }
    }
}
