//! Core execution loop
//!
//! Drives a process against a synchronous executor, one node at a time.
//!
//! ## Function Organization
//! 1. run() - Top-level driver (owns and releases the executor)
//! 2. run_until_done() - Collects every output until the process halts
//! 3. advance() - Runs requests until the next emitted value or halt
//! 4. Cursor - Partial draining with cancellation

use super::executor::{Executor, ExecutorGuard};
use crate::process::{Cause, Effect, Process, RunError};
use std::fmt;
use tracing::{debug, trace, warn};

/* ===================== Step Result ===================== */

/// Result of advancing a process to its next observable point
pub enum Step<F: Effect, O> {
    /// The process produced a value; `rest` is what follows it
    Emit { head: O, rest: Process<F, O> },
    /// The process halted
    Halt(Cause),
}

impl<F: Effect, O: fmt::Debug> fmt::Debug for Step<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Emit { head, .. } => f.debug_struct("Emit").field("head", head).finish_non_exhaustive(),
            Step::Halt(cause) => f.debug_tuple("Halt").field(cause).finish(),
        }
    }
}

/* ===================== Public API ===================== */

/// Run a process to completion and collect its outputs
///
/// The executor is released exactly once when the walk ends. A clean end
/// returns every emitted value; any other cause returns only the error.
pub fn run<F, O, E>(executor: E, process: Process<F, O>) -> Result<Vec<O>, RunError>
where
    F: Effect,
    O: 'static,
    E: Executor<F>,
{
    let mut executor = ExecutorGuard::new(executor);
    let result = run_until_done(&mut executor, process);
    executor.release();
    result
}

/// Run a process to completion against a borrowed executor
///
/// The executor is not released; callers that own it decide when.
pub fn run_until_done<F, O, E>(executor: &mut E, process: Process<F, O>) -> Result<Vec<O>, RunError>
where
    F: Effect,
    O: 'static,
    E: Executor<F>,
{
    let mut emitted = Vec::new();
    let mut current = process;

    loop {
        match advance(executor, current) {
            Step::Emit { head, rest } => {
                emitted.push(head);
                trace!(emitted = emitted.len(), "process emitted");
                current = rest;
            }
            Step::Halt(cause) => {
                debug!(?cause, emitted = emitted.len(), "process halted");
                return match RunError::from_cause(cause) {
                    None => Ok(emitted),
                    Some(error) => Err(error),
                };
            }
        }
    }
}

/// Run requests until the process emits or halts
///
/// Each request's outcome, success or failure, is fed back into its
/// continuation under `catching`.
pub fn advance<F, O, E>(executor: &mut E, process: Process<F, O>) -> Step<F, O>
where
    F: Effect,
    O: 'static,
    E: Executor<F>,
{
    let mut current = process;
    loop {
        match current {
            Process::Emit { head, tail } => return Step::Emit { head, rest: tail.into_process() },
            Process::Await { request, recv } => {
                let outcome = executor.execute(request).map_err(Cause::Failed);
                current = Process::catching(move || recv(outcome));
            }
            Process::Halt(cause) => return Step::Halt(cause),
        }
    }
}

/* ===================== Cursor ===================== */

/// Pull-based consumption of a running process
///
/// Yields each emitted value as it is produced. A failure is yielded once,
/// after the values emitted before it. Cancelling (or dropping) an
/// unfinished cursor kills the process and runs its remaining cleanup
/// before the executor is released.
pub struct Cursor<F: Effect, O: 'static, E: Executor<F>> {
    executor: ExecutorGuard<F, E>,
    current: Option<Process<F, O>>,
}

impl<F: Effect, O: 'static, E: Executor<F>> Cursor<F, O, E> {
    pub fn new(executor: E, process: Process<F, O>) -> Self {
        Self {
            executor: ExecutorGuard::new(executor),
            current: Some(process),
        }
    }

    /// Whether the process has halted (or been cancelled)
    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Stop early: kill the process, run its cleanup, release the executor
    pub fn cancel(mut self) -> Result<(), RunError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), RunError> {
        let result = match self.current.take() {
            Some(process) => {
                debug!("cancelling unfinished process");
                run_until_done(&mut self.executor, process.kill::<O>()).map(|_| ())
            }
            None => Ok(()),
        };
        self.executor.release();
        result
    }
}

impl<F: Effect, O: 'static, E: Executor<F>> Iterator for Cursor<F, O, E> {
    type Item = Result<O, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        let process = self.current.take()?;
        match advance(&mut self.executor, process) {
            Step::Emit { head, rest } => {
                self.current = Some(rest);
                Some(Ok(head))
            }
            Step::Halt(cause) => {
                debug!(?cause, "cursor reached halt");
                self.executor.release();
                RunError::from_cause(cause).map(Err)
            }
        }
    }
}

impl<F: Effect, O: 'static, E: Executor<F>> Drop for Cursor<F, O, E> {
    fn drop(&mut self) {
        if self.current.is_none() {
            return;
        }
        if let Err(error) = self.finish() {
            warn!(%error, "cleanup of a dropped cursor failed");
        }
    }
}
