//! The process sum type and the effect-request contract

use super::cause::Cause;
use std::fmt;

/// An effect request: an opaque description of one action
///
/// The process core never runs a request itself. It only hands requests to
/// an executor and feeds the outcome back into the awaiting continuation.
/// Requests must be `Clone` because a finalizer re-issues its pending request
/// when it is asked to stop.
pub trait Effect: Clone + fmt::Debug + 'static {
    /// What running this request yields on success
    type Output: 'static;
}

/// Outcome of a request as seen by an awaiting continuation
pub type Outcome<A> = Result<A, Cause>;

/// Continuation stored in an `Await` node
pub type Recv<F, O> = Box<dyn FnOnce(Outcome<<F as Effect>::Output>) -> Process<F, O>>;

/// A lazy, resumable sequence of outputs interleaved with effect requests
pub enum Process<F: Effect, O> {
    /// Produce `head`, then continue as `tail`
    Emit { head: O, tail: Tail<F, O> },
    /// Run `request`, then continue with whatever `recv` builds from its outcome
    Await { request: F, recv: Recv<F, O> },
    /// Terminal node
    Halt(Cause),
}

impl<F: Effect, O: fmt::Debug> fmt::Debug for Process<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Emit { head, .. } => f.debug_struct("Emit").field("head", head).finish_non_exhaustive(),
            Process::Await { request, .. } => {
                f.debug_struct("Await").field("request", request).finish_non_exhaustive()
            }
            Process::Halt(cause) => f.debug_tuple("Halt").field(cause).finish(),
        }
    }
}

/* ===================== Emit chains ===================== */

/// Owned continuation of an `Emit` node
///
/// Dropping a chain unlinks it node by node, so discarding a long unconsumed
/// run of `Emit`s does not recurse.
pub struct Tail<F: Effect, O>(Option<Box<Process<F, O>>>);

impl<F: Effect, O> Tail<F, O> {
    pub fn new(process: Process<F, O>) -> Self {
        Tail(Some(Box::new(process)))
    }

    pub fn into_process(mut self) -> Process<F, O> {
        match self.0.take() {
            Some(process) => *process,
            None => Process::Halt(Cause::End),
        }
    }
}

impl<F: Effect, O> Drop for Tail<F, O> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            next = match *node {
                Process::Emit { mut tail, .. } => tail.0.take(),
                _ => None,
            };
        }
    }
}

/// Everything after a run of `Emit` nodes
pub(crate) enum Rest<F: Effect, O> {
    Await { request: F, recv: Recv<F, O> },
    Halt(Cause),
}

impl<F: Effect, O> Rest<F, O> {
    pub(crate) fn into_process(self) -> Process<F, O> {
        match self {
            Rest::Await { request, recv } => Process::Await { request, recv },
            Rest::Halt(cause) => Process::Halt(cause),
        }
    }
}

impl<F: Effect, O> Process<F, O> {
    /// Split off the leading emitted values without recursing
    pub(crate) fn split_emits(self) -> (Vec<O>, Rest<F, O>) {
        let mut heads = Vec::new();
        let mut current = self;
        loop {
            match current {
                Process::Emit { head, tail } => {
                    heads.push(head);
                    current = tail.into_process();
                }
                Process::Await { request, recv } => return (heads, Rest::Await { request, recv }),
                Process::Halt(cause) => return (heads, Rest::Halt(cause)),
            }
        }
    }

    /// Put `heads` back in front of `rest`
    pub(crate) fn prepend(heads: Vec<O>, rest: Process<F, O>) -> Process<F, O> {
        heads.into_iter().rev().fold(rest, |tail, head| Process::Emit {
            head,
            tail: Tail::new(tail),
        })
    }
}
