//! Single-input transducers and piping (`|>`)
//!
//! A `Pipe<I, O>` is a process whose only request is "give me the next
//! input". Feeding a source through a pipe consumes the source one step at a
//! time; when the pipe stops early the source is killed so its finalizers
//! still run.

use super::types::cause::catch_panic;
use super::types::{Cause, Effect, Failure, Process};
use std::fmt;
use std::rc::Rc;

/// Continuation of a pipe waiting for input
pub type PipeRecv<I, O> = Box<dyn FnOnce(Result<I, Cause>) -> Pipe<I, O>>;

/// Transducer from `I` values to `O` values
pub enum Pipe<I, O> {
    Emit { head: O, tail: PipeTail<I, O> },
    Await { recv: PipeRecv<I, O> },
    Halt(Cause),
}

/// Owned continuation of a pipe `Emit`; dropped iteratively
pub struct PipeTail<I, O>(Option<Box<Pipe<I, O>>>);

impl<I, O> PipeTail<I, O> {
    fn new(pipe: Pipe<I, O>) -> Self {
        PipeTail(Some(Box::new(pipe)))
    }

    fn into_pipe(mut self) -> Pipe<I, O> {
        match self.0.take() {
            Some(pipe) => *pipe,
            None => Pipe::Halt(Cause::End),
        }
    }
}

impl<I, O> Drop for PipeTail<I, O> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            next = match *node {
                Pipe::Emit { mut tail, .. } => tail.0.take(),
                _ => None,
            };
        }
    }
}

impl<I, O: fmt::Debug> fmt::Debug for Pipe<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipe::Emit { head, .. } => f.debug_struct("Emit").field("head", head).finish_non_exhaustive(),
            Pipe::Await { .. } => f.write_str("Await"),
            Pipe::Halt(cause) => f.debug_tuple("Halt").field(cause).finish(),
        }
    }
}

impl<I: 'static, O: 'static> Pipe<I, O> {
    pub fn emit(head: O, tail: Pipe<I, O>) -> Self {
        Pipe::Emit {
            head,
            tail: PipeTail::new(tail),
        }
    }

    pub fn halt() -> Self {
        Pipe::Halt(Cause::End)
    }

    /// Evaluate a pipe-producing thunk, turning a panic into `Halt`
    pub fn catching<T>(thunk: T) -> Self
    where
        T: FnOnce() -> Pipe<I, O>,
    {
        match catch_panic(thunk) {
            Ok(pipe) => pipe,
            Err(message) => Pipe::Halt(Cause::Failed(Failure::continuation(message))),
        }
    }

    /// Wait for one input; halt cleanly when the input is exhausted
    pub fn await1<R>(recv: R) -> Self
    where
        R: FnOnce(I) -> Pipe<I, O> + 'static,
    {
        Self::await1_or(recv, Pipe::halt)
    }

    /// Wait for one input; continue with `fallback` when the input ends cleanly
    ///
    /// `Kill` and failures from upstream halt the pipe with the same cause.
    pub fn await1_or<R, E>(recv: R, fallback: E) -> Self
    where
        R: FnOnce(I) -> Pipe<I, O> + 'static,
        E: FnOnce() -> Pipe<I, O> + 'static,
    {
        Pipe::Await {
            recv: Box::new(move |input| match input {
                Ok(value) => Pipe::catching(move || recv(value)),
                Err(Cause::End) => Pipe::catching(fallback),
                Err(cause) => Pipe::Halt(cause),
            }),
        }
    }
}

/* ===================== Stock pipes ===================== */

/// Pass every input through unchanged
pub fn id<I: 'static>() -> Pipe<I, I> {
    lift(|value| value)
}

/// Apply `f` to every input
pub fn lift<I: 'static, O: 'static>(f: impl Fn(I) -> O + 'static) -> Pipe<I, O> {
    lift_shared(Rc::new(f))
}

fn lift_shared<I: 'static, O: 'static>(f: Rc<dyn Fn(I) -> O>) -> Pipe<I, O> {
    Pipe::await1(move |value| {
        let head = f(value);
        Pipe::emit(head, lift_shared(f))
    })
}

/// Keep the inputs matching `keep`
pub fn filter<I: 'static>(keep: impl Fn(&I) -> bool + 'static) -> Pipe<I, I> {
    filter_shared(Rc::new(keep))
}

fn filter_shared<I: 'static>(keep: Rc<dyn Fn(&I) -> bool>) -> Pipe<I, I> {
    Pipe::await1(move |value| {
        if keep(&value) {
            Pipe::emit(value, filter_shared(keep))
        } else {
            filter_shared(keep)
        }
    })
}

/// Pass the first `n` inputs, then stop
pub fn take<I: 'static>(n: usize) -> Pipe<I, I> {
    if n == 0 {
        return Pipe::halt();
    }
    Pipe::await1(move |value| Pipe::emit(value, take(n - 1)))
}

/// Pass inputs while `keep` holds, then stop
pub fn take_while<I: 'static>(keep: impl Fn(&I) -> bool + 'static) -> Pipe<I, I> {
    take_while_shared(Rc::new(keep))
}

fn take_while_shared<I: 'static>(keep: Rc<dyn Fn(&I) -> bool>) -> Pipe<I, I> {
    Pipe::await1(move |value| {
        if keep(&value) {
            Pipe::emit(value, take_while_shared(keep))
        } else {
            Pipe::halt()
        }
    })
}

/// Skip the first `n` inputs, then pass the rest
pub fn skip<I: 'static>(n: usize) -> Pipe<I, I> {
    if n == 0 {
        return id();
    }
    Pipe::await1(move |_| skip(n - 1))
}

/* ===================== Piping ===================== */

impl<F: Effect, O: 'static> Process<F, O> {
    /// Feed this process's outputs through `pipe` (`|>`)
    ///
    /// Source and pipe advance in lock step. Requests issued by the source
    /// are forwarded; when the pipe halts, the source is killed and its
    /// cleanup runs before the combined process halts.
    pub fn pipe<O2: 'static>(self, pipe: Pipe<O, O2>) -> Process<F, O2> {
        let mut out = Vec::new();
        let mut source = self;
        let mut pipe = pipe;

        loop {
            match pipe {
                Pipe::Emit { head, tail } => {
                    out.push(head);
                    pipe = tail.into_pipe();
                }
                Pipe::Halt(cause) => {
                    let stopped = source
                        .kill::<O2>()
                        .on_halt(move |after| match cause {
                            Cause::End => Process::Halt(after),
                            other => Process::Halt(other.prevail(after)),
                        });
                    return Process::prepend(out, stopped);
                }
                Pipe::Await { recv } => match source {
                    Process::Emit { head, tail } => {
                        pipe = Pipe::catching(move || recv(Ok(head)));
                        source = tail.into_process();
                    }
                    Process::Halt(cause) => {
                        let seen = cause.clone();
                        pipe = Pipe::catching(move || recv(Err(seen)));
                        source = Process::Halt(cause);
                    }
                    Process::Await { request, recv: resume } => {
                        let waiting = Pipe::Await { recv };
                        let forwarded = Process::Await {
                            request,
                            recv: Box::new(move |outcome| {
                                Process::catching(move || resume(outcome)).pipe(waiting)
                            }),
                        };
                        return Process::prepend(out, forwarded);
                    }
                },
            }
        }
    }
}
