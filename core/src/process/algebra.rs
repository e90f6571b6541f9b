//! Pure process combinators
//!
//! Nothing here runs an effect. Every combinator consumes its receiver and
//! returns a new process; effects fire only when an interpreter walks the
//! result. Runs of `Emit` nodes are rewritten iteratively so long emitted
//! prefixes never grow the call stack.

use super::types::cause::catch_panic;
use super::types::node::Rest;
use super::types::{Cause, Effect, Failure, Outcome, Process, Tail};
use std::rc::Rc;

/* ===================== Constructors ===================== */

impl<F: Effect, O: 'static> Process<F, O> {
    /// Emit a single value, then end
    pub fn emit(head: O) -> Self {
        Process::Emit {
            head,
            tail: Tail::new(Process::halt()),
        }
    }

    /// Emit every item of a finite sequence, then end
    pub fn emit_all<I: IntoIterator<Item = O>>(items: I) -> Self {
        Process::prepend(items.into_iter().collect(), Process::halt())
    }

    /// Halt cleanly
    pub fn halt() -> Self {
        Process::Halt(Cause::End)
    }

    /// Halt with a failure
    pub fn fail(failure: Failure) -> Self {
        Process::Halt(Cause::Failed(failure))
    }

    /// Request `request`, then continue with `recv`
    pub fn awaiting<R>(request: F, recv: R) -> Self
    where
        R: FnOnce(Outcome<F::Output>) -> Process<F, O> + 'static,
    {
        Process::Await {
            request,
            recv: Box::new(recv),
        }
    }

    /// Evaluate a process-producing thunk, turning a panic into `Halt`
    ///
    /// Every user-supplied continuation is run through this, so combinators
    /// never unwind past the interpreter.
    pub fn catching<T>(thunk: T) -> Self
    where
        T: FnOnce() -> Process<F, O>,
    {
        match catch_panic(thunk) {
            Ok(process) => process,
            Err(message) => Process::fail(Failure::continuation(message)),
        }
    }

    /// Request `request` for its side effect only, emitting nothing
    pub fn eval_(request: F) -> Self {
        Process::<F, F::Output>::eval(request).drain()
    }
}

impl<F: Effect> Process<F, F::Output> {
    /// Request `request` and emit its result, or halt with its failure
    pub fn eval(request: F) -> Self {
        Process::awaiting(request, |outcome| match outcome {
            Ok(value) => Process::emit(value),
            Err(cause) => Process::Halt(cause),
        })
    }
}

/* ===================== Sequencing ===================== */

impl<F: Effect, O: 'static> Process<F, O> {
    /// Rewrite every terminal point of this process to continue via `f`
    ///
    /// The emitted prefix is kept. Pending continuations are composed with
    /// `f`, and an immediate `Halt` evaluates `f` under `catching`.
    pub fn on_halt<H>(self, f: H) -> Self
    where
        H: FnOnce(Cause) -> Process<F, O> + 'static,
    {
        let (heads, rest) = self.split_emits();
        let rest = match rest {
            Rest::Await { request, recv } => Process::Await {
                request,
                recv: Box::new(move |outcome| Process::catching(move || recv(outcome)).on_halt(f)),
            },
            Rest::Halt(cause) => Process::catching(move || f(cause)),
        };
        Process::prepend(heads, rest)
    }

    /// Continue as `next` after a clean end (`++`)
    ///
    /// `Kill` and failures propagate unchanged and `next` never runs.
    pub fn append(self, next: Process<F, O>) -> Self {
        if matches!(next, Process::Halt(Cause::End)) {
            return self;
        }
        self.append_with(move || next)
    }

    /// Like `append`, but builds the continuation only once it is reached
    pub fn append_with<N>(self, next: N) -> Self
    where
        N: FnOnce() -> Process<F, O> + 'static,
    {
        self.on_halt(move |cause| match cause {
            Cause::End => next(),
            other => Process::Halt(other),
        })
    }

    /// Continue as `rest` after a clean end; on any other cause, kill `rest`
    /// so its finalizers run, then surface the combined cause
    fn then_or_kill(self, rest: Process<F, O>) -> Self {
        if matches!(rest, Process::Halt(Cause::End)) {
            return self;
        }
        self.on_halt(move |cause| match cause {
            Cause::End => rest,
            other => rest
                .kill::<O>()
                .on_halt(move |after| Process::Halt(other.prevail(after))),
        })
    }

    /// Expand every output into a sub-process, keeping output order
    pub fn flat_map<O2, G>(self, f: G) -> Process<F, O2>
    where
        O2: 'static,
        G: Fn(O) -> Process<F, O2> + 'static,
    {
        self.flat_map_shared(Rc::new(f))
    }

    fn flat_map_shared<O2: 'static>(self, f: Rc<dyn Fn(O) -> Process<F, O2>>) -> Process<F, O2> {
        let (heads, rest) = self.split_emits();
        let mut result = match rest {
            Rest::Await { request, recv } => {
                let f = Rc::clone(&f);
                Process::Await {
                    request,
                    recv: Box::new(move |outcome| {
                        Process::catching(move || recv(outcome)).flat_map_shared(f)
                    }),
                }
            }
            Rest::Halt(cause) => Process::Halt(cause),
        };

        for head in heads.into_iter().rev() {
            let f = Rc::clone(&f);
            result = Process::catching(move || f(head)).then_or_kill(result);
        }
        result
    }

    /// Transform every output
    pub fn map<O2, G>(self, f: G) -> Process<F, O2>
    where
        O2: 'static,
        G: Fn(O) -> O2 + 'static,
    {
        self.map_shared(Rc::new(f))
    }

    fn map_shared<O2: 'static>(self, f: Rc<dyn Fn(O) -> O2>) -> Process<F, O2> {
        let (heads, rest) = self.split_emits();
        let rest = match rest {
            Rest::Await { request, recv } => {
                let f = Rc::clone(&f);
                Process::Await {
                    request,
                    recv: Box::new(move |outcome| Process::catching(move || recv(outcome)).map_shared(f)),
                }
            }
            Rest::Halt(cause) => Process::Halt(cause),
        };

        let mut mapped = Vec::with_capacity(heads.len());
        for head in heads {
            match catch_panic(|| f(head)) {
                Ok(value) => mapped.push(value),
                Err(message) => {
                    let failed = Process::fail(Failure::continuation(message)).then_or_kill(rest);
                    return Process::prepend(mapped, failed);
                }
            }
        }
        Process::prepend(mapped, rest)
    }

    /// Discard every output, keeping requests and the final cause
    pub fn drain<O2: 'static>(self) -> Process<F, O2> {
        let (_, rest) = self.split_emits();
        match rest {
            Rest::Await { request, recv } => Process::Await {
                request,
                recv: Box::new(move |outcome| Process::catching(move || recv(outcome)).drain()),
            },
            Rest::Halt(cause) => Process::Halt(cause),
        }
    }

    /// Ask this process to stop early
    ///
    /// `Kill` is delivered to the next pending request's continuation, the
    /// remaining output is discarded, and a resulting `Kill` is reported as a
    /// clean end. Finalizers reached on the way still run when the result is
    /// interpreted, so a killed process whose cleanup fails reports that
    /// failure rather than a clean end.
    pub fn kill<O2: 'static>(self) -> Process<F, O2> {
        let (_, rest) = self.split_emits();
        match rest {
            Rest::Await { recv, .. } => Process::<F, O>::catching(move || recv(Err(Cause::Kill)))
                .drain::<O2>()
                .on_halt(|cause| match cause {
                    Cause::Kill => Process::halt(),
                    other => Process::Halt(other),
                }),
            Rest::Halt(cause) => Process::Halt(cause),
        }
    }
}
