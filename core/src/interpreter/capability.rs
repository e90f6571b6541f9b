//! Effect-polymorphic interpreter
//!
//! `run_with` walks a process inside a host effect type described by a
//! `Capability`. The loop itself only iterates over emitted values; every
//! request is sequenced through `Capability::flat_map`, so stack safety
//! across long request chains is up to the capability (see
//! [`Io`](super::trampoline::Io) for a trampolined one).

use crate::process::{Cause, Effect, Failure, Process, RunError};

/// What an effect type must offer for a process to be interpreted in it
pub trait Capability<F: Effect>: Clone + 'static {
    /// The host effect, yielding `T` or failing with a `RunError`
    type Eff<T: 'static>;

    /// An effect that yields `value`
    fn unit<T: 'static>(&self, value: T) -> Self::Eff<T>;

    /// An effect that fails with `error`
    fn fail<T: 'static>(&self, error: RunError) -> Self::Eff<T>;

    /// Run `request`, capturing its failure as a value instead of failing
    fn attempt(&self, request: F) -> Self::Eff<Result<F::Output, Failure>>;

    /// Sequence `fa` with the effect `f` builds from its result
    fn flat_map<A, B>(&self, fa: Self::Eff<A>, f: impl FnOnce(A) -> Self::Eff<B> + 'static) -> Self::Eff<B>
    where
        A: 'static,
        B: 'static;
}

/// Interpret `process` in the effect type of `capability`
///
/// The result yields every emitted value after a clean end, or fails with
/// the process's cause.
pub fn run_with<C, F, O>(capability: &C, process: Process<F, O>) -> C::Eff<Vec<O>>
where
    C: Capability<F>,
    F: Effect,
    O: 'static,
{
    drive(capability.clone(), process, Vec::new())
}

fn drive<C, F, O>(capability: C, process: Process<F, O>, mut emitted: Vec<O>) -> C::Eff<Vec<O>>
where
    C: Capability<F>,
    F: Effect,
    O: 'static,
{
    let mut current = process;
    loop {
        match current {
            Process::Emit { head, tail } => {
                emitted.push(head);
                current = tail.into_process();
            }
            Process::Halt(cause) => {
                return match RunError::from_cause(cause) {
                    None => capability.unit(emitted),
                    Some(error) => capability.fail(error),
                };
            }
            Process::Await { request, recv } => {
                let attempted = capability.attempt(request);
                let next = capability.clone();
                return capability.flat_map(attempted, move |outcome| {
                    let outcome = outcome.map_err(Cause::Failed);
                    let resumed = Process::catching(move || recv(outcome));
                    drive(next, resumed, emitted)
                });
            }
        }
    }
}
