//! Executor contract
//!
//! An executor is the only thing that ever runs an effect request. The
//! interpreters own their executor through an `ExecutorGuard`, which releases
//! it exactly once when the walk ends, however it ends.

use crate::process::types::cause::catch_panic;
use crate::process::{Effect, Failure};
use std::marker::PhantomData;
use tracing::{debug, trace};

/* ===================== Executor ===================== */

/// Runs effect requests synchronously
pub trait Executor<F: Effect> {
    /// Run one request to completion
    fn execute(&mut self, request: F) -> Result<F::Output, Failure>;

    /// Release whatever the executor holds (worker pools, open handles)
    ///
    /// Called once by the interpreter after the walk ends.
    fn shutdown(&mut self) {}
}

impl<F: Effect, E: Executor<F> + ?Sized> Executor<F> for &mut E {
    fn execute(&mut self, request: F) -> Result<F::Output, Failure> {
        (**self).execute(request)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

/// Executor backed by a closure
pub struct FnExecutor<G> {
    run: G,
}

/// Build an executor from a closure
pub fn from_fn<G>(run: G) -> FnExecutor<G> {
    FnExecutor { run }
}

impl<F, G> Executor<F> for FnExecutor<G>
where
    F: Effect,
    G: FnMut(F) -> Result<F::Output, Failure>,
{
    fn execute(&mut self, request: F) -> Result<F::Output, Failure> {
        (self.run)(request)
    }
}

/* ===================== Guard ===================== */

/// Scoped ownership of an executor
///
/// Requests run through the guard have executor panics converted into
/// `Failure::Effect`. The executor is shut down on `release` or on drop,
/// whichever comes first, and never twice.
pub struct ExecutorGuard<F: Effect, E: Executor<F>> {
    executor: E,
    released: bool,
    _effect: PhantomData<fn(F)>,
}

impl<F: Effect, E: Executor<F>> ExecutorGuard<F, E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            released: false,
            _effect: PhantomData,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Shut the executor down if it has not been already
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        debug!("releasing executor");
        self.executor.shutdown();
    }
}

impl<F: Effect, E: Executor<F>> Executor<F> for ExecutorGuard<F, E> {
    fn execute(&mut self, request: F) -> Result<F::Output, Failure> {
        if self.released {
            return Err(Failure::effect("executor has already been released"));
        }

        trace!(?request, "executing request");
        let executor = &mut self.executor;
        match catch_panic(move || executor.execute(request)) {
            Ok(outcome) => outcome,
            Err(message) => Err(Failure::effect(format!("executor panicked: {message}"))),
        }
    }

    fn shutdown(&mut self) {
        self.release();
    }
}

impl<F: Effect, E: Executor<F>> Drop for ExecutorGuard<F, E> {
    fn drop(&mut self) {
        self.release();
    }
}
