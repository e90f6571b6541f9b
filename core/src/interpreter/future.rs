//! Asynchronous effects
//!
//! `AsyncEffect` requests describe themselves as futures. They can be run
//! synchronously on a worker pool ([`PooledExecutor`](super::pool::PooledExecutor))
//! or interpreted as a single future with `run_async`, which yields to the
//! host runtime at every request.

use super::capability::{run_with, Capability};
use crate::process::{Effect, Failure, Process, RunError};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

/// An effect request that can be performed as a future
pub trait AsyncEffect: Effect {
    /// Start performing the request
    ///
    /// Calling this again on a clone of the same request performs it again.
    fn perform(self) -> LocalBoxFuture<'static, Result<Self::Output, Failure>>;
}

/* ===================== Task ===================== */

type MakeFuture<A> = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<A, Failure>>>;

/// A labelled, re-runnable asynchronous action yielding `A`
pub struct Task<A> {
    label: String,
    make: MakeFuture<A>,
}

impl<A: 'static> Task<A> {
    pub fn new<M, Fut>(label: impl Into<String>, make: M) -> Self
    where
        M: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<A, Failure>> + 'static,
    {
        Self {
            label: label.into(),
            make: Rc::new(move || make().boxed_local()),
        }
    }

    /// A task that immediately yields `value`
    pub fn now(label: impl Into<String>, value: A) -> Self
    where
        A: Clone,
    {
        Self::new(label, move || future::ready(Ok(value.clone())))
    }

    /// A task that immediately fails
    pub fn failing(label: impl Into<String>, failure: Failure) -> Self {
        Self::new(label, move || future::ready(Err(failure.clone())))
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<A> Clone for Task<A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            make: Rc::clone(&self.make),
        }
    }
}

impl<A> fmt::Debug for Task<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Task").field(&self.label).finish()
    }
}

impl<A: 'static> Effect for Task<A> {
    type Output = A;
}

impl<A: 'static> AsyncEffect for Task<A> {
    fn perform(self) -> LocalBoxFuture<'static, Result<A, Failure>> {
        (self.make)()
    }
}

/* ===================== Capability ===================== */

/// Interprets processes as futures
pub struct FutureCapability<F> {
    _effect: PhantomData<fn(F)>,
}

impl<F> FutureCapability<F> {
    pub fn new() -> Self {
        Self {
            _effect: PhantomData,
        }
    }
}

impl<F> Default for FutureCapability<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for FutureCapability<F> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<F: AsyncEffect> Capability<F> for FutureCapability<F> {
    type Eff<T: 'static> = LocalBoxFuture<'static, Result<T, RunError>>;

    fn unit<T: 'static>(&self, value: T) -> Self::Eff<T> {
        future::ready(Ok(value)).boxed_local()
    }

    fn fail<T: 'static>(&self, error: RunError) -> Self::Eff<T> {
        future::ready(Err(error)).boxed_local()
    }

    fn attempt(&self, request: F) -> Self::Eff<Result<F::Output, Failure>> {
        async move { Ok(request.perform().await) }.boxed_local()
    }

    fn flat_map<A, B>(&self, fa: Self::Eff<A>, f: impl FnOnce(A) -> Self::Eff<B> + 'static) -> Self::Eff<B>
    where
        A: 'static,
        B: 'static,
    {
        async move {
            let value = fa.await?;
            f(value).await
        }
        .boxed_local()
    }
}

/// Interpret a process as a future
///
/// Every request is awaited on the caller's runtime. Each request adds one
/// level of future nesting, so this suits processes with a bounded number of
/// requests; use [`run_trampolined`](super::trampoline::run_trampolined)
/// for unbounded ones.
pub fn run_async<F, O>(process: Process<F, O>) -> LocalBoxFuture<'static, Result<Vec<O>, RunError>>
where
    F: AsyncEffect,
    O: 'static,
{
    run_with(&FutureCapability::new(), process)
}
