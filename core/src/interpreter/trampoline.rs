//! Trampolined synchronous effect
//!
//! `Io<T>` describes a synchronous computation built from `pure`, `fail`,
//! `delay`, `flat_map` and `attempt`. Nothing runs until `Io::run`, which
//! evaluates the description with an explicit frame stack instead of
//! recursion, so arbitrarily long `flat_map` chains use constant call stack.
//!
//! Intermediate values are type-erased to `Box<dyn Any>` between frames and
//! recovered by the typed constructors that created them.

use super::capability::{run_with, Capability};
use super::executor::{Executor, ExecutorGuard};
use crate::process::{Effect, Failure, Process, RunError};
use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

type Value = Box<dyn Any>;
type Bind = Box<dyn FnOnce(Value) -> Node>;
type Handler = Box<dyn FnOnce(Result<Value, RunError>) -> Value>;

enum Node {
    Pure(Value),
    Fail(RunError),
    Delay(Box<dyn FnOnce() -> Result<Value, RunError>>),
    Bind(Box<Node>, Bind),
    Catch(Box<Node>, Handler),
}

enum Frame {
    Bind(Bind),
    Catch(Handler),
}

/// A lazily evaluated, stack-safe synchronous effect
pub struct Io<T> {
    node: Node,
    _value: PhantomData<fn() -> T>,
}

fn recover<T: 'static>(value: Value) -> Result<T, RunError> {
    value.downcast::<T>().map(|boxed| *boxed).map_err(|_| RunError::TypeMismatch)
}

impl<T: 'static> Io<T> {
    fn from_node(node: Node) -> Self {
        Self {
            node,
            _value: PhantomData,
        }
    }

    pub fn pure(value: T) -> Self {
        Self::from_node(Node::Pure(Box::new(value)))
    }

    pub fn fail(error: RunError) -> Self {
        Self::from_node(Node::Fail(error))
    }

    /// Defer `thunk` until the effect is run
    pub fn delay(thunk: impl FnOnce() -> Result<T, RunError> + 'static) -> Self {
        Self::from_node(Node::Delay(Box::new(move || {
            thunk().map(|value| Box::new(value) as Value)
        })))
    }

    pub fn flat_map<U: 'static>(self, f: impl FnOnce(T) -> Io<U> + 'static) -> Io<U> {
        let bind: Bind = Box::new(move |value: Value| match recover::<T>(value) {
            Ok(value) => f(value).node,
            Err(error) => Node::Fail(error),
        });
        Io::from_node(Node::Bind(Box::new(self.node), bind))
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Io<U> {
        self.flat_map(move |value| Io::pure(f(value)))
    }

    /// Capture this effect's failure as a value
    pub fn attempt(self) -> Io<Result<T, RunError>> {
        let handler: Handler = Box::new(|outcome: Result<Value, RunError>| {
            let outcome: Result<T, RunError> = outcome.and_then(recover::<T>);
            Box::new(outcome) as Value
        });
        Io::from_node(Node::Catch(Box::new(self.node), handler))
    }

    /// Evaluate the effect
    pub fn run(self) -> Result<T, RunError> {
        evaluate(self.node).and_then(recover::<T>)
    }
}

fn evaluate(node: Node) -> Result<Value, RunError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut current = node;

    loop {
        current = match current {
            Node::Pure(value) => match stack.pop() {
                None => return Ok(value),
                Some(Frame::Bind(bind)) => bind(value),
                Some(Frame::Catch(handler)) => Node::Pure(handler(Ok(value))),
            },
            Node::Fail(error) => {
                // Unwind to the nearest handler, skipping pending binds
                let mut handler = None;
                while let Some(frame) = stack.pop() {
                    if let Frame::Catch(found) = frame {
                        handler = Some(found);
                        break;
                    }
                }
                match handler {
                    Some(handler) => Node::Pure(handler(Err(error))),
                    None => return Err(error),
                }
            }
            Node::Delay(thunk) => match thunk() {
                Ok(value) => Node::Pure(value),
                Err(error) => Node::Fail(error),
            },
            Node::Bind(inner, bind) => {
                stack.push(Frame::Bind(bind));
                *inner
            }
            Node::Catch(inner, handler) => {
                stack.push(Frame::Catch(handler));
                *inner
            }
        };
    }
}

/* ===================== Capability ===================== */

/// Interprets processes in `Io`, running requests through an executor
pub struct TrampolineCapability<F: Effect, E: Executor<F>> {
    executor: Rc<RefCell<ExecutorGuard<F, E>>>,
}

impl<F: Effect, E: Executor<F>> Clone for TrampolineCapability<F, E> {
    fn clone(&self) -> Self {
        Self {
            executor: Rc::clone(&self.executor),
        }
    }
}

impl<F: Effect, E: Executor<F>> TrampolineCapability<F, E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor: Rc::new(RefCell::new(ExecutorGuard::new(executor))),
        }
    }

    /// Shut the executor down if it has not been already
    pub fn release(&self) {
        self.executor.borrow_mut().release();
    }
}

impl<F, E> Capability<F> for TrampolineCapability<F, E>
where
    F: Effect,
    E: Executor<F> + 'static,
{
    type Eff<T: 'static> = Io<T>;

    fn unit<T: 'static>(&self, value: T) -> Io<T> {
        Io::pure(value)
    }

    fn fail<T: 'static>(&self, error: RunError) -> Io<T> {
        Io::fail(error)
    }

    fn attempt(&self, request: F) -> Io<Result<F::Output, Failure>> {
        let executor = Rc::clone(&self.executor);
        Io::delay(move || Ok(executor.borrow_mut().execute(request)))
    }

    fn flat_map<A, B>(&self, fa: Io<A>, f: impl FnOnce(A) -> Io<B> + 'static) -> Io<B>
    where
        A: 'static,
        B: 'static,
    {
        fa.flat_map(f)
    }
}

/// Run a process through the trampolined interpreter
///
/// Equivalent to [`run`](super::run) but with every request sequenced
/// through `Io`; the executor is released once the effect has been run.
pub fn run_trampolined<F, O, E>(executor: E, process: Process<F, O>) -> Result<Vec<O>, RunError>
where
    F: Effect,
    O: 'static,
    E: Executor<F> + 'static,
{
    let capability = TrampolineCapability::new(executor);
    let result = run_with(&capability, process).run();
    capability.release();
    result
}
