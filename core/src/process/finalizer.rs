//! Finalizer protocol
//!
//! Cleanup attached with `on_complete` runs exactly once however the
//! receiver stops (clean end, `Kill`, or failure), cannot itself be killed,
//! and is sequenced before the original cause is surfaced again.

use super::types::node::Rest;
use super::types::{Cause, Effect, Outcome, Process};
use tracing::{debug, trace};

impl<F: Effect, O: 'static> Process<F, O> {
    /// Make this process immune to `Kill`
    ///
    /// Whenever a pending request's outcome is `Kill`, the same request is
    /// issued again instead of letting the continuation see it. Every request
    /// reached later is protected the same way.
    pub fn as_finalizer(self) -> Self {
        let (heads, rest) = self.split_emits();
        let rest = match rest {
            Rest::Await { request, recv } => {
                let pending = request.clone();
                Process::Await {
                    request,
                    recv: Box::new(move |outcome: Outcome<F::Output>| match outcome {
                        Err(Cause::Kill) => {
                            trace!(request = ?pending, "finalizer absorbed kill, re-issuing request");
                            Process::Await {
                                request: pending,
                                recv,
                            }
                            .as_finalizer()
                        }
                        other => Process::catching(move || recv(other)).as_finalizer(),
                    }),
                }
            }
            halted @ Rest::Halt(_) => halted.into_process(),
        };
        Process::prepend(heads, rest)
    }

    /// Run `cleanup` once this process halts, whatever the cause
    ///
    /// After a clean end the result is whatever `cleanup` ends with. After
    /// `Kill` or a failure the original cause is surfaced again once cleanup
    /// finishes, unless cleanup produced a higher-ranked cause
    /// (see [`Cause::prevail`]).
    pub fn on_complete(self, cleanup: Process<F, O>) -> Self {
        self.on_halt(move |cause| {
            debug!(?cause, "process halted, running cleanup");
            cleanup
                .as_finalizer()
                .on_halt(move |after| Process::Halt(cause.prevail(after)))
        })
    }
}

/// Acquire a resource, use it, and always release it
///
/// `acquire` is run once. On success the body is built with `use_` and
/// `release` becomes its cleanup, so the handle is released exactly once
/// after its last use and before the body's cause reaches the caller. If
/// acquisition fails nothing is released.
pub fn resource<F, O, U, R>(acquire: F, use_: U, release: R) -> Process<F, O>
where
    F: Effect,
    O: 'static,
    U: FnOnce(F::Output) -> Process<F, O> + 'static,
    R: FnOnce(&F::Output) -> Process<F, O> + 'static,
{
    Process::awaiting(acquire, move |outcome| match outcome {
        Ok(handle) => {
            let cleanup = Process::catching(|| release(&handle));
            Process::catching(move || use_(handle)).on_complete(cleanup)
        }
        Err(cause) => Process::Halt(cause),
    })
}
