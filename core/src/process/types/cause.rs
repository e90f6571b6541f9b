//! Termination causes and failures
//!
//! Every process ends in exactly one `Cause`. `End` and `Kill` are sentinels
//! with no payload; everything else is a `Failure`.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::warn;

/* ===================== Failure ===================== */

/// A genuine failure surfaced while a process was running
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Failure {
    /// An executor reported (or panicked with) a failure while running a request
    #[error("effect failed: {0}")]
    Effect(String),

    /// A user-supplied continuation or combinator argument panicked
    #[error("continuation failed: {0}")]
    Continuation(String),
}

impl Failure {
    pub fn effect(message: impl Into<String>) -> Self {
        Failure::Effect(message.into())
    }

    pub fn continuation(message: impl Into<String>) -> Self {
        Failure::Continuation(message.into())
    }
}

/* ===================== Cause ===================== */

/// Why a process halted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Cause {
    /// Clean exhaustion: no more output, no error
    End,
    /// Cooperative cancellation requested from outside
    Kill,
    /// A genuine failure
    Failed(Failure),
}

impl Cause {
    pub fn is_end(&self) -> bool {
        matches!(self, Cause::End)
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, Cause::Kill)
    }

    /// The failure carried by this cause, if it is one
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Cause::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cause::End => 0,
            Cause::Kill => 1,
            Cause::Failed(_) => 2,
        }
    }

    /// Combine the cause a process halted with and the cause its cleanup halted with
    ///
    /// The higher-ranked cause wins (`Failed` > `Kill` > `End`). When both are
    /// failures the original one is kept and the cleanup failure is logged.
    pub fn prevail(self, cleanup: Cause) -> Cause {
        if let (Cause::Failed(original), Cause::Failed(secondary)) = (&self, &cleanup) {
            warn!(
                original = %original,
                cleanup = %secondary,
                "cleanup failed while process was already failing; keeping original cause"
            );
            return self;
        }

        if cleanup.rank() > self.rank() {
            cleanup
        } else {
            self
        }
    }
}

impl From<Failure> for Cause {
    fn from(failure: Failure) -> Self {
        Cause::Failed(failure)
    }
}

/* ===================== RunError ===================== */

/// Error returned by the interpreters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("process was killed before it completed")]
    Killed,

    #[error(transparent)]
    Failed(#[from] Failure),

    #[error("trampoline produced a value of an unexpected type")]
    TypeMismatch,
}

impl RunError {
    /// Convert a non-clean halt into the error an interpreter reports
    ///
    /// Returns `None` for `Cause::End`.
    pub fn from_cause(cause: Cause) -> Option<RunError> {
        match cause {
            Cause::End => None,
            Cause::Kill => Some(RunError::Killed),
            Cause::Failed(failure) => Some(RunError::Failed(failure)),
        }
    }
}

/* ===================== Panic capture ===================== */

/// Run `f`, converting a panic into its payload message
pub(crate) fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
