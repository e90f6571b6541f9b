//! Tests for the trampolined effect and interpreter

use crate::interpreter::{run, run_trampolined, run_with, Io, TrampolineCapability};
use crate::process::{Failure, Process, RunError};
use crate::test_helpers::{mark, Op, OpExecutor};
use pretty_assertions::assert_eq;

/// `n` requests in a row, each emitting its value
fn countdown(n: i64) -> Process<Op, i64> {
    if n == 0 {
        return Process::halt();
    }
    Process::eval(Op::Value(n)).append_with(move || countdown(n - 1))
}

#[test]
fn test_io_pure_map_flat_map() {
    let io = Io::pure(20).map(|x| x + 1).flat_map(|x| Io::pure(x * 2));
    assert_eq!(io.run(), Ok(42));
}

#[test]
fn test_io_delay_runs_only_when_run() {
    use std::cell::Cell;
    use std::rc::Rc;

    let ran = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ran);
    let io = Io::delay(move || {
        counter.set(counter.get() + 1);
        Ok("done")
    });

    assert_eq!(ran.get(), 0);
    assert_eq!(io.run(), Ok("done"));
    assert_eq!(ran.get(), 1);
}

#[test]
fn test_io_failure_skips_binds_until_attempt() {
    let io = Io::<i32>::fail(RunError::Killed)
        .map(|x| x + 1)
        .attempt()
        .map(|outcome| outcome.is_err());
    assert_eq!(io.run(), Ok(true));

    let io = Io::pure(1).attempt();
    assert_eq!(io.run(), Ok(Ok(1)));
}

#[test]
fn test_io_long_bind_chain_is_stack_safe() {
    let mut io = Io::pure(0u64);
    for _ in 0..200_000 {
        io = io.flat_map(|x| Io::pure(x + 1));
    }
    assert_eq!(io.run(), Ok(200_000));
}

#[test]
fn test_io_deep_right_nested_binds() {
    fn count_up(n: u64, limit: u64) -> Io<u64> {
        if n == limit {
            return Io::pure(n);
        }
        Io::pure(n + 1).flat_map(move |next| count_up(next, limit))
    }
    assert_eq!(count_up(0, 200_000).run(), Ok(200_000));
}

#[test]
fn test_trampolined_matches_simple_loop() {
    let build = || {
        Process::emit(0)
            .append(countdown(3))
            .on_complete(mark("close"))
    };

    let simple = run(OpExecutor::new(), build());
    let executor = OpExecutor::new();
    let journal = executor.journal();
    let trampolined = run_trampolined(executor, build());

    assert_eq!(simple, Ok(vec![0, 3, 2, 1]));
    assert_eq!(trampolined, simple);
    assert_eq!(journal.borrow().marks(), vec!["close"]);
    assert_eq!(journal.borrow().shutdowns, 1);
}

#[test]
fn test_trampolined_many_requests_is_stack_safe() {
    let count = 100_000;
    let result = run_trampolined(OpExecutor::new(), countdown(count)).unwrap();

    assert_eq!(result.len(), count as usize);
    assert_eq!(result.first(), Some(&count));
    assert_eq!(result.last(), Some(&1));
}

#[test]
fn test_trampolined_failure_runs_cleanup() {
    let process = countdown(2)
        .append(Process::eval(Op::Fail("late")))
        .on_complete(mark("close"));

    let executor = OpExecutor::new();
    let journal = executor.journal();
    let result = run_trampolined(executor, process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("late"))));
    assert_eq!(journal.borrow().marks(), vec!["close"]);
    assert_eq!(journal.borrow().shutdowns, 1);
}

#[test]
fn test_run_with_defers_until_io_runs() {
    let executor = OpExecutor::new();
    let journal = executor.journal();
    let capability = TrampolineCapability::new(executor);

    let io = run_with(&capability, countdown(2));
    assert!(journal.borrow().entries.is_empty());

    assert_eq!(io.run(), Ok(vec![2, 1]));
    assert_eq!(journal.borrow().entries, vec![Op::Value(2), Op::Value(1)]);

    capability.release();
    capability.release();
    assert_eq!(journal.borrow().shutdowns, 1);
}
