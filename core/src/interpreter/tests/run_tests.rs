//! Tests for the simple interpreter loop and the executor contract

use crate::interpreter::{advance, from_fn, run, run_until_done, Executor, ExecutorGuard, Step};
use crate::process::{Failure, Process, RunError};
use crate::test_helpers::{mark, Op, OpExecutor};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_run_releases_executor_once() {
    let executor = OpExecutor::new();
    let journal = executor.journal();

    let result = run(executor, Process::eval(Op::Value(1)).append(Process::emit(2)));

    assert_eq!(result, Ok(vec![1, 2]));
    assert_eq!(journal.borrow().shutdowns, 1);
}

#[test]
fn test_run_releases_executor_on_failure() {
    let executor = OpExecutor::new();
    let journal = executor.journal();

    let result = run(executor, Process::<Op, i64>::eval(Op::Fail("boom")));

    assert_eq!(result, Err(RunError::Failed(Failure::effect("boom"))));
    assert_eq!(journal.borrow().shutdowns, 1);
}

#[test]
fn test_run_over_borrowed_executor() {
    let mut executor = OpExecutor::new();
    let result = run(&mut executor, Process::eval(Op::Value(9)));

    assert_eq!(result, Ok(vec![9]));
    assert_eq!(executor.journal().borrow().shutdowns, 1);
}

#[test]
fn test_run_until_done_leaves_executor_open() {
    let mut executor = OpExecutor::new();
    let first = run_until_done(&mut executor, Process::eval(Op::Value(1)));
    let second = run_until_done(&mut executor, Process::eval(Op::Value(2)));

    assert_eq!(first, Ok(vec![1]));
    assert_eq!(second, Ok(vec![2]));
    assert_eq!(executor.journal().borrow().shutdowns, 0);
}

#[test]
fn test_advance_stops_at_each_emit() {
    let mut executor = OpExecutor::new();
    let process = Process::eval(Op::Value(1)).append(Process::eval(Op::Value(2)));

    let Step::Emit { head, rest } = advance(&mut executor, process) else {
        unreachable!("expected an emitted value");
    };
    assert_eq!(head, 1);
    assert_eq!(executor.journal().borrow().entries, vec![Op::Value(1)]);

    let Step::Emit { head, rest } = advance(&mut executor, rest) else {
        unreachable!("expected a second emitted value");
    };
    assert_eq!(head, 2);

    assert!(matches!(advance(&mut executor, rest), Step::Halt(cause) if cause.is_end()));
}

#[test]
fn test_executor_panic_becomes_effect_failure() {
    let executor = from_fn(|op: Op| -> Result<i64, Failure> {
        match op {
            Op::Value(v) => Ok(v),
            _ => panic!("executor cannot handle {:?}", op),
        }
    });

    let process = Process::eval(Op::Value(1)).append(Process::eval(Op::Mark("x")));
    let result = run(executor, process);

    let Err(RunError::Failed(Failure::Effect(message))) = result else {
        unreachable!("expected an effect failure, got {:?}", result);
    };
    assert!(message.contains("executor panicked"));
    assert!(message.contains("cannot handle"));
}

#[test]
fn test_executor_panic_still_runs_cleanup() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    let executor = from_fn(move |op: Op| -> Result<i64, Failure> {
        record.borrow_mut().push(op.clone());
        match op {
            Op::Value(_) => panic!("value requests explode"),
            _ => Ok(0),
        }
    });

    let process = Process::eval(Op::Value(1)).on_complete(mark("close"));
    let result = run(executor, process);

    assert!(matches!(result, Err(RunError::Failed(Failure::Effect(_)))));
    assert_eq!(*seen.borrow(), vec![Op::Value(1), Op::Mark("close")]);
}

#[test]
fn test_guard_releases_once_and_rejects_late_requests() {
    let mut executor = OpExecutor::new();
    {
        let mut guard = ExecutorGuard::<Op, _>::new(&mut executor);
        assert_eq!(guard.execute(Op::Value(1)), Ok(1));

        guard.release();
        guard.release();
        assert!(guard.is_released());
        assert!(guard.execute(Op::Value(2)).is_err());
    }

    let journal = executor.journal();
    let journal = journal.borrow();
    assert_eq!(journal.shutdowns, 1);
    assert_eq!(journal.entries, vec![Op::Value(1)]);
}

#[test]
fn test_guard_releases_on_drop() {
    let executor = OpExecutor::new();
    let journal = executor.journal();
    drop(ExecutorGuard::<Op, _>::new(executor));
    assert_eq!(journal.borrow().shutdowns, 1);
}

#[test]
fn test_effects_run_in_emission_order() {
    let process = Process::eval(Op::Value(1))
        .append(Process::emit(100))
        .append(Process::eval(Op::Value(2)))
        .on_complete(mark("done"));

    let mut executor = OpExecutor::new();
    let result = run(&mut executor, process);

    assert_eq!(result, Ok(vec![1, 100, 2]));
    assert_eq!(
        executor.journal().borrow().entries,
        vec![Op::Value(1), Op::Value(2), Op::Mark("done")]
    );
}
