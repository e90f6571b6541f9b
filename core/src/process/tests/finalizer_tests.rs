//! Tests for on_complete, as_finalizer and resource

use crate::interpreter::run;
use crate::process::{resource, Cause, Failure, Process, RunError};
use crate::test_helpers::{mark, Op, OpExecutor};
use pretty_assertions::assert_eq;

fn run_ops<O: 'static>(process: Process<Op, O>) -> (Result<Vec<O>, RunError>, OpExecutor) {
    let mut executor = OpExecutor::new();
    let result = run(&mut executor, process);
    (result, executor)
}

fn marks(executor: &OpExecutor) -> Vec<&'static str> {
    executor.journal().borrow().marks()
}

#[test]
fn test_cleanup_runs_after_clean_end() {
    let process = Process::emit_all(vec![1, 2]).on_complete(mark("close"));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Ok(vec![1, 2]));
    assert_eq!(marks(&executor), vec!["close"]);
}

#[test]
fn test_cleanup_output_follows_clean_end() {
    let process = Process::emit_all(vec![1, 2]).on_complete(Process::emit(99));
    let (result, _) = run_ops(process);
    assert_eq!(result, Ok(vec![1, 2, 99]));
}

#[test]
fn test_cleanup_runs_after_failure_and_failure_surfaces() {
    let process = Process::emit(1)
        .append(Process::eval(Op::Fail("boom")))
        .on_complete(mark("close"));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("boom"))));
    assert_eq!(
        executor.journal().borrow().entries,
        vec![Op::Fail("boom"), Op::Mark("close")]
    );
}

#[test]
fn test_cleanup_runs_once_when_killed() {
    let process = Process::eval(Op::Value(1))
        .append(Process::eval(Op::Value(2)))
        .on_complete(mark("close"))
        .kill::<i64>();
    let (result, executor) = run_ops(process);

    assert_eq!(result, Ok(vec![]));
    assert_eq!(executor.journal().borrow().entries, vec![Op::Mark("close")]);
}

#[test]
fn test_unkilled_top_level_kill_is_reported() {
    let process = Process::<Op, i64>::Halt(Cause::Kill).on_complete(mark("close"));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Err(RunError::Killed));
    assert_eq!(marks(&executor), vec!["close"]);
}

#[test]
fn test_finalizer_reissues_request_on_kill() {
    let cleanup = mark::<i64>("a").append(mark("b")).as_finalizer();
    let (result, executor) = run_ops(cleanup.kill::<i64>());

    assert_eq!(result, Ok(vec![]));
    assert_eq!(marks(&executor), vec!["a", "b"]);
}

#[test]
fn test_finalizer_passes_ordinary_outcomes_through() {
    let process = Process::eval(Op::Value(5)).as_finalizer();
    let (result, _) = run_ops(process);
    assert_eq!(result, Ok(vec![5]));
}

#[test]
fn test_cleanup_failure_after_clean_end_surfaces() {
    let process = Process::emit(1).on_complete(Process::eval_(Op::Fail("close failed")));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("close failed"))));
    assert_eq!(executor.journal().borrow().entries, vec![Op::Fail("close failed")]);
}

#[test]
fn test_original_failure_wins_over_cleanup_failure() {
    let process = Process::<Op, i64>::eval(Op::Fail("read failed"))
        .on_complete(Process::eval_(Op::Fail("close failed")));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("read failed"))));
    assert_eq!(
        executor.journal().borrow().entries,
        vec![Op::Fail("read failed"), Op::Fail("close failed")]
    );
}

#[test]
fn test_cleanup_failure_beats_kill() {
    let process = Process::eval(Op::Value(1))
        .on_complete(Process::eval_(Op::Fail("close failed")))
        .kill::<i64>();
    let (result, _) = run_ops(process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("close failed"))));
}

#[test]
fn test_resource_releases_after_use() {
    let process = resource(
        Op::Value(7),
        |handle| Process::emit(handle).append(Process::eval(Op::Value(handle + 1))),
        |_handle| mark("release"),
    );
    let (result, executor) = run_ops(process);

    assert_eq!(result, Ok(vec![7, 8]));
    assert_eq!(
        executor.journal().borrow().entries,
        vec![Op::Value(7), Op::Value(8), Op::Mark("release")]
    );
}

#[test]
fn test_resource_release_sees_handle() {
    let process = resource(
        Op::Value(3),
        |_handle| Process::<Op, i64>::halt(),
        |handle| Process::eval_(Op::Value(*handle * 100)),
    );
    let (result, executor) = run_ops(process);

    assert_eq!(result, Ok(vec![]));
    assert_eq!(
        executor.journal().borrow().entries,
        vec![Op::Value(3), Op::Value(300)]
    );
}

#[test]
fn test_failed_acquire_releases_nothing() {
    let process = resource(Op::Fail("no handle"), Process::emit, |_| mark("release"));
    let (result, executor) = run_ops(process);

    assert_eq!(result, Err(RunError::Failed(Failure::effect("no handle"))));
    assert!(marks(&executor).is_empty());
}

#[test]
fn test_panicking_use_still_releases() {
    let process = resource(
        Op::Value(1),
        |_| -> Process<Op, i64> { panic!("use exploded") },
        |_| mark("release"),
    );
    let (result, executor) = run_ops(process);

    assert!(matches!(result, Err(RunError::Failed(Failure::Continuation(_)))));
    assert_eq!(marks(&executor), vec!["release"]);
}

#[test]
fn test_nested_resources_release_in_reverse_order() {
    let process = resource(
        Op::Value(1),
        |outer| {
            resource(
                Op::Value(2),
                move |inner| Process::emit(outer + inner),
                |_| mark("inner"),
            )
        },
        |_| mark("outer"),
    );
    let (result, executor) = run_ops(process);

    assert_eq!(result, Ok(vec![3]));
    assert_eq!(marks(&executor), vec!["inner", "outer"]);
}
