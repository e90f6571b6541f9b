//! Tests for cause precedence and serialization

use crate::process::{Cause, Failure, RunError};
use pretty_assertions::assert_eq;

fn failed(message: &str) -> Cause {
    Cause::Failed(Failure::effect(message))
}

#[test]
fn test_prevail_prefers_higher_rank() {
    assert_eq!(Cause::End.prevail(Cause::End), Cause::End);
    assert_eq!(Cause::End.prevail(Cause::Kill), Cause::Kill);
    assert_eq!(Cause::Kill.prevail(Cause::End), Cause::Kill);
    assert_eq!(Cause::End.prevail(failed("close")), failed("close"));
    assert_eq!(Cause::Kill.prevail(failed("close")), failed("close"));
    assert_eq!(failed("read").prevail(Cause::Kill), failed("read"));
}

#[test]
fn test_prevail_keeps_original_failure() {
    assert_eq!(failed("read").prevail(failed("close")), failed("read"));
}

#[test]
fn test_cause_predicates() {
    assert!(Cause::End.is_end());
    assert!(Cause::Kill.is_kill());
    assert_eq!(failed("x").failure(), Some(&Failure::effect("x")));
    assert_eq!(Cause::Kill.failure(), None);
    assert_eq!(Cause::from(Failure::continuation("y")), Cause::Failed(Failure::continuation("y")));
}

#[test]
fn test_run_error_from_cause() {
    assert_eq!(RunError::from_cause(Cause::End), None);
    assert_eq!(RunError::from_cause(Cause::Kill), Some(RunError::Killed));
    assert_eq!(
        RunError::from_cause(failed("boom")),
        Some(RunError::Failed(Failure::effect("boom")))
    );
}

#[test]
fn test_cause_json_shape() {
    let json = serde_json::to_value(failed("disk full")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"t": "Failed", "v": {"kind": "effect", "message": "disk full"}})
    );

    let json = serde_json::to_value(Cause::Kill).unwrap();
    assert_eq!(json, serde_json::json!({"t": "Kill"}));

    let causes = vec![Cause::End, Cause::Kill, Cause::Failed(Failure::continuation("panic"))];
    let text = serde_json::to_string(&causes).unwrap();
    let parsed: Vec<Cause> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, causes);
}

#[test]
fn test_failure_display() {
    assert_eq!(Failure::effect("x").to_string(), "effect failed: x");
    assert_eq!(Failure::continuation("y").to_string(), "continuation failed: y");
    assert_eq!(
        RunError::Failed(Failure::effect("x")).to_string(),
        "effect failed: x"
    );
}
