//! Shared test fixtures
//!
//! `Op` is a tiny effect whose executor records every request it sees, so
//! tests can assert on which effects ran, in what order, and how often the
//! executor was released.

use crate::interpreter::Executor;
use crate::process::{Effect, Failure, Process};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Succeeds with the given value
    Value(i64),
    /// Fails with the given message
    Fail(&'static str),
    /// Succeeds with 0; used to observe cleanup
    Mark(&'static str),
}

impl Effect for Op {
    type Output = i64;
}

#[derive(Debug, Default)]
pub struct Journal {
    pub entries: Vec<Op>,
    pub shutdowns: usize,
}

impl Journal {
    pub fn marks(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter_map(|op| match op {
                Op::Mark(name) => Some(*name),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct OpExecutor {
    journal: Rc<RefCell<Journal>>,
}

impl OpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Rc<RefCell<Journal>> {
        Rc::clone(&self.journal)
    }
}

impl Executor<Op> for OpExecutor {
    fn execute(&mut self, request: Op) -> Result<i64, Failure> {
        self.journal.borrow_mut().entries.push(request.clone());
        match request {
            Op::Value(value) => Ok(value),
            Op::Fail(message) => Err(Failure::effect(message)),
            Op::Mark(_) => Ok(0),
        }
    }

    fn shutdown(&mut self) {
        self.journal.borrow_mut().shutdowns += 1;
    }
}

/// A cleanup process that records `name` when it runs
pub fn mark<O: 'static>(name: &'static str) -> Process<Op, O> {
    Process::eval_(Op::Mark(name))
}
