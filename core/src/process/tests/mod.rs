//! Tests for the process core
//!
//! Organized by feature area

mod cause_tests;
mod finalizer_tests;
