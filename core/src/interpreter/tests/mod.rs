//! Tests for the interpreters
//!
//! Organized by interpreter

mod run_tests;
mod trampoline_tests;
