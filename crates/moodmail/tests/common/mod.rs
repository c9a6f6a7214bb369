//! Shared test utilities for moodmail integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with a temp database
//! - Builder patterns for creating inbound payloads and stored logs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{ScriptedClassifier, TestHarness};
