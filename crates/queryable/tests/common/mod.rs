//! Test infrastructure for the query layer.
//!
//! This module provides entity fixtures and an in-memory provider that
//! records every window it is asked to execute.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use fixtures::*;
pub use harness::*;
