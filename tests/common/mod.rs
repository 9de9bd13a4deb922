//! Common test infrastructure for f3kdb integration tests.
//!
//! Every integration test binary includes this module separately; helpers
//! one binary doesn't call would otherwise warn as dead code.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
