//! Test infrastructure for tagstream
//!
//! Provides fixture loading, stochastic re-chunking, and assertion helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{render, run_test, run_with_variations, shape};
pub use loader::{load_fixtures_by_name, load_streams_by_name, ExpectedRecord, StreamCase, TestCase};
