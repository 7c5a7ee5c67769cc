//! skillpack benchmarking suite
//!
//! Benchmarks for catalog scanning, dependency resolution and archive
//! building.

pub mod common;

pub use common::*;
