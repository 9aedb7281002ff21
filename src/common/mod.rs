//! Helpers shared by unit tests, integration tests and benchmarks

pub mod test_utils;

pub use test_utils::{connected_pair, loopback_listener};
