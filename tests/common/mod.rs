//! Common test utilities for runner tests
//!
//! Tensors here are backed by host memory so buffer addresses and lengths
//! seen by the recording runtime can be checked against real allocations.

#![allow(dead_code)]

mod capture;
mod fixtures;

pub use capture::*;
pub use fixtures::*;
#[allow(unused_imports)]
pub use serial_test::serial;
