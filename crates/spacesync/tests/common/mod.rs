//! Shared test utilities for spacesync integration tests.
//!
//! This module provides:
//! - `SpaceHarness` for an isolated instance directory
//! - `MockRemote`, a recording `RemoteApi`

pub mod harness;
pub mod remote;

pub use harness::SpaceHarness;
pub use remote::{Call, Event, MockRemote};
