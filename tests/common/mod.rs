//! Shared test utilities for engine tests.
//!
//! This module provides:
//! - A scripted mock `Source` (queued responses, optional gate to hold a fetch)
//! - A recording mock `Sink` with configurable failures
//! - A recording mock `Outbound`

pub mod mocks;

pub use mocks::*;
