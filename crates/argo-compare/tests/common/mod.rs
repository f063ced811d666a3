//! Common test utilities for integration tests.
//!
//! This module provides:
//! - `GitFixture` for throwaway repositories with a fake `origin/<branch>`
//! - Builders for Application manifests
//! - Fake chart fetcher, renderer and comment publisher

pub mod builders;
pub mod fakes;
pub mod harness;

pub use builders::*;
pub use fakes::*;
pub use harness::GitFixture;
