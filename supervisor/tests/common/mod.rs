//! Common test utilities and infrastructure
//!
//! This module provides shared test utilities, fixtures, and helpers
//! used across all supervisor test suites.
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{
    FakeLauncher, Harness, HarnessBuilder, RecordingSignaller, ScriptedProbe, StaticProcessTable, TestHelpers,
};
