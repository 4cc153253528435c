//! Shared types for the preloader supervisor
//!
//! Contains the framework vocabulary, error types and logging setup used by
//! both the supervisor library and the `preloader` binary.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
