//! Core supervision logic
//!
//! Instance bookkeeping and toggle resolution. All I/O goes through the
//! injected service traits.

pub mod instance;
pub mod toggles;

pub use instance::{Foreman, InstanceSpec, LaunchOptions, ManagedInstance, PROBE_HOST};
pub use toggles::{Detector, Toggle, Toggles};
