//! Supervisor library for test-framework preloader processes
//!
//! Detects which test frameworks a project uses, launches one preloader
//! helper per framework, verifies each one accepts connections on its port
//! and tears them down individually, in bulk or machine-wide.

pub mod config;
pub mod core;
pub mod error;
pub mod plugin;
pub mod services;
pub mod supervisor;
pub mod traits;

// Re-export commonly used types
pub use config::{ForemanSetting, FrameworkOptions, KillSignature, SupervisorOptions};
pub use core::{Foreman, InstanceSpec, LaunchOptions, ManagedInstance, Toggle, Toggles};
pub use error::{SupervisorError, SupervisorResult};
pub use plugin::PreloaderPlugin;
pub use services::Services;
pub use supervisor::{LaunchOutcome, LaunchReport, Reevaluation, Selection, Supervisor};
pub use traits::{
    FileSystem, Notifier, ProcessEntry, ProcessHandle, ProcessLauncher, ProcessSignaller, ProcessTable,
    ProcessTerminationStrategy, ReadinessGate, ReadinessProbe, Ticker,
};
