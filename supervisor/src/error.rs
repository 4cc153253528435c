//! Supervisor-specific error types

use thiserror::Error;
use shared::{FrameworkType, LaunchAction, SharedError};

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn {framework} preloader: {source}")]
    SpawnFailed {
        framework: FrameworkType,
        #[source]
        source: std::io::Error,
    },

    #[error("{framework} preloader was already started (PID {pid})")]
    AlreadyStarted { framework: FrameworkType, pid: u32 },

    #[error("Readiness probe on port {port} failed: {source}")]
    ProbeFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not {action} preloader for {frameworks} after {waited_secs} seconds")]
    TaskFailed {
        action: LaunchAction,
        frameworks: String,
        waited_secs: u64,
    },

    #[error("Failed to terminate process {pid}: {message}")]
    TerminationFailed { pid: u32, message: String },

    #[error("Process table unavailable: {message}")]
    ProcessTable { message: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON configuration error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SupervisorError {
    pub fn config(field: impl Into<String>) -> Self {
        SupervisorError::ConfigurationError { field: field.into() }
    }

    pub fn termination(pid: u32, message: impl Into<String>) -> Self {
        SupervisorError::TerminationFailed {
            pid,
            message: message.into(),
        }
    }

    /// True for the final verification timeout that must abort the host task
    pub fn is_task_failure(&self) -> bool {
        matches!(self, SupervisorError::TaskFailed { .. })
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
