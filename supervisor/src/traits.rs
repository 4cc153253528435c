//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the supervisor touches the outside world through is a
//! trait here: the project file system, process spawning and killing, the
//! system-wide process table, the readiness probe, notifications and the
//! poll-loop clock. Real implementations live in `services`.

use std::collections::BTreeMap;
use std::fmt;

use shared::NotificationImage;

use crate::error::SupervisorResult;

/// One row of a system-wide process snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent: Option<u32>,
    /// Executable name as reported by the OS (may carry an extension)
    pub name: String,
    pub command_line: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, parent: Option<u32>, name: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            pid,
            parent,
            name: name.into(),
            command_line: command_line.into(),
        }
    }
}

/// Live handle to a spawned helper process
pub trait ProcessHandle: Send + Sync + fmt::Debug {
    fn pid(&self) -> u32;

    /// Non-blocking liveness check
    fn is_alive(&mut self) -> bool;
}

/// Project file system queried by framework detection
#[mockall::automock]
pub trait FileSystem: Send + Sync {
    /// Whether the project-relative path exists
    fn exists(&self, relative_path: &str) -> bool;
}

/// Spawns helper processes
#[mockall::automock]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `command` with `env` merged over the parent's environment.
    /// Must not wait for the child to become ready.
    fn spawn(
        &self,
        command: &[String],
        env: &BTreeMap<String, String>,
    ) -> std::io::Result<Box<dyn ProcessHandle>>;
}

/// TCP readiness check
#[mockall::automock]
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// `Ok(true)` when a connection was accepted, `Ok(false)` when refused.
    /// Any other transport error is returned as `ProbeFailed`.
    async fn probe(&self, host: &str, port: u16) -> SupervisorResult<bool>;
}

/// Extra readiness condition layered on top of the TCP probe.
///
/// Some helper setups register with a rendezvous service after binding their
/// port; an instance with a gate attached is only running once both agree.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ReadinessGate: Send + Sync {
    async fn is_ready(&self) -> bool;
}

/// System-wide process enumeration
#[mockall::automock]
pub trait ProcessTable: Send + Sync {
    fn snapshot(&self) -> SupervisorResult<Vec<ProcessEntry>>;
}

/// Forced kill of a single pid. A pid that no longer exists is not an error.
#[mockall::automock]
pub trait ProcessSignaller: Send + Sync {
    fn force_kill(&self, pid: u32) -> SupervisorResult<()>;
}

/// How a managed helper (and everything it spawned) is torn down
#[mockall::automock]
pub trait ProcessTerminationStrategy: Send + Sync {
    fn terminate(&self, pid: u32) -> SupervisorResult<()>;

    fn name(&self) -> &'static str;
}

/// Desktop notification sink
#[mockall::automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, title: &str, image: NotificationImage);
}

/// Clock driving the verification loop; one tick is one second in production
#[mockall::automock]
#[async_trait::async_trait]
pub trait Ticker: Send + Sync {
    async fn tick(&self);
}
