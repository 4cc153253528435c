//! Real process launcher
//!
//! Spawns helpers with `tokio::process`. On unix every helper becomes the
//! leader of a new process group so the whole tree can be signalled at once.

use std::collections::BTreeMap;
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::traits::{ProcessHandle, ProcessLauncher};

/// Handle for a spawned helper
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
    pid: u32,
}

impl ChildHandle {
    /// Check if a process is still running
    fn is_process_running(child: &mut Child) -> bool {
        match child.try_wait() {
            Ok(None) => true,     // Still running
            Ok(Some(_)) => false, // Exited
            Err(_) => false,      // Error checking status
        }
    }
}

impl ProcessHandle for ChildHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&mut self) -> bool {
        Self::is_process_running(&mut self.child)
    }
}

/// Real process launcher implementation
#[derive(Debug, Default)]
pub struct RealProcessLauncher;

impl RealProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Build the command without spawning it
    pub fn build_command(command: &[String], env: &BTreeMap<String, String>) -> std::io::Result<Command> {
        let (program, args) = command.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty helper command")
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args).envs(env);

        // Helpers keep the supervisor's stdout/stderr; stdin is never used
        cmd.stdin(Stdio::null()).stdout(Stdio::inherit()).stderr(Stdio::inherit());

        #[cfg(unix)]
        cmd.process_group(0);

        Ok(cmd)
    }
}

impl ProcessLauncher for RealProcessLauncher {
    fn spawn(
        &self,
        command: &[String],
        env: &BTreeMap<String, String>,
    ) -> std::io::Result<Box<dyn ProcessHandle>> {
        let child = Self::build_command(command, env)?.spawn()?;
        let pid = child.id().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "spawned helper exited before reporting a PID")
        })?;

        Ok(Box::new(ChildHandle { child, pid }))
    }
}
