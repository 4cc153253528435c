//! One supervised helper process
//!
//! A `ManagedInstance` owns the immutable description of a helper (framework,
//! port, environment, launch flags) and, once started, its process handle.
//! Its pid is recorded exactly once; a supervisor builds a fresh instance for
//! every relaunch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use shared::{framework_debug, framework_warn, FrameworkType, InstanceState};

use crate::error::{SupervisorError, SupervisorResult};
use crate::services::Services;
use crate::traits::{ProcessHandle, ProcessLauncher, ProcessTerminationStrategy, ReadinessGate, ReadinessProbe};

/// Host the readiness probe connects to
pub const PROBE_HOST: &str = "127.0.0.1";

/// Foreman wrapping of the helper command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Foreman {
    #[default]
    Disabled,
    Enabled,
    EnvFile(String),
}

impl Foreman {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Foreman::Disabled)
    }
}

/// Flags shaping the helper command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub launcher: String,
    pub bundler: bool,
    pub foreman: Foreman,
    pub quiet: bool,
    /// Run through `cmd /C`, needed where the launcher is a batch script
    pub windows_shell: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            launcher: crate::config::DEFAULT_LAUNCHER.to_string(),
            bundler: false,
            foreman: Foreman::Disabled,
            quiet: false,
            windows_shell: false,
        }
    }
}

/// Immutable configuration of one helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub framework: FrameworkType,
    pub port: u16,
    pub env: BTreeMap<String, String>,
    pub launch: LaunchOptions,
}

impl InstanceSpec {
    pub fn new(framework: FrameworkType, port: u16) -> Self {
        Self {
            framework,
            port,
            env: BTreeMap::new(),
            launch: LaunchOptions::default(),
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_launch(mut self, launch: LaunchOptions) -> Self {
        self.launch = launch;
        self
    }

    /// Command tokens for this helper. The order is what the launcher's
    /// argument parser expects and must not change.
    pub fn command(&self) -> Vec<String> {
        let launch = &self.launch;
        let mut parts: Vec<String> = Vec::new();

        if launch.windows_shell {
            parts.extend(["cmd", "/C"].map(String::from));
        }
        if launch.bundler {
            parts.extend(["bundle", "exec"].map(String::from));
        }
        if launch.foreman.is_enabled() {
            parts.extend(["foreman", "run"].map(String::from));
        }

        parts.push(launch.launcher.clone());
        if let Some(subcommand) = self.framework.subcommand() {
            parts.push(subcommand.to_string());
        }

        parts.push("-p".to_string());
        parts.push(self.port.to_string());

        if launch.quiet {
            parts.push("-q".to_string());
        }
        if let Foreman::EnvFile(env_file) = &launch.foreman {
            parts.push(format!("-e={env_file}"));
        }

        parts
    }
}

pub struct ManagedInstance {
    spec: InstanceSpec,
    launcher: Arc<dyn ProcessLauncher>,
    termination: Arc<dyn ProcessTerminationStrategy>,
    probe: Arc<dyn ReadinessProbe>,
    gate: Option<Arc<dyn ReadinessGate>>,
    process: Option<Box<dyn ProcessHandle>>,
    pid: Option<u32>,
}

impl ManagedInstance {
    pub fn new(spec: InstanceSpec, services: &Services) -> Self {
        Self {
            spec,
            launcher: services.launcher.clone(),
            termination: services.termination.clone(),
            probe: services.probe.clone(),
            gate: None,
            process: None,
            pid: None,
        }
    }

    /// Require an additional readiness condition on top of the port probe
    pub fn with_readiness_gate(mut self, gate: Arc<dyn ReadinessGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn framework(&self) -> FrameworkType {
        self.spec.framework
    }

    pub fn port(&self) -> u16 {
        self.spec.port
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.spec.env
    }

    pub fn spec(&self) -> &InstanceSpec {
        &self.spec
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn command(&self) -> Vec<String> {
        self.spec.command()
    }

    pub fn state(&mut self) -> InstanceState {
        if self.pid.is_none() {
            InstanceState::NotStarted
        } else if self.alive() {
            InstanceState::Running
        } else {
            InstanceState::Stopped
        }
    }

    /// Spawn the helper without waiting for it to become ready
    pub fn start(&mut self) -> SupervisorResult<u32> {
        if let Some(pid) = self.pid {
            return Err(SupervisorError::AlreadyStarted {
                framework: self.spec.framework,
                pid,
            });
        }

        let command = self.command();
        let process = self
            .launcher
            .spawn(&command, &self.spec.env)
            .map_err(|source| SupervisorError::SpawnFailed {
                framework: self.spec.framework,
                source,
            })?;

        let pid = process.pid();
        framework_debug!(self.spec.framework, "Spawned preloader {} ('{}')", pid, command.join(" "));

        self.pid = Some(pid);
        self.process = Some(process);
        Ok(pid)
    }

    /// Forcibly terminate the helper and its descendants.
    ///
    /// Returns `false` without doing anything when the instance was never
    /// started or has already been stopped.
    pub fn stop(&mut self) -> SupervisorResult<bool> {
        let (Some(pid), Some(_)) = (self.pid, self.process.as_ref()) else {
            framework_debug!(self.spec.framework, "Stop requested for a preloader that is not running");
            return Ok(false);
        };

        framework_debug!(
            self.spec.framework,
            "Terminating preloader {} with {} strategy",
            pid,
            self.termination.name()
        );
        self.termination.terminate(pid)?;
        self.process = None;
        Ok(true)
    }

    /// Whether a pid is recorded and the OS still reports the process running
    pub fn alive(&mut self) -> bool {
        match (self.pid, self.process.as_mut()) {
            (Some(_), Some(process)) => process.is_alive(),
            _ => false,
        }
    }

    /// Alive and accepting connections on its port (and past the readiness
    /// gate, when one is attached)
    pub async fn running(&mut self) -> SupervisorResult<bool> {
        if !self.alive() {
            return Ok(false);
        }

        if !self.probe.probe(PROBE_HOST, self.spec.port).await? {
            return Ok(false);
        }

        match &self.gate {
            Some(gate) => {
                let ready = gate.is_ready().await;
                if !ready {
                    framework_warn!(
                        self.spec.framework,
                        "Port {} accepts connections but the readiness gate is still closed",
                        self.spec.port
                    );
                }
                Ok(ready)
            }
            None => Ok(true),
        }
    }
}

impl fmt::Display for ManagedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec.framework)
    }
}

impl fmt::Debug for ManagedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedInstance")
            .field("spec", &self.spec)
            .field("pid", &self.pid)
            .field("has_process", &self.process.is_some())
            .field("has_gate", &self.gate.is_some())
            .finish()
    }
}
