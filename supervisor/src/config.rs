//! Supervisor configuration
//!
//! Options are plain data: every toggle is an optional override that falls back
//! to filesystem detection (see `core::toggles`). Options can be built fluently
//! or loaded from a JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::FrameworkType;

use crate::error::SupervisorResult;
use crate::traits::ProcessEntry;

/// Default primary wait, in seconds
pub const DEFAULT_WAIT_SECS: u64 = 30;

/// Grace period used when the primary wait is unbounded
pub const FALLBACK_RETRY_DELAY_SECS: u64 = 60;

/// Default helper launcher binary
pub const DEFAULT_LAUNCHER: &str = "spork";

/// Foreman setting as written in configuration: a flag or `{ "env": ".env.test" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForemanSetting {
    Flag(bool),
    EnvFile { env: String },
}

impl ForemanSetting {
    /// Boolean override this setting represents
    pub fn enabled(&self) -> bool {
        match self {
            ForemanSetting::Flag(enabled) => *enabled,
            ForemanSetting::EnvFile { .. } => true,
        }
    }

    pub fn env_file(&self) -> Option<&str> {
        match self {
            ForemanSetting::Flag(_) => None,
            ForemanSetting::EnvFile { env } => Some(env),
        }
    }
}

/// Per-framework overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkOptions {
    pub enabled: Option<bool>,
    pub port: Option<u16>,
    pub env: BTreeMap<String, String>,
}

/// Command-line signature of helper processes targeted by the global kill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillSignature {
    /// A process matches when its command line contains any of these
    pub patterns: Vec<String>,
    /// ...and none of these
    pub excluded: Vec<String>,
    /// Allowed executable stems, compared case-insensitively. Empty allows all.
    pub executables: Vec<String>,
}

impl Default for KillSignature {
    fn default() -> Self {
        let executables = if cfg!(windows) {
            vec!["cmd".to_string(), "ruby".to_string()]
        } else {
            Vec::new()
        };

        Self {
            patterns: vec![
                "spork".to_string(),
                "ring_server".to_string(),
                "magazine_slave_provider".to_string(),
            ],
            excluded: vec!["guard".to_string(), "preloader".to_string()],
            executables,
        }
    }
}

impl KillSignature {
    pub fn matches(&self, entry: &ProcessEntry) -> bool {
        let command_line = entry.command_line.as_str();

        let hit = self.patterns.iter().any(|p| command_line.contains(p.as_str()));
        if !hit {
            return false;
        }

        if self.excluded.iter().any(|e| command_line.contains(e.as_str())) {
            return false;
        }

        if self.executables.is_empty() {
            return true;
        }

        let stem = Path::new(&entry.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(entry.name.as_str());
        self.executables.iter().any(|exe| exe.eq_ignore_ascii_case(stem))
    }
}

/// Options recognized by the supervisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorOptions {
    /// Primary wait in seconds; `None` polls forever
    pub wait: Option<u64>,
    /// Grace period in seconds after the primary wait expires
    pub retry_delay: Option<u64>,
    pub aggressive_kill: Option<bool>,
    pub quiet: Option<bool>,
    pub bundler: Option<bool>,
    pub foreman: Option<ForemanSetting>,
    pub launcher: String,
    pub frameworks: BTreeMap<FrameworkType, FrameworkOptions>,
    pub kill_signature: KillSignature,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            wait: Some(DEFAULT_WAIT_SECS),
            retry_delay: None,
            aggressive_kill: None,
            quiet: None,
            bundler: None,
            foreman: None,
            launcher: DEFAULT_LAUNCHER.to_string(),
            frameworks: BTreeMap::new(),
            kill_signature: KillSignature::default(),
        }
    }
}

impl SupervisorOptions {
    /// Load options from a JSON file; absent keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> SupervisorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SupervisorResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Grace period: explicit value, else twice the wait, else the fixed fallback
    pub fn retry_delay_secs(&self) -> u64 {
        self.retry_delay
            .unwrap_or_else(|| self.wait.map(|w| w * 2).unwrap_or(FALLBACK_RETRY_DELAY_SECS))
    }

    pub fn port_for(&self, framework: FrameworkType) -> u16 {
        self.frameworks
            .get(&framework)
            .and_then(|f| f.port)
            .unwrap_or_else(|| framework.default_port())
    }

    pub fn env_for(&self, framework: FrameworkType) -> BTreeMap<String, String> {
        self.frameworks
            .get(&framework)
            .map(|f| f.env.clone())
            .unwrap_or_default()
    }

    pub fn framework_override(&self, framework: FrameworkType) -> Option<bool> {
        self.frameworks.get(&framework).and_then(|f| f.enabled)
    }

    /// Configure the primary wait (fluent API)
    pub fn with_wait(mut self, wait: Option<u64>) -> Self {
        self.wait = wait;
        self
    }

    /// Configure the grace period (fluent API)
    pub fn with_retry_delay(mut self, retry_delay: u64) -> Self {
        self.retry_delay = Some(retry_delay);
        self
    }

    pub fn with_aggressive_kill(mut self, enabled: bool) -> Self {
        self.aggressive_kill = Some(enabled);
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = Some(quiet);
        self
    }

    pub fn with_bundler(mut self, enabled: bool) -> Self {
        self.bundler = Some(enabled);
        self
    }

    pub fn with_foreman(mut self, foreman: ForemanSetting) -> Self {
        self.foreman = Some(foreman);
        self
    }

    pub fn with_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.launcher = launcher.into();
        self
    }

    /// Force a framework on or off regardless of detection
    pub fn with_framework(mut self, framework: FrameworkType, enabled: bool) -> Self {
        self.frameworks.entry(framework).or_default().enabled = Some(enabled);
        self
    }

    pub fn with_port(mut self, framework: FrameworkType, port: u16) -> Self {
        self.frameworks.entry(framework).or_default().port = Some(port);
        self
    }

    pub fn with_env(mut self, framework: FrameworkType, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.frameworks
            .entry(framework)
            .or_default()
            .env
            .insert(key.into(), value.into());
        self
    }

    pub fn with_kill_signature(mut self, signature: KillSignature) -> Self {
        self.kill_signature = signature;
        self
    }
}
