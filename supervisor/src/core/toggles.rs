//! Override-else-detect resolution of boolean switches
//!
//! Each toggle resolves to its explicit option override when one is set and to
//! its detector otherwise. Results are computed on first use and cached for
//! the lifetime of the owning supervisor.

use std::collections::HashMap;
use std::sync::Arc;

use shared::FrameworkType;

use crate::config::SupervisorOptions;
use crate::traits::FileSystem;

/// Switches resolved per supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Framework(FrameworkType),
    Bundler,
    Foreman,
    AggressiveKill,
    Quiet,
}

/// Fallback used when no override is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    PathExists(&'static str),
    Constant(bool),
}

impl Toggle {
    pub fn detector(&self) -> Detector {
        match self {
            Toggle::Framework(framework) => match framework.detection_path() {
                Some(path) => Detector::PathExists(path),
                None => Detector::Constant(false),
            },
            Toggle::Bundler => Detector::PathExists("Gemfile"),
            Toggle::Foreman => Detector::PathExists("Procfile"),
            Toggle::AggressiveKill => Detector::Constant(true),
            Toggle::Quiet => Detector::Constant(false),
        }
    }
}

pub struct Toggles {
    overrides: HashMap<Toggle, bool>,
    file_system: Arc<dyn FileSystem>,
    resolved: HashMap<Toggle, bool>,
}

impl Toggles {
    pub fn new(options: &SupervisorOptions, file_system: Arc<dyn FileSystem>) -> Self {
        let mut overrides = HashMap::new();

        for framework in FrameworkType::ALL {
            if let Some(enabled) = options.framework_override(framework) {
                overrides.insert(Toggle::Framework(framework), enabled);
            }
        }
        if let Some(bundler) = options.bundler {
            overrides.insert(Toggle::Bundler, bundler);
        }
        if let Some(foreman) = &options.foreman {
            overrides.insert(Toggle::Foreman, foreman.enabled());
        }
        if let Some(aggressive_kill) = options.aggressive_kill {
            overrides.insert(Toggle::AggressiveKill, aggressive_kill);
        }
        if let Some(quiet) = options.quiet {
            overrides.insert(Toggle::Quiet, quiet);
        }

        Self {
            overrides,
            file_system,
            resolved: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, toggle: Toggle) -> bool {
        if let Some(value) = self.resolved.get(&toggle) {
            return *value;
        }

        let value = match self.overrides.get(&toggle) {
            Some(value) => *value,
            None => match toggle.detector() {
                Detector::PathExists(path) => self.file_system.exists(path),
                Detector::Constant(value) => value,
            },
        };

        self.resolved.insert(toggle, value);
        value
    }

    /// Frameworks resolving to active, in canonical order
    pub fn active_frameworks(&mut self) -> Vec<FrameworkType> {
        FrameworkType::ALL
            .into_iter()
            .filter(|framework| self.resolve(Toggle::Framework(*framework)))
            .collect()
    }
}
