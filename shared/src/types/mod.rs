//! Core types used throughout the preloader supervisor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Test framework served by a preloader helper process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkType {
    #[serde(rename = "rspec")]
    RSpec,
    Cucumber,
    TestUnit,
    #[serde(rename = "minitest")]
    MiniTest,
}

impl FrameworkType {
    /// Every supported framework, in canonical instance order
    pub const ALL: [FrameworkType; 4] = [
        FrameworkType::RSpec,
        FrameworkType::Cucumber,
        FrameworkType::TestUnit,
        FrameworkType::MiniTest,
    ];

    /// Configuration tag, also accepted by the file-change entry point
    pub fn tag(&self) -> &'static str {
        match self {
            FrameworkType::RSpec => "rspec",
            FrameworkType::Cucumber => "cucumber",
            FrameworkType::TestUnit => "test_unit",
            FrameworkType::MiniTest => "minitest",
        }
    }

    /// Human-readable name used in logs and notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            FrameworkType::RSpec => "RSpec",
            FrameworkType::Cucumber => "Cucumber",
            FrameworkType::TestUnit => "Test::Unit",
            FrameworkType::MiniTest => "MiniTest",
        }
    }

    /// Launcher subcommand selecting this framework (the primary framework has none)
    pub fn subcommand(&self) -> Option<&'static str> {
        match self {
            FrameworkType::RSpec => None,
            FrameworkType::Cucumber => Some("cu"),
            FrameworkType::TestUnit => Some("testunit"),
            FrameworkType::MiniTest => Some("minitest"),
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            FrameworkType::RSpec => 8989,
            FrameworkType::Cucumber => 8990,
            FrameworkType::TestUnit => 8988,
            FrameworkType::MiniTest => 8987,
        }
    }

    /// Project-relative path whose presence marks the framework as in use.
    /// MiniTest has no marker and must be enabled explicitly.
    pub fn detection_path(&self) -> Option<&'static str> {
        match self {
            FrameworkType::RSpec => Some("spec"),
            FrameworkType::Cucumber => Some("features"),
            FrameworkType::TestUnit => Some("test/test_helper.rb"),
            FrameworkType::MiniTest => None,
        }
    }

    /// Join display names the way user-facing messages list frameworks
    pub fn join_display(frameworks: &[FrameworkType]) -> String {
        frameworks
            .iter()
            .map(|f| f.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for FrameworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rspec" => Ok(FrameworkType::RSpec),
            "cucumber" => Ok(FrameworkType::Cucumber),
            "test_unit" | "testunit" => Ok(FrameworkType::TestUnit),
            "minitest" => Ok(FrameworkType::MiniTest),
            _ => Err(format!("Unknown framework: {s}")),
        }
    }
}

/// Why a set of helpers is being launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchAction {
    Start,
    Reload,
}

impl LaunchAction {
    pub fn verb(&self) -> &'static str {
        match self {
            LaunchAction::Start => "start",
            LaunchAction::Reload => "reload",
        }
    }

    /// "Starting" / "Reloading"
    pub fn progressive(&self) -> &'static str {
        match self {
            LaunchAction::Start => "Starting",
            LaunchAction::Reload => "Reloading",
        }
    }

    /// "started" / "reloaded"
    pub fn past(&self) -> &'static str {
        match self {
            LaunchAction::Start => "started",
            LaunchAction::Reload => "reloaded",
        }
    }
}

impl fmt::Display for LaunchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Lifecycle position of a managed helper process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceState {
    NotStarted,
    Running,
    Stopped,
}

/// Severity icon attached to desktop notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationImage {
    Success,
    Failed,
}

impl fmt::Display for NotificationImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationImage::Success => write!(f, "success"),
            NotificationImage::Failed => write!(f, "failed"),
        }
    }
}
