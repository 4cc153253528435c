//! Test fixtures and data for supervisor tests
//!
//! This module provides consistent test data and fixtures used across all test suites.

use supervisor::{ProcessEntry, SupervisorOptions};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Project layouts as seen by framework detection
    pub const RSPEC_PROJECT: &'static [&'static str] = &["spec"];
    pub const RSPEC_CUCUMBER_PROJECT: &'static [&'static str] = &["spec", "features"];
    pub const FULL_PROJECT: &'static [&'static str] = &["spec", "features", "test/test_helper.rb", "Gemfile"];
    pub const EMPTY_PROJECT: &'static [&'static str] = &[];

    /// First pid handed out by the fake launcher
    pub const FIRST_PID: u32 = 1000;

    pub const CUSTOM_PORT: u16 = 1337;

    /// Options with short waits so failure paths finish in a handful of ticks
    pub fn short_wait_options() -> SupervisorOptions {
        SupervisorOptions::default().with_wait(Some(2)).with_retry_delay(2)
    }

    /// Options that keep framework detection but never touch foreign processes
    pub fn quiet_options() -> SupervisorOptions {
        SupervisorOptions::default().with_aggressive_kill(false)
    }

    /// A process table mixing helpers, excluded watchers and unrelated processes
    pub fn mixed_process_table() -> Vec<ProcessEntry> {
        vec![
            ProcessEntry::new(501, Some(1), "ruby", "ruby /usr/bin/spork -p 8989"),
            ProcessEntry::new(502, Some(501), "ruby", "ruby spork cu -p 8990"),
            ProcessEntry::new(503, Some(1), "ruby", "ruby drb ring_server"),
            ProcessEntry::new(504, Some(1), "ruby", "ruby magazine_slave_provider 3"),
            ProcessEntry::new(505, Some(1), "ruby", "ruby bin/guard --plugin spork"),
            ProcessEntry::new(506, Some(1), "bash", "bash -l"),
            ProcessEntry::new(std::process::id(), Some(1), "preloader", "preloader run --wait 30 spork"),
        ]
    }

    /// Pids of `mixed_process_table` a global kill must target
    pub fn stray_helper_pids() -> Vec<u32> {
        vec![501, 502, 503, 504]
    }
}
