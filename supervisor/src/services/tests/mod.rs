//! Service-specific tests
//!
//! Each real service has its own test file. Tests that touch the OS use
//! short-lived local resources only (loopback listeners, `sleep` children,
//! temporary directories).


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::traits::ProcessEntry;

    /// Standard timeout for async operations in tests
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Helper to run async operations with timeout
    pub async fn with_timeout<T, F>(future: F) -> Result<T, tokio::time::error::Elapsed>
    where
        F: std::future::Future<Output = T>,
    {
        timeout(TEST_TIMEOUT, future).await
    }

    /// Snapshot entry with a generic helper command line
    pub fn entry(pid: u32, parent: Option<u32>) -> ProcessEntry {
        ProcessEntry::new(pid, parent, "ruby", format!("ruby worker-{}", pid))
    }
}
