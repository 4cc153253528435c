//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod file_system;
pub mod launcher;
pub mod notifier;
pub mod probe;
pub mod process_table;
pub mod signaller;
pub mod termination;
pub mod ticker;
pub mod tree_killer;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use crate::traits::{
    FileSystem, Notifier, ProcessLauncher, ProcessSignaller, ProcessTable, ProcessTerminationStrategy,
    ReadinessProbe, Ticker,
};

// Re-export all service implementations
pub use file_system::RealFileSystem;
pub use launcher::RealProcessLauncher;
pub use notifier::RealNotifier;
pub use probe::TcpReadinessProbe;
pub use process_table::RealProcessTable;
pub use signaller::RealSignaller;
pub use termination::{platform_strategy, ProcessTreeTermination};
pub use ticker::RealTicker;
pub use tree_killer::ProcessTreeKiller;

#[cfg(unix)]
pub use termination::ProcessGroupTermination;

/// Collaborators injected into the supervisor and its instances
#[derive(Clone)]
pub struct Services {
    pub file_system: Arc<dyn FileSystem>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub termination: Arc<dyn ProcessTerminationStrategy>,
    pub probe: Arc<dyn ReadinessProbe>,
    pub process_table: Arc<dyn ProcessTable>,
    pub signaller: Arc<dyn ProcessSignaller>,
    pub notifier: Arc<dyn Notifier>,
    pub ticker: Arc<dyn Ticker>,
}

impl Services {
    /// Real services for a project rooted at `project_root`
    pub fn system(project_root: impl Into<PathBuf>) -> Self {
        let process_table: Arc<dyn ProcessTable> = Arc::new(RealProcessTable::new());
        let signaller: Arc<dyn ProcessSignaller> = Arc::new(RealSignaller::new());
        let termination = platform_strategy(process_table.clone(), signaller.clone());

        Self {
            file_system: Arc::new(RealFileSystem::with_base_dir(project_root)),
            launcher: Arc::new(RealProcessLauncher::new()),
            termination,
            probe: Arc::new(TcpReadinessProbe::new()),
            process_table,
            signaller,
            notifier: Arc::new(RealNotifier::new()),
            ticker: Arc::new(RealTicker::new()),
        }
    }
}
