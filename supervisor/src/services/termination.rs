//! Process termination strategies
//!
//! The strategy is picked once at startup from platform capabilities: where
//! process groups exist a single group signal reaches every descendant,
//! elsewhere the tree is discovered from a process snapshot.

use std::sync::Arc;

use crate::error::SupervisorResult;
use crate::services::tree_killer::ProcessTreeKiller;
use crate::traits::{ProcessSignaller, ProcessTable, ProcessTerminationStrategy};

/// SIGKILL to the helper's process group (helpers are spawned as group leaders)
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct ProcessGroupTermination;

#[cfg(unix)]
impl ProcessGroupTermination {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ProcessTerminationStrategy for ProcessGroupTermination {
    fn terminate(&self, pid: u32) -> SupervisorResult<()> {
        crate::services::signaller::kill_process_group(pid)
    }

    fn name(&self) -> &'static str {
        "process-group"
    }
}

/// Kill the helper and every descendant found in a process snapshot
pub struct ProcessTreeTermination {
    killer: ProcessTreeKiller,
}

impl ProcessTreeTermination {
    pub fn new(killer: ProcessTreeKiller) -> Self {
        Self { killer }
    }
}

impl ProcessTerminationStrategy for ProcessTreeTermination {
    fn terminate(&self, pid: u32) -> SupervisorResult<()> {
        self.killer.kill_tree(pid).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "process-tree"
    }
}

/// Strategy for the current platform
#[cfg(unix)]
pub fn platform_strategy(
    _table: Arc<dyn ProcessTable>,
    _signaller: Arc<dyn ProcessSignaller>,
) -> Arc<dyn ProcessTerminationStrategy> {
    Arc::new(ProcessGroupTermination::new())
}

/// Strategy for the current platform
#[cfg(not(unix))]
pub fn platform_strategy(
    table: Arc<dyn ProcessTable>,
    signaller: Arc<dyn ProcessSignaller>,
) -> Arc<dyn ProcessTerminationStrategy> {
    Arc::new(ProcessTreeTermination::new(ProcessTreeKiller::new(table, signaller)))
}
