//! Descendant-tree kill for platforms without process groups

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::SupervisorResult;
use crate::traits::{ProcessEntry, ProcessSignaller, ProcessTable};

/// Collect `root` followed by every transitive child found in `snapshot`.
///
/// Each pid is visited once, so an inconsistent snapshot (a pid listed as
/// its own ancestor) cannot make this loop forever.
pub fn collect_tree(root: u32, snapshot: &[ProcessEntry]) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for entry in snapshot {
        if let Some(parent) = entry.parent {
            children.entry(parent).or_default().push(entry.pid);
        }
    }

    let mut visited = HashSet::new();
    let mut tree = Vec::new();
    let mut stack = vec![root];
    while let Some(pid) = stack.pop() {
        if !visited.insert(pid) {
            continue;
        }
        tree.push(pid);
        if let Some(child_pids) = children.get(&pid) {
            stack.extend(child_pids.iter().rev().copied());
        }
    }

    tree
}

pub struct ProcessTreeKiller {
    table: Arc<dyn ProcessTable>,
    signaller: Arc<dyn ProcessSignaller>,
}

impl ProcessTreeKiller {
    pub fn new(table: Arc<dyn ProcessTable>, signaller: Arc<dyn ProcessSignaller>) -> Self {
        Self { table, signaller }
    }

    /// Force-kill `root` and all of its descendants, returning the pids targeted
    pub fn kill_tree(&self, root: u32) -> SupervisorResult<Vec<u32>> {
        let snapshot = self.table.snapshot()?;
        let tree = collect_tree(root, &snapshot);

        debug!("Killing process tree of {}: {:?}", root, tree);
        for pid in &tree {
            if let Err(e) = self.signaller.force_kill(*pid) {
                debug!("Ignoring kill failure for {}: {}", pid, e);
            }
        }

        Ok(tree)
    }
}
