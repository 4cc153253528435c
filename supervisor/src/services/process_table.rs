//! System-wide process enumeration backed by sysinfo

use sysinfo::System;

use crate::error::SupervisorResult;
use crate::traits::{ProcessEntry, ProcessTable};

/// Real process table implementation
#[derive(Debug, Default)]
pub struct RealProcessTable;

impl RealProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for RealProcessTable {
    fn snapshot(&self) -> SupervisorResult<Vec<ProcessEntry>> {
        let mut system = System::new();
        system.refresh_processes();

        let entries = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                parent: process.parent().map(|parent| parent.as_u32()),
                name: process.name().to_string(),
                command_line: process.cmd().join(" "),
            })
            .collect();

        Ok(entries)
    }
}
