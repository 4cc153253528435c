//! Forced kill of individual processes

use tracing::debug;

use crate::error::SupervisorResult;
use crate::traits::ProcessSignaller;

/// Real signaller: SIGKILL through nix on unix, sysinfo elsewhere
#[derive(Debug, Default)]
pub struct RealSignaller;

impl RealSignaller {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ProcessSignaller for RealSignaller {
    fn force_kill(&self, pid: u32) -> SupervisorResult<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) => {
                debug!("🔨 Sent SIGKILL to process {}", pid);
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!("Process {} already gone", pid);
                Ok(())
            }
            Err(e) => Err(crate::error::SupervisorError::termination(pid, e.to_string())),
        }
    }
}

#[cfg(not(unix))]
impl ProcessSignaller for RealSignaller {
    fn force_kill(&self, pid: u32) -> SupervisorResult<()> {
        use sysinfo::{Pid, System};

        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        if !system.refresh_process(pid) {
            debug!("Process {} already gone", pid);
            return Ok(());
        }

        match system.process(pid) {
            Some(process) => {
                if process.kill() {
                    debug!("🔨 Killed process {}", pid);
                    Ok(())
                } else {
                    Err(crate::error::SupervisorError::termination(pid.as_u32(), "kill request was rejected"))
                }
            }
            None => Ok(()),
        }
    }
}

#[cfg(unix)]
pub(crate) fn kill_process_group(pgid: u32) -> SupervisorResult<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        Ok(()) => {
            debug!("🔨 Sent SIGKILL to process group {}", pgid);
            Ok(())
        }
        Err(Errno::ESRCH) => {
            debug!("Process group {} already gone", pgid);
            Ok(())
        }
        Err(e) => Err(crate::error::SupervisorError::termination(pgid, e.to_string())),
    }
}
