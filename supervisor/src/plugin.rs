//! Host lifecycle adapter
//!
//! Maps the callbacks of a file-watching host onto supervisor operations.

use shared::LaunchAction;
use tracing::debug;

use crate::config::SupervisorOptions;
use crate::error::SupervisorResult;
use crate::services::Services;
use crate::supervisor::{LaunchReport, Reevaluation, Selection, Supervisor};

pub struct PreloaderPlugin {
    supervisor: Supervisor,
}

impl PreloaderPlugin {
    pub fn new(options: SupervisorOptions, services: Services) -> SupervisorResult<Self> {
        Ok(Self {
            supervisor: Supervisor::new(options, services)?,
        })
    }

    pub fn from_supervisor(supervisor: Supervisor) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut Supervisor {
        &mut self.supervisor
    }

    /// Clear orphans from earlier runs, then start every active helper
    pub async fn on_start(&mut self) -> SupervisorResult<LaunchReport> {
        self.supervisor.kill_global()?;
        self.supervisor.launch(LaunchAction::Start, &Selection::All).await
    }

    pub async fn on_reload(&mut self) -> SupervisorResult<LaunchReport> {
        self.supervisor.stop(&Selection::All)?;
        self.supervisor.launch(LaunchAction::Reload, &Selection::All).await
    }

    /// Reload the helpers affected by `changes`.
    ///
    /// Changes that are all framework tags reload just those frameworks; any
    /// plain path reloads everything.
    pub async fn on_file_change<S: AsRef<str>>(&mut self, changes: &[S]) -> SupervisorResult<LaunchReport> {
        let selection = Selection::from_changes(changes);
        debug!("File change reloads {:?}", selection);

        self.supervisor.stop(&selection)?;
        self.supervisor.launch(LaunchAction::Reload, &selection).await
    }

    pub fn on_stop(&mut self) -> SupervisorResult<Vec<u32>> {
        self.supervisor.stop(&Selection::All)
    }

    pub fn reconfigure(&mut self, options: SupervisorOptions) -> SupervisorResult<Reevaluation> {
        self.supervisor.reevaluate(options)
    }
}
