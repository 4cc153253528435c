//! Preloader supervisor
//!
//! Owns the helper instances for the current run and drives the
//! launch → verify → grace period → verified/failed state machine, bulk and
//! per-framework stops, and the system-wide orphan kill.

use std::sync::Arc;

use shared::{framework_info, framework_warn, FrameworkType, LaunchAction, NotificationImage};
use tracing::{debug, error, info, warn};

use crate::config::SupervisorOptions;
use crate::core::instance::{Foreman, InstanceSpec, LaunchOptions, ManagedInstance};
use crate::core::toggles::{Toggle, Toggles};
use crate::error::{SupervisorError, SupervisorResult};
use crate::services::Services;
use crate::traits::ReadinessGate;

/// Title of every desktop notification
pub const NOTIFICATION_TITLE: &str = "Spork";

/// Which instances an operation targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(Vec<FrameworkType>),
}

impl Selection {
    pub fn only(framework: FrameworkType) -> Self {
        Selection::Only(vec![framework])
    }

    pub fn includes(&self, framework: FrameworkType) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(frameworks) => frameworks.contains(&framework),
        }
    }

    /// Interpret file-change payloads: if every entry is a framework tag only
    /// those frameworks are targeted, anything else targets everything.
    pub fn from_changes<S: AsRef<str>>(changes: &[S]) -> Self {
        if changes.is_empty() {
            return Selection::All;
        }

        let mut frameworks = Vec::new();
        for change in changes {
            match change.as_ref().parse::<FrameworkType>() {
                Ok(framework) => {
                    if !frameworks.contains(&framework) {
                        frameworks.push(framework);
                    }
                }
                Err(_) => return Selection::All,
            }
        }
        Selection::Only(frameworks)
    }
}

/// How verification ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Ready within the primary wait
    Verified,
    /// Ready only during the grace period
    VerifiedAfterGrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub action: LaunchAction,
    pub frameworks: Vec<FrameworkType>,
    pub outcome: LaunchOutcome,
    /// Poll ticks (seconds) spent until every target was ready
    pub elapsed_secs: u64,
}

/// Result of re-evaluating the options of a live supervisor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reevaluation {
    /// Frameworks whose running instance was kept as-is
    pub adopted: Vec<FrameworkType>,
    /// Frameworks whose instance was dropped (and stopped when alive)
    pub retired: Vec<FrameworkType>,
}

pub struct Supervisor {
    options: SupervisorOptions,
    services: Services,
    toggles: Toggles,
    gate: Option<Arc<dyn ReadinessGate>>,
    instances: Vec<ManagedInstance>,
}

impl Supervisor {
    /// Create a supervisor with one instance per active framework
    pub fn new(options: SupervisorOptions, services: Services) -> SupervisorResult<Self> {
        let mut toggles = Toggles::new(&options, services.file_system.clone());
        let specs = desired_specs(&options, &mut toggles)?;
        let instances = specs
            .into_iter()
            .map(|spec| ManagedInstance::new(spec, &services))
            .collect();

        Ok(Self {
            options,
            services,
            toggles,
            gate: None,
            instances,
        })
    }

    /// Attach an extra readiness condition to every current and future instance
    pub fn with_readiness_gate(mut self, gate: Arc<dyn ReadinessGate>) -> Self {
        self.instances = std::mem::take(&mut self.instances)
            .into_iter()
            .map(|instance| instance.with_readiness_gate(gate.clone()))
            .collect();
        self.gate = Some(gate);
        self
    }

    pub fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    pub fn instances(&self) -> &[ManagedInstance] {
        &self.instances
    }

    pub fn active_frameworks(&self) -> Vec<FrameworkType> {
        self.instances.iter().map(|i| i.framework()).collect()
    }

    /// Pids recorded by the current instances, started or not
    pub fn all_pids(&self) -> Vec<u32> {
        self.instances.iter().filter_map(|i| i.pid()).collect()
    }

    /// Start the selected helpers and wait until every one accepts connections.
    ///
    /// Waits up to `wait` seconds, then a further `retry_delay` seconds. A
    /// final timeout returns `TaskFailed`; spawned helpers are left running.
    pub async fn launch(&mut self, action: LaunchAction, selection: &Selection) -> SupervisorResult<LaunchReport> {
        let targets: Vec<usize> = (0..self.instances.len())
            .filter(|&i| selection.includes(self.instances[i].framework()))
            .collect();
        let frameworks: Vec<FrameworkType> = targets.iter().map(|&i| self.instances[i].framework()).collect();

        if targets.is_empty() {
            debug!("No active preloaders to {}", action);
            return Ok(LaunchReport {
                action,
                frameworks,
                outcome: LaunchOutcome::Verified,
                elapsed_secs: 0,
            });
        }

        let names = FrameworkType::join_display(&frameworks);
        info!("{} preloader for {}", action.progressive(), names);

        for &index in &targets {
            self.renew_instance(index)?;
            self.instances[index].start()?;
        }

        let mut pending = targets;
        let (ready, waited) = self.poll_until_ready(&mut pending, self.options.wait).await?;
        if ready {
            info!("Preloader for {} successfully {}", names, action.past());
            self.notify(&format!("{} successfully {}", names, action.past()), NotificationImage::Success);
            return Ok(LaunchReport {
                action,
                frameworks,
                outcome: LaunchOutcome::Verified,
                elapsed_secs: waited,
            });
        }

        let retry_delay = self.options.retry_delay_secs();
        error!(
            "Could not {} preloader for {} after {} seconds. Waiting a further {} seconds.",
            action,
            names,
            waited,
            retry_delay
        );
        self.notify(
            &format!(
                "{} NOT {}. Continuing to wait for {} seconds.",
                names,
                action.past(),
                retry_delay
            ),
            NotificationImage::Failed,
        );

        let (ready, extra) = self.poll_until_ready(&mut pending, Some(retry_delay)).await?;
        let total = waited + extra;
        if ready {
            warn!(
                "Preloader for {} eventually {} after {} seconds. Consider raising the wait option beyond this time.",
                names,
                action.past(),
                total
            );
            self.notify(
                &format!("{} eventually {} after {} seconds", names, action.past(), total),
                NotificationImage::Success,
            );
            return Ok(LaunchReport {
                action,
                frameworks,
                outcome: LaunchOutcome::VerifiedAfterGrace,
                elapsed_secs: total,
            });
        }

        let failed: Vec<FrameworkType> = pending.iter().map(|&i| self.instances[i].framework()).collect();
        let failed_names = FrameworkType::join_display(&failed);
        error!(
            "Could not {} preloader for {} after {} seconds. Make sure the launcher works when run manually.",
            action,
            failed_names,
            total
        );
        self.notify(
            &format!("{} NOT {} after {} seconds", failed_names, action.past(), total),
            NotificationImage::Failed,
        );

        Err(SupervisorError::TaskFailed {
            action,
            frameworks: failed_names,
            waited_secs: total,
        })
    }

    /// Stop the selected helpers that are alive; returns the pids stopped.
    ///
    /// Every target is attempted even when an earlier one fails to terminate;
    /// the first failure is returned afterwards.
    pub fn stop(&mut self, selection: &Selection) -> SupervisorResult<Vec<u32>> {
        let mut targets = Vec::new();
        for (index, instance) in self.instances.iter_mut().enumerate() {
            if selection.includes(instance.framework()) && instance.alive() {
                targets.push(index);
            }
        }

        let pids: Vec<u32> = targets.iter().filter_map(|&i| self.instances[i].pid()).collect();
        if pids.is_empty() {
            debug!("No running preloaders to stop");
            return Ok(pids);
        }

        debug!(
            "Killing preloaders with PID: {}",
            pids.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
        );
        let selected = self
            .instances
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| targets.contains(index))
            .map(|(_, instance)| instance);
        stop_each(selected)?;

        Ok(pids)
    }

    /// Kill every process on the machine matching the helper signature.
    ///
    /// Cleans up helpers orphaned by a previous run. Does nothing at all when
    /// aggressive kill is disabled. Kill failures are ignored.
    pub fn kill_global(&mut self) -> SupervisorResult<Vec<u32>> {
        if !self.toggles.resolve(Toggle::AggressiveKill) {
            debug!("Aggressive kill disabled, leaving foreign preloaders alone");
            return Ok(Vec::new());
        }

        let own_pid = std::process::id();
        let pids: Vec<u32> = self
            .services
            .process_table
            .snapshot()?
            .iter()
            .filter(|entry| entry.pid != own_pid && self.options.kill_signature.matches(entry))
            .map(|entry| entry.pid)
            .collect();

        if pids.is_empty() {
            debug!("No stray preloader processes found");
            return Ok(pids);
        }

        info!("Killing {} stray preloader process(es): {:?}", pids.len(), pids);
        for pid in &pids {
            if let Err(e) = self.services.signaller.force_kill(*pid) {
                debug!("Ignoring failure to kill {}: {}", pid, e);
            }
        }

        Ok(pids)
    }

    /// Apply new options without losing track of running helpers.
    ///
    /// Instances whose configuration is unchanged are adopted with their live
    /// process; the rest are stopped and replaced by fresh, unstarted ones.
    pub fn reevaluate(&mut self, options: SupervisorOptions) -> SupervisorResult<Reevaluation> {
        let mut toggles = Toggles::new(&options, self.services.file_system.clone());
        let specs = desired_specs(&options, &mut toggles)?;

        let mut previous = std::mem::take(&mut self.instances);
        let mut summary = Reevaluation::default();
        let mut instances = Vec::with_capacity(specs.len());

        for spec in specs {
            match previous.iter().position(|instance| instance.spec() == &spec) {
                Some(position) => {
                    summary.adopted.push(spec.framework);
                    instances.push(previous.remove(position));
                }
                None => instances.push(self.fresh_instance(spec)),
            }
        }

        self.options = options;
        self.toggles = toggles;
        self.instances = instances;

        let mut retired = Vec::new();
        for mut instance in previous {
            summary.retired.push(instance.framework());
            if instance.alive() {
                framework_info!(instance.framework(), "Stopping preloader retired by new configuration");
                retired.push(instance);
            }
        }
        let stopped = stop_each(retired.iter_mut());

        debug!(
            "Re-evaluated preloaders: adopted {:?}, retired {:?}",
            summary.adopted, summary.retired
        );
        stopped?;
        Ok(summary)
    }

    /// Replace a previously started instance with a fresh one
    fn renew_instance(&mut self, index: usize) -> SupervisorResult<()> {
        if self.instances[index].pid().is_none() {
            return Ok(());
        }

        let fresh = self.fresh_instance(self.instances[index].spec().clone());
        let mut previous = std::mem::replace(&mut self.instances[index], fresh);
        if previous.alive() {
            warn!(
                "{} preloader {:?} still running before relaunch, stopping it",
                previous,
                previous.pid()
            );
            previous.stop()?;
        }
        Ok(())
    }

    /// Tick until every pending instance is running or `limit` ticks elapse.
    /// Returns whether all became ready and how many ticks were spent.
    async fn poll_until_ready(&mut self, pending: &mut Vec<usize>, limit: Option<u64>) -> SupervisorResult<(bool, u64)> {
        let mut ticks = 0;
        while limit.map_or(true, |limit| ticks < limit) {
            self.services.ticker.tick().await;
            ticks += 1;

            let mut still_pending = Vec::with_capacity(pending.len());
            for &index in pending.iter() {
                if !self.instances[index].running().await? {
                    still_pending.push(index);
                }
            }
            *pending = still_pending;

            if pending.is_empty() {
                return Ok((true, ticks));
            }
        }

        Ok((false, ticks))
    }

    fn fresh_instance(&self, spec: InstanceSpec) -> ManagedInstance {
        let instance = ManagedInstance::new(spec, &self.services);
        match &self.gate {
            Some(gate) => instance.with_readiness_gate(gate.clone()),
            None => instance,
        }
    }

    fn notify(&self, message: &str, image: NotificationImage) {
        self.services.notifier.notify(message, NOTIFICATION_TITLE, image);
    }
}

/// Stop every instance, carrying on past failures; returns the first one
fn stop_each<'a>(instances: impl IntoIterator<Item = &'a mut ManagedInstance>) -> SupervisorResult<()> {
    let mut first_error = None;
    for instance in instances {
        if let Err(e) = instance.stop() {
            framework_warn!(instance.framework(), "Failed to stop preloader {:?}: {}", instance.pid(), e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Specs for every active framework; rejects port collisions
fn desired_specs(options: &SupervisorOptions, toggles: &mut Toggles) -> SupervisorResult<Vec<InstanceSpec>> {
    let foreman = if toggles.resolve(Toggle::Foreman) {
        match options.foreman.as_ref().and_then(|f| f.env_file()) {
            Some(env_file) => Foreman::EnvFile(env_file.to_string()),
            None => Foreman::Enabled,
        }
    } else {
        Foreman::Disabled
    };

    let launch = LaunchOptions {
        launcher: options.launcher.clone(),
        bundler: toggles.resolve(Toggle::Bundler),
        foreman,
        quiet: toggles.resolve(Toggle::Quiet),
        windows_shell: cfg!(windows),
    };

    let mut specs: Vec<InstanceSpec> = Vec::new();
    for framework in toggles.active_frameworks() {
        let port = options.port_for(framework);
        if let Some(other) = specs.iter().find(|spec| spec.port == port) {
            return Err(SupervisorError::config(format!(
                "port {} is assigned to both {} and {}",
                port, other.framework, framework
            )));
        }

        specs.push(
            InstanceSpec::new(framework, port)
                .with_env(options.env_for(framework))
                .with_launch(launch.clone()),
        );
    }

    Ok(specs)
}
