//! Test doubles and builder patterns for supervisor tests
//!
//! The fakes here keep state that assertions inspect afterwards (spawned
//! commands, terminated pids, tick counts, notifications). Interactions that
//! must never happen are expressed with the mockall mocks instead.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::NotificationImage;
use supervisor::traits::MockFileSystem;
use supervisor::{
    Notifier, PreloaderPlugin, ProcessEntry, ProcessHandle, ProcessLauncher, ProcessSignaller, ProcessTable,
    ProcessTerminationStrategy, ReadinessProbe, Services, Supervisor, SupervisorError, SupervisorOptions,
    SupervisorResult, Ticker,
};

use super::fixtures::TestFixtures;

/// Process handle whose liveness is controlled by the test
#[derive(Debug)]
pub struct StubProcess {
    pid: u32,
    alive: Arc<AtomicBool>,
}

impl ProcessHandle for StubProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub pid: u32,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub alive: Arc<AtomicBool>,
}

/// Launcher handing out sequential pids and remembering every spawn
#[derive(Debug)]
pub struct FakeLauncher {
    next_pid: AtomicU32,
    fail: bool,
    spawned: Mutex<Vec<SpawnRecord>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(TestFixtures::FIRST_PID),
            fail: false,
            spawned: Mutex::new(Vec::new()),
        }
    }

    /// Every spawn fails as if the launcher binary were missing
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn spawned(&self) -> Vec<SpawnRecord> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn record(&self, pid: u32) -> Option<SpawnRecord> {
        self.spawned().into_iter().find(|r| r.pid == pid)
    }

    pub fn set_alive(&self, pid: u32, alive: bool) {
        if let Some(record) = self.record(pid) {
            record.alive.store(alive, Ordering::SeqCst);
        }
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&self, command: &[String], env: &BTreeMap<String, String>) -> std::io::Result<Box<dyn ProcessHandle>> {
        if self.fail {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "spork: command not found"));
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let alive = Arc::new(AtomicBool::new(true));
        self.spawned.lock().unwrap().push(SpawnRecord {
            pid,
            command: command.to_vec(),
            env: env.clone(),
            alive: alive.clone(),
        });

        Ok(Box::new(StubProcess { pid, alive }))
    }
}

/// Termination that marks the fake process dead and records the pid.
/// Pids registered with `fail_for` are refused and stay alive.
pub struct FakeTermination {
    launcher: Arc<FakeLauncher>,
    failing: Mutex<HashSet<u32>>,
    attempted: Mutex<Vec<u32>>,
    terminated: Mutex<Vec<u32>>,
}

impl FakeTermination {
    pub fn new(launcher: Arc<FakeLauncher>) -> Self {
        Self {
            launcher,
            failing: Mutex::new(HashSet::new()),
            attempted: Mutex::new(Vec::new()),
            terminated: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_for(&self, pid: u32) {
        self.failing.lock().unwrap().insert(pid);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Every pid termination was requested for, successful or not
    pub fn attempted(&self) -> Vec<u32> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }
}

impl ProcessTerminationStrategy for FakeTermination {
    fn terminate(&self, pid: u32) -> SupervisorResult<()> {
        self.attempted.lock().unwrap().push(pid);
        if self.failing.lock().unwrap().contains(&pid) {
            return Err(SupervisorError::termination(pid, "EPERM"));
        }

        self.launcher.set_alive(pid, false);
        self.terminated.lock().unwrap().push(pid);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Probe that refuses until a port has been probed enough times
pub struct ScriptedProbe {
    /// Call on which each port turns ready; `None` never does
    default_ready_on: Option<usize>,
    per_port: HashMap<u16, usize>,
    /// Fail every check with an error other than a refused connection
    erroring: bool,
    calls: Mutex<HashMap<u16, usize>>,
}

impl ScriptedProbe {
    pub fn always() -> Self {
        Self::ready_on(1)
    }

    pub fn never() -> Self {
        Self {
            default_ready_on: None,
            per_port: HashMap::new(),
            erroring: false,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Ready from the `call`-th probe of each port onwards
    pub fn ready_on(call: usize) -> Self {
        Self {
            default_ready_on: Some(call),
            ..Self::never()
        }
    }

    /// Every check fails as if the socket could not be created
    pub fn erroring() -> Self {
        Self {
            erroring: true,
            ..Self::never()
        }
    }

    /// Override the ready call for one port
    pub fn with_port(mut self, port: u16, call: usize) -> Self {
        self.per_port.insert(port, call);
        self
    }

    pub fn calls(&self, port: u16) -> usize {
        self.calls.lock().unwrap().get(&port).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ReadinessProbe for ScriptedProbe {
    async fn probe(&self, _host: &str, port: u16) -> SupervisorResult<bool> {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(port).or_insert(0);
        *count += 1;
        if self.erroring {
            return Err(SupervisorError::ProbeFailed {
                port,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "socket: permission denied"),
            });
        }

        let ready_on = self.per_port.get(&port).copied().or(self.default_ready_on);
        Ok(ready_on.map_or(false, |n| *count >= n))
    }
}

/// Ticker that returns immediately and counts ticks
#[derive(Default)]
pub struct CountingTicker {
    ticks: AtomicUsize,
}

impl CountingTicker {
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ticker for CountingTicker {
    async fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub title: String,
    pub image: NotificationImage,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn images(&self) -> Vec<NotificationImage> {
        self.sent().into_iter().map(|n| n.image).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, title: &str, image: NotificationImage) {
        self.sent.lock().unwrap().push(Notification {
            message: message.to_string(),
            title: title.to_string(),
            image,
        });
    }
}

/// Fixed process table
pub struct StaticProcessTable {
    entries: Vec<ProcessEntry>,
}

impl StaticProcessTable {
    pub fn new(entries: Vec<ProcessEntry>) -> Self {
        Self { entries }
    }
}

impl ProcessTable for StaticProcessTable {
    fn snapshot(&self) -> SupervisorResult<Vec<ProcessEntry>> {
        Ok(self.entries.clone())
    }
}

/// Signaller recording every forced kill, optionally failing all of them
#[derive(Default)]
pub struct RecordingSignaller {
    fail: bool,
    killed: Mutex<Vec<u32>>,
}

impl RecordingSignaller {
    pub fn failing() -> Self {
        Self {
            fail: true,
            killed: Mutex::new(Vec::new()),
        }
    }

    pub fn killed(&self) -> Vec<u32> {
        self.killed.lock().unwrap().clone()
    }
}

impl ProcessSignaller for RecordingSignaller {
    fn force_kill(&self, pid: u32) -> SupervisorResult<()> {
        self.killed.lock().unwrap().push(pid);
        if self.fail {
            return Err(SupervisorError::termination(pid, "operation not permitted"));
        }
        Ok(())
    }
}

/// File system answering `exists` from a fixed list of project paths
pub fn project_file_system(paths: &[&str]) -> MockFileSystem {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    let mut file_system = MockFileSystem::new();
    file_system
        .expect_exists()
        .returning(move |path| paths.iter().any(|p| p == path));
    file_system
}

/// Handles to every fake behind a `Services` bundle
pub struct Harness {
    pub launcher: Arc<FakeLauncher>,
    pub termination: Arc<FakeTermination>,
    pub probe: Arc<ScriptedProbe>,
    pub ticker: Arc<CountingTicker>,
    pub notifier: Arc<RecordingNotifier>,
    pub signaller: Arc<RecordingSignaller>,
    pub services: Services,
}

/// Builder pattern for creating test harnesses with sensible defaults
pub struct HarnessBuilder {
    project: Vec<String>,
    launcher: FakeLauncher,
    probe: ScriptedProbe,
    signaller: RecordingSignaller,
    process_table: Option<Arc<dyn ProcessTable>>,
    process_signaller: Option<Arc<dyn ProcessSignaller>>,
}

impl HarnessBuilder {
    /// RSpec-only project whose helpers are ready on the first probe
    pub fn new() -> Self {
        Self {
            project: TestFixtures::RSPEC_PROJECT.iter().map(|p| p.to_string()).collect(),
            launcher: FakeLauncher::new(),
            probe: ScriptedProbe::always(),
            signaller: RecordingSignaller::default(),
            process_table: None,
            process_signaller: None,
        }
    }

    pub fn with_project(mut self, paths: &[&str]) -> Self {
        self.project = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_probe(mut self, probe: ScriptedProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_launcher(mut self, launcher: FakeLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_signaller(mut self, signaller: RecordingSignaller) -> Self {
        self.signaller = signaller;
        self
    }

    /// Replace the (empty) static process table
    pub fn with_process_table(mut self, table: Arc<dyn ProcessTable>) -> Self {
        self.process_table = Some(table);
        self
    }

    /// Replace the recording signaller with an arbitrary one (e.g. a mock)
    pub fn with_process_signaller(mut self, signaller: Arc<dyn ProcessSignaller>) -> Self {
        self.process_signaller = Some(signaller);
        self
    }

    pub fn build(self) -> Harness {
        let project: Vec<&str> = self.project.iter().map(|p| p.as_str()).collect();
        let launcher = Arc::new(self.launcher);
        let termination = Arc::new(FakeTermination::new(launcher.clone()));
        let probe = Arc::new(self.probe);
        let ticker = Arc::new(CountingTicker::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let signaller = Arc::new(self.signaller);

        let services = Services {
            file_system: Arc::new(project_file_system(&project)),
            launcher: launcher.clone(),
            termination: termination.clone(),
            probe: probe.clone(),
            process_table: self
                .process_table
                .unwrap_or_else(|| Arc::new(StaticProcessTable::new(Vec::new())) as Arc<dyn ProcessTable>),
            signaller: self
                .process_signaller
                .unwrap_or_else(|| signaller.clone() as Arc<dyn ProcessSignaller>),
            notifier: notifier.clone(),
            ticker: ticker.clone(),
        };

        Harness {
            launcher,
            termination,
            probe,
            ticker,
            notifier,
            signaller,
            services,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    pub fn supervisor(harness: &Harness, options: SupervisorOptions) -> Supervisor {
        Supervisor::new(options, harness.services.clone()).unwrap()
    }

    pub fn plugin(harness: &Harness, options: SupervisorOptions) -> PreloaderPlugin {
        PreloaderPlugin::new(options, harness.services.clone()).unwrap()
    }

    pub fn frameworks(supervisor: &Supervisor) -> Vec<shared::FrameworkType> {
        supervisor.active_frameworks()
    }

    pub fn pid_of(supervisor: &Supervisor, framework: shared::FrameworkType) -> Option<u32> {
        supervisor
            .instances()
            .iter()
            .find(|i| i.framework() == framework)
            .and_then(|i| i.pid())
    }

    pub fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }
}
