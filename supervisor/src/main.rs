//! Main entry point for the preloader binary
//!
//! Wires the real service implementations into a `PreloaderPlugin` and drives
//! its lifecycle from OS signals.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use shared::logging;
use supervisor::{PreloaderPlugin, Services, Supervisor, SupervisorOptions};

const COMPONENT: &str = "preloader";

/// Config file looked up in the project root when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "preloader.json";

/// Supervises test-framework preloader processes for a project
#[derive(Parser)]
#[command(name = "preloader")]
#[command(about = "Launches and supervises test-framework preloader servers")]
pub struct Args {
    /// Project root used for framework detection and as working directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// JSON options file (defaults to preloader.json in the project root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait for every preloader to accept connections
    #[arg(long, conflicts_with = "no_timeout")]
    pub wait: Option<u64>,

    /// Wait for preloaders without a primary timeout
    #[arg(long)]
    pub no_timeout: bool,

    /// Extra seconds to wait after the primary wait runs out
    #[arg(long)]
    pub retry_delay: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start every active preloader and supervise it until Ctrl+C
    Run,
    /// Kill stray preloader processes left over from earlier runs
    KillOrphans,
    /// Print the command line of every active preloader
    Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level))?;

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("Project root {} not found", args.root.display()))?;
    std::env::set_current_dir(&root).with_context(|| format!("Cannot enter {}", root.display()))?;

    // Helpers inherit the project's .env variables
    if let Err(e) = dotenv::from_path(root.join(".env")) {
        tracing::debug!("No .env loaded: {}", e);
    }

    let options = load_options(&args, &root)?;
    let services = Services::system(&root);

    match args.command {
        Command::Run => run(options, services).await,
        Command::KillOrphans => {
            let mut supervisor = Supervisor::new(options, services)?;
            let pids = supervisor.kill_global()?;
            logging::log_success(COMPONENT, &format!("Killed {} stray preloader process(es)", pids.len()));
            Ok(())
        }
        Command::Commands => {
            let supervisor = Supervisor::new(options, services)?;
            for instance in supervisor.instances() {
                println!("{}: {}", instance.framework(), instance.command().join(" "));
            }
            Ok(())
        }
    }
}

fn load_options(args: &Args, root: &Path) -> anyhow::Result<SupervisorOptions> {
    let mut options = match &args.config {
        Some(path) => SupervisorOptions::from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => {
            let default_path = root.join(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                SupervisorOptions::from_file(&default_path)
                    .with_context(|| format!("Failed to load options from {}", default_path.display()))?
            } else {
                SupervisorOptions::default()
            }
        }
    };

    if args.no_timeout {
        options = options.with_wait(None);
    } else if let Some(wait) = args.wait {
        options = options.with_wait(Some(wait));
    }
    if let Some(retry_delay) = args.retry_delay {
        options = options.with_retry_delay(retry_delay);
    }

    Ok(options)
}

async fn run(options: SupervisorOptions, services: Services) -> anyhow::Result<()> {
    let mut plugin = PreloaderPlugin::new(options, services)?;
    logging::log_startup(
        COMPONENT,
        &format!("supervising {:?}", plugin.supervisor().active_frameworks()),
    );

    if let Err(e) = plugin.on_start().await {
        logging::log_error(COMPONENT, "Start", &e);
        plugin.on_stop()?;
        return Err(e.into());
    }

    wait_for_signals(&mut plugin).await?;

    let stopped = plugin.on_stop()?;
    logging::log_success(COMPONENT, &format!("Stopped {} preloader(s)", stopped.len()));
    Ok(())
}

/// Reload on SIGHUP until Ctrl+C
#[cfg(unix)]
async fn wait_for_signals(plugin: &mut PreloaderPlugin) -> anyhow::Result<()> {
    use supervisor::Selection;
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Cannot install SIGHUP handler")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Signal handling")?;
                logging::log_shutdown(COMPONENT, "Received Ctrl+C signal");
                return Ok(());
            }
            _ = hangup.recv() => {
                tracing::info!("Received SIGHUP, reloading preloaders");
                if let Err(e) = plugin.on_reload().await {
                    // A failed reload leaves the helpers as they are until the next signal
                    logging::log_error(COMPONENT, "Reload", &e);
                    if !e.is_task_failure() {
                        plugin.supervisor_mut().stop(&Selection::All)?;
                        return Err(e.into());
                    }
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signals(_plugin: &mut PreloaderPlugin) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await.context("Signal handling")?;
    logging::log_shutdown(COMPONENT, "Received Ctrl+C signal");
    Ok(())
}
