//! snapcheckd - The snapcheck monitoring agent daemon
//!
//! This is the main entry point for the agent. It wires together:
//! - Configuration loading
//! - The session store and HTTP client
//! - The Linux host adapter
//! - The monitoring engine
//!
//! Signals: SIGTERM/SIGINT/SIGHUP stop monitoring and exit; SIGUSR1 is the
//! foreground-resume trigger and re-runs the permission checklist.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use snapcheck_api::{LoginRequest, Session};
use snapcheck_client::{HttpSyncClient, SyncApi};
use snapcheck_config::{load_config, AgentConfig};
use snapcheck_core::{Engine, EngineEvent};
use snapcheck_host_linux::{
    CommandLockControl, LinuxPermissionProbe, LinuxTelemetry, PidfilePresence,
};
use snapcheck_store::{FileSessionStore, SessionStore};
use snapcheck_util::UserId;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// snapcheckd - Device monitoring and remote-lock agent
#[derive(Parser, Debug)]
#[command(name = "snapcheckd")]
#[command(about = "Device monitoring and remote-lock agent", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "SNAPCHECK_CONFIG", default_value = "/etc/snapcheck/agent.toml")]
    config: PathBuf,

    /// Data directory for the session store and pidfile
    #[arg(short, long, env = "SNAPCHECK_DATA_DIR", default_value = "/var/lib/snapcheck")]
    data_dir: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitoring daemon (default)
    Run,

    /// Authenticate against the backend and persist the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

fn load_or_default_config(args: &Args) -> Result<AgentConfig> {
    if args.config.exists() {
        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;
        info!(config_path = %args.config.display(), "Configuration loaded");
        Ok(config)
    } else {
        info!(config_path = %args.config.display(), "No config file, using defaults");
        Ok(AgentConfig::default())
    }
}

async fn login(args: &Args, email: String, password: String) -> Result<()> {
    let config = load_or_default_config(args)?;

    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", args.data_dir))?;
    let store = Arc::new(FileSessionStore::in_dir(&args.data_dir));

    let client = HttpSyncClient::new(
        config.backend.base_url.clone(),
        config.backend.request_timeout(),
        store.clone(),
    );

    let response = client
        .login(&LoginRequest { email, password })
        .await
        .context("Login request failed")?;

    if !response.success {
        bail!(
            "Login failed: {}",
            response.message.unwrap_or_else(|| "Invalid credentials".into())
        );
    }

    let (Some(token), Some(user)) = (response.token, response.user) else {
        bail!("Login response carried no token or user");
    };

    let session = Session {
        user_id: UserId::new(user.id),
        token,
    };
    store
        .save_session(&session)
        .context("Failed to persist session")?;

    info!(user_id = %session.user_id, "Logged in, session stored");
    Ok(())
}

async fn run(args: &Args) -> Result<()> {
    let config = load_or_default_config(args)?;

    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", args.data_dir))?;
    let store = Arc::new(FileSessionStore::in_dir(&args.data_dir));

    let Some(session) = store.load_session().context("Failed to read session store")? else {
        bail!("No stored session. Run `snapcheckd login` first.");
    };
    info!(user_id = %session.user_id, "Session loaded");

    let client = Arc::new(HttpSyncClient::new(
        config.backend.base_url.clone(),
        config.backend.request_timeout(),
        store.clone(),
    ));
    let telemetry = Arc::new(LinuxTelemetry::new());
    let lock_control = Arc::new(CommandLockControl::new(
        config.host.lock_command.clone(),
        config.host.unlock_command.clone(),
    ));
    let presence = Arc::new(PidfilePresence::new(args.data_dir.join("snapcheckd.pid")));
    let permissions = Arc::new(LinuxPermissionProbe::new());

    let (engine, mut events) = Engine::new(
        session,
        config.monitor.clone(),
        client,
        telemetry,
        lock_control,
        presence,
        permissions,
    );

    let _ = engine.check_permissions().await;
    engine.start().await.context("Failed to start monitoring")?;

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;
    let mut sigusr1 =
        signal(SignalKind::user_defined1()).context("Failed to create SIGUSR1 handler")?;

    info!("Agent running");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
                break;
            }
            _ = sigusr1.recv() => {
                info!("Received SIGUSR1, re-running permission checks");
                let _ = engine.notify_foreground_resume().await;
            }
            Some(event) = events.recv() => {
                if let EngineEvent::PermissionPromptRequired(kind) = &event {
                    engine.open_permission_settings(*kind).await;
                }
                log_event(event);
            }
        }
    }

    let _ = engine.stop().await;
    info!("Shutdown complete");
    Ok(())
}

fn log_event(event: EngineEvent) {
    match event {
        EngineEvent::MonitoringStarted { session_id } => {
            info!(session_id = %session_id, "Monitoring active");
        }
        EngineEvent::MonitoringStopped { session_id } => {
            info!(session_id = %session_id, "Monitoring stopped");
        }
        EngineEvent::LockEngaged => {
            warn!("Device lock engaged by guardian");
        }
        EngineEvent::LockReleased => {
            info!("Device lock released");
        }
        EngineEvent::PermissionPromptRequired(kind) => {
            warn!(kind = ?kind, "Device permission missing, user action required");
        }
        EngineEvent::PlanRefreshed(plan) => {
            info!(plan = %plan.plan, days_left = plan.days_left, "Plan refreshed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();
    let command = args.command.take();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "snapcheckd starting");

    match command {
        Some(Command::Login { email, password }) => login(&args, email, password).await,
        Some(Command::Run) | None => run(&args).await,
    }
}
