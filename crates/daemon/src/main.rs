// SPDX-License-Identifier: MIT

//! mcsupd — supervises a set of configured game-server targets: starts and
//! stops them in detached terminal sessions, restarts them on a schedule,
//! watches for unresponsiveness, and transcribes their chat logs.

mod console;

use console::ConsoleTarget;
use mcsup_adapters::{ProcessInspector, ScreenAdapter, ShellProcessInspector, TcpLivenessProber};
use mcsup_core::{DesiredState, SystemClock};
use mcsup_scheduler::Scheduler;
use mcsup_supervisor::Supervisor;
use mcsup_transcript::{spawn_transcriber, TranscriberHandle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "/etc/mcsup/config.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = setup_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let targets = match mcsup_config::load(&config_path) {
        Ok(targets) => targets,
        Err(error) => {
            error!(path = %config_path.display(), %error, "failed to load configuration");
            std::process::exit(1);
        }
    };
    info!(count = targets.len(), path = %config_path.display(), "loaded configuration");

    let scheduler = Scheduler::new(SystemClock);
    let processes = ShellProcessInspector::new();

    let mut supervisors = Vec::with_capacity(targets.len());
    let mut console_targets = Vec::with_capacity(targets.len());
    let mut transcribers: Vec<TranscriberHandle> = Vec::new();

    for target in targets {
        let already_online = !processes
            .find_pids(&target.jar)
            .await
            .unwrap_or_default()
            .is_empty();
        let desired = if target.start_at_launch || already_online {
            DesiredState::Online
        } else {
            DesiredState::Offline
        };

        if target.enable_chatlog {
            transcribers.push(spawn_transcriber(target.path.clone()));
        }

        let nick = target.nick.to_string();
        let supervisor = Supervisor::new(
            target,
            desired,
            processes.clone(),
            ScreenAdapter::new(),
            TcpLivenessProber::new(),
            Arc::clone(&scheduler),
        );
        console_targets.push(ConsoleTarget {
            nick,
            supervisor: Arc::clone(&supervisor),
        });
        supervisors.push(supervisor);
    }

    let shutdown = Arc::new(Notify::new());
    let console_stop = Arc::new(AtomicBool::new(false));
    let console_handle = console::spawn(
        console_targets,
        tokio::runtime::Handle::current(),
        Arc::clone(&console_stop),
        Arc::clone(&shutdown),
    );

    for supervisor in &supervisors {
        supervisor.schedule_first_check();
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigquit = signal(SignalKind::quit())?;

    info!("mcsupd ready");

    tokio::select! {
        _ = scheduler.run() => {}
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = sighup.recv() => info!("received SIGHUP, shutting down"),
        _ = sigquit.recv() => info!("received SIGQUIT, shutting down"),
        _ = shutdown.notified() => info!("shutdown requested via console"),
    }

    console_stop.store(true, Ordering::Relaxed);
    if let Err(error) = console_handle.join() {
        error!(?error, "operator console thread panicked");
    }
    for transcriber in transcribers {
        transcriber.stop().await;
    }

    info!("mcsupd stopped");
    Ok(())
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
