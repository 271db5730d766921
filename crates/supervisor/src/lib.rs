// SPDX-License-Identifier: MIT

//! The per-target supervisor: couples a desired state to the observed
//! process/network state, reconciling the two on a 60 s tick driven by the
//! shared scheduler.

mod restart_schedule;

use mcsup_adapters::{LivenessProber, Pid, ProcessInspector, SessionAdapter};
use mcsup_core::{DesiredState, PreconditionError, SupervisorStatus, TargetConfig};
use mcsup_scheduler::{Handle, Scheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Every scheduled event this crate enters shares the same priority; ties
/// among same-instant events are broken by insertion order, matching the
/// original wrapper's single-priority scheduling.
const EVENT_PRIORITY: i32 = 1;

const TICK_PERIOD: Duration = Duration::from_secs(60);
const SEND_COMMAND_ANTI_FLOOD: Duration = Duration::from_secs(1);
const POST_START_SETTLE: Duration = Duration::from_secs(5);
const STOP_POLL_INTERVAL: Duration = Duration::from_secs(5);
const STOP_POLL_ATTEMPTS: u32 = 12; // 12 x 5s = 60s graceful window
const CULL_TERMINATE_POLL_ATTEMPTS: u32 = 30; // 30 x 1s
const CULL_SETTLE: Duration = Duration::from_secs(5);
const RESPONSIVENESS_RETRY_INTERVAL: Duration = Duration::from_secs(5);
const RESPONSIVENESS_MAX_FOLLOWUPS: u32 = 10;
const RESPONSIVENESS_FAILURE_THRESHOLD: u32 = 3;

/// Mutable state guarded by the supervisor's mutex.
struct Inner {
    desired: DesiredState,
    restart_events: Vec<Handle>,
}

/// Owns one target's desired state, its restart-warning group, and the
/// adapters needed to reconcile observed state with it. All public methods
/// acquire `inner` exactly once and dispatch to a `*_locked` helper, so
/// `restart()` can call `stop()` then `start()` without needing a truly
/// reentrant lock.
pub struct Supervisor<P, S, L, C> {
    config: TargetConfig,
    inner: Mutex<Inner>,
    processes: P,
    session: S,
    liveness: L,
    scheduler: Arc<Scheduler<C>>,
}

impl<P, S, L, C> Supervisor<P, S, L, C>
where
    P: ProcessInspector,
    S: SessionAdapter,
    L: LivenessProber,
    C: mcsup_core::Clock,
{
    /// Build a supervisor. `desired` should be `Online` if
    /// `config.start_at_launch` or the target is already observed online.
    pub fn new(
        config: TargetConfig,
        desired: DesiredState,
        processes: P,
        session: S,
        liveness: L,
        scheduler: Arc<Scheduler<C>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            inner: Mutex::new(Inner {
                desired,
                restart_events: Vec::new(),
            }),
            processes,
            session,
            liveness,
            scheduler,
        })
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Look up a configuration value by key, for the operator console.
    /// Unknown keys return `None`.
    pub fn get_config(&self, key: &str) -> Option<String> {
        Some(match key {
            "nick" => self.config.nick.to_string(),
            "path" => self.config.path.display().to_string(),
            "jar" => self.config.jar.to_string(),
            "host" => self.config.host.clone(),
            "port" => self.config.port.to_string(),
            _ => return None,
        })
    }

    pub async fn status(&self) -> SupervisorStatus {
        let inner = self.inner.lock().await;
        let observed_online = self.observed_online().await.unwrap_or(false);
        let responsive = if observed_online && self.config.enable_responsiveness_check {
            Some(self.liveness.probe(&self.config.host, self.config.port).await)
        } else {
            None
        };
        SupervisorStatus {
            desired: inner.desired,
            observed_online,
            responsive,
        }
    }

    pub async fn start(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        self.start_locked(&mut inner).await;
    }

    pub async fn stop(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        self.stop_locked(&mut inner).await;
    }

    pub async fn restart(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        self.restart_locked(&mut inner).await;
    }

    pub async fn send_command(self: &Arc<Self>, text: &str) {
        let mut inner = self.inner.lock().await;
        self.send_command_locked(&mut inner, text).await;
    }

    /// Schedule this supervisor's very first tick, with no delay. Called
    /// once at startup.
    pub fn schedule_first_check(self: &Arc<Self>) {
        self.rearm_tick_after(Duration::ZERO);
    }

    async fn start_locked(self: &Arc<Self>, inner: &mut Inner) {
        if inner.desired.is_online() {
            tracing::warn!(nick = %self.config.nick, error = %PreconditionError::AlreadyOnline, "ignoring start()");
            return;
        }
        match self.processes.find_pids(&self.config.jar).await {
            Ok(pids) if !pids.is_empty() => {
                tracing::warn!(nick = %self.config.nick, "start() called while a process is already observed, ignoring");
                return;
            }
            Err(error) => {
                tracing::warn!(nick = %self.config.nick, %error, "failed to check for an existing process before start");
            }
            _ => {}
        }

        if let Err(error) = self.session.quit(self.config.nick.as_str()).await {
            tracing::warn!(nick = %self.config.nick, %error, "failed to quit stale session before start");
        }

        let start_cmd = self.config.start_script_path().display().to_string();
        if let Err(error) = self
            .session
            .spawn(self.config.nick.as_str(), &self.config.path, &start_cmd)
            .await
        {
            tracing::error!(nick = %self.config.nick, %error, "failed to spawn session");
            return;
        }

        if self.config.multi_user {
            if let Err(error) = self.session.enable_multiuser(self.config.nick.as_str()).await {
                tracing::warn!(nick = %self.config.nick, %error, "failed to enable multi-user session");
            }
            for account in &self.config.authorised_accounts {
                if let Err(error) = self.session.authorise(self.config.nick.as_str(), account).await {
                    tracing::warn!(nick = %self.config.nick, account, %error, "failed to authorise account");
                }
            }
        }

        inner.desired = DesiredState::Online;
        tokio::time::sleep(POST_START_SETTLE).await;
        self.schedule_restarts_locked(inner).await;
    }

    async fn stop_locked(self: &Arc<Self>, inner: &mut Inner) {
        if !inner.desired.is_online() {
            tracing::warn!(nick = %self.config.nick, error = %PreconditionError::AlreadyOffline, "ignoring stop()");
            return;
        }

        self.cancel_restart_events_locked(inner);
        self.send_command_locked(inner, "stop").await;
        inner.desired = DesiredState::Offline;

        for _ in 0..STOP_POLL_ATTEMPTS {
            tokio::time::sleep(STOP_POLL_INTERVAL).await;
            if !self.observed_online().await.unwrap_or(true) {
                return;
            }
        }

        if let Err(error) = self.processes.kill_all_matching(&self.config.jar).await {
            tracing::error!(nick = %self.config.nick, %error, "failed to force-kill after graceful stop timed out");
        }
    }

    async fn restart_locked(self: &Arc<Self>, inner: &mut Inner) {
        self.send_command_locked(inner, "say Server is restarting, see you soon!").await;
        self.stop_locked(inner).await;
        self.start_locked(inner).await;
    }

    async fn send_command_locked(&self, _inner: &mut Inner, text: &str) {
        // Anti-flood: stuffing the session's input too quickly drops input.
        tokio::time::sleep(SEND_COMMAND_ANTI_FLOOD).await;
        if let Err(error) = self.session.send_line(self.config.nick.as_str(), text).await {
            tracing::warn!(nick = %self.config.nick, %error, "failed to send command to session");
        }
    }

    async fn observed_online(&self) -> Result<bool, mcsup_adapters::ProcessError> {
        Ok(!self.processes.find_pids(&self.config.jar).await?.is_empty())
    }

    /// The 60 s reconciliation tick: cull duplicates, branch on desired
    /// state, then re-arm the next tick regardless of outcome.
    pub async fn tick(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;

        if let Err(error) = self.cull_duplicates().await {
            tracing::warn!(nick = %self.config.nick, %error, "failed to enumerate processes while culling");
        }

        let pids = match self.processes.find_pids(&self.config.jar).await {
            Ok(pids) => pids,
            Err(error) => {
                tracing::warn!(nick = %self.config.nick, %error, "failed to enumerate processes during tick");
                drop(inner);
                self.rearm_tick_after(TICK_PERIOD);
                return;
            }
        };

        match (inner.desired, pids.as_slice()) {
            (DesiredState::Online, []) => self.start_locked(&mut inner).await,
            (DesiredState::Online, [pid]) => self.check_responsiveness_locked(&mut inner, *pid).await,
            (DesiredState::Online, _) => {
                // Culling did not converge to a single instance this tick;
                // leave it for the next one.
            }
            (DesiredState::Offline, []) => {}
            (DesiredState::Offline, _) => self.stop_locked(&mut inner).await,
        }

        drop(inner);
        self.rearm_tick_after(TICK_PERIOD);
    }

    /// While more than one instance of the jar is running, terminate the
    /// most recently started one, escalating to a kill if it ignores the
    /// termination, until at most one remains.
    async fn cull_duplicates(&self) -> Result<(), mcsup_adapters::ProcessError> {
        loop {
            let pids = self.processes.find_pids(&self.config.jar).await?;
            if pids.len() <= 1 {
                return Ok(());
            }

            let mut infos = Vec::with_capacity(pids.len());
            for pid in pids {
                if let Some(info) = self.processes.info(pid).await? {
                    infos.push(info);
                }
            }
            let Some(newest) = infos.into_iter().min_by_key(|info| info.uptime) else {
                return Ok(());
            };

            tracing::warn!(
                nick = %self.config.nick,
                pid = newest.pid.0,
                command_line = %newest.command_line,
                "culling duplicate server instance"
            );
            self.processes.terminate(newest.pid).await?;

            let mut still_running = true;
            for _ in 0..CULL_TERMINATE_POLL_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if !self.processes.is_running(newest.pid).await? {
                    still_running = false;
                    break;
                }
            }
            if still_running {
                self.processes.kill(newest.pid).await?;
            }
            tokio::time::sleep(CULL_SETTLE).await;
        }
    }

    async fn check_responsiveness_locked(self: &Arc<Self>, inner: &mut Inner, pid: Pid) {
        if !self.config.enable_responsiveness_check {
            return;
        }
        let uptime = match self.processes.info(pid).await {
            Ok(Some(info)) => info.uptime,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(nick = %self.config.nick, %error, "failed to read process uptime");
                return;
            }
        };
        if uptime <= self.config.startup_grace {
            return;
        }

        if self.liveness.probe(&self.config.host, self.config.port).await {
            return;
        }

        let mut failures = 0u32;
        for _ in 0..RESPONSIVENESS_MAX_FOLLOWUPS {
            tokio::time::sleep(RESPONSIVENESS_RETRY_INTERVAL).await;
            if !self.liveness.probe(&self.config.host, self.config.port).await {
                failures += 1;
            }
            if failures >= RESPONSIVENESS_FAILURE_THRESHOLD {
                self.restart_locked(inner).await;
                return;
            }
        }
    }

    fn rearm_tick_after(self: &Arc<Self>, delay: Duration) {
        let supervisor = Arc::clone(self);
        self.scheduler.enter(
            delay,
            EVENT_PRIORITY,
            Box::new(move || Box::pin(async move { supervisor.tick().await })),
        );
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
