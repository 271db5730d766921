// SPDX-License-Identifier: MIT

//! Automated restart scheduling: warn an online server ahead of a restart at
//! 10, 5, and 1 minutes out, then restart it.

use crate::{Inner, Supervisor};
use mcsup_adapters::{LivenessProber, ProcessInspector, SessionAdapter};
use std::sync::Arc;
use std::time::Duration;

const TEN_MINUTES: Duration = Duration::from_secs(600);
const FIVE_MINUTES: Duration = Duration::from_secs(300);
const ONE_MINUTE: Duration = Duration::from_secs(60);

impl<P, S, L, C> Supervisor<P, S, L, C>
where
    P: ProcessInspector,
    S: SessionAdapter,
    L: LivenessProber,
    C: mcsup_core::Clock,
{
    /// (Re-)compute and schedule this target's warning/restart events from
    /// the process's current uptime. Any previously scheduled events for
    /// this target are cancelled first.
    pub(crate) async fn schedule_restarts_locked(self: &Arc<Self>, inner: &mut Inner) {
        self.cancel_restart_events_locked(inner);
        if !self.config.enable_automated_restarts {
            return;
        }

        let uptime = match self.processes.find_pids(&self.config.jar).await {
            Ok(pids) => {
                let mut uptime = None;
                for pid in pids {
                    if let Ok(Some(info)) = self.processes.info(pid).await {
                        uptime = Some(info.uptime);
                        break;
                    }
                }
                uptime
            }
            Err(_) => None,
        };
        // The surviving PID's start-time is unavailable: leave the restart
        // group empty and let the next start() attempt retry, rather than
        // scheduling a warning sequence against a process that may not
        // exist.
        let Some(uptime) = uptime else {
            return;
        };

        for (delay, minutes) in restart_offsets(uptime, self.config.restart_period) {
            let supervisor = Arc::clone(self);
            let handle = match minutes {
                Some(minutes) => self.scheduler.enter(
                    delay,
                    crate::EVENT_PRIORITY,
                    Box::new(move || Box::pin(async move { supervisor.fire_restart_warning(minutes).await })),
                ),
                None => self.scheduler.enter(
                    delay,
                    crate::EVENT_PRIORITY,
                    Box::new(move || Box::pin(async move { supervisor.fire_restart().await })),
                ),
            };
            inner.restart_events.push(handle);
        }
    }

    pub(crate) fn cancel_restart_events_locked(&self, inner: &mut Inner) {
        for handle in inner.restart_events.drain(..) {
            let _ = self.scheduler.cancel(handle);
        }
    }

    async fn fire_restart_warning(self: Arc<Self>, minutes: u64) {
        let mut inner = self.inner.lock().await;
        if !inner.desired.is_online() {
            return;
        }
        self.send_command_locked(&mut inner, &restart_warning_text(minutes)).await;
    }

    async fn fire_restart(self: Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if !inner.desired.is_online() {
            return;
        }
        self.restart_locked(&mut inner).await;
    }
}

/// The four scheduled offsets for a target's restart-warning group, given
/// its current uptime and restart period: three warnings (at 10, 5, and 1
/// minutes out) followed by the restart itself (`None`).
///
/// Past the point where a full warning sequence still fits before the
/// scheduled restart, the restart is treated as overdue and the whole
/// sequence is compressed into the next ten minutes. Written as
/// `uptime + 10min >= period` rather than `uptime >= period - 10min` to
/// avoid an underflowing `Duration` subtraction when the configured period
/// is itself under ten minutes.
fn restart_offsets(uptime: Duration, restart_period: Duration) -> [(Duration, Option<u64>); 4] {
    if uptime + TEN_MINUTES >= restart_period {
        [
            (Duration::ZERO, Some(10)),
            (FIVE_MINUTES, Some(5)),
            (Duration::from_secs(540), Some(1)),
            (TEN_MINUTES, None),
        ]
    } else {
        let remaining = restart_period - uptime;
        [
            (remaining - TEN_MINUTES, Some(10)),
            (remaining - FIVE_MINUTES, Some(5)),
            (remaining - ONE_MINUTE, Some(1)),
            (remaining, None),
        ]
    }
}

fn restart_warning_text(minutes: u64) -> String {
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("say An automated restart will occur in {minutes} {unit}.")
}

#[cfg(test)]
#[path = "restart_schedule_tests.rs"]
mod tests;
