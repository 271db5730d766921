// SPDX-License-Identifier: MIT

//! In-memory process inspector for tests.

use super::{Pid, ProcessError, ProcessInfo, ProcessInspector};
use async_trait::async_trait;
use mcsup_core::JarName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ProcessCall {
    FindPids { jar: String },
    Info { pid: Pid },
    Terminate { pid: Pid },
    Kill { pid: Pid },
    KillAllMatching { jar: String },
}

struct FakeProcess {
    jar: String,
    uptime: Duration,
    command_line: String,
    alive: bool,
}

struct State {
    processes: HashMap<Pid, FakeProcess>,
    calls: Vec<ProcessCall>,
}

/// Fake process inspector for testing. Processes are registered with
/// [`FakeProcessInspector::spawn`] and observed through the trait methods.
#[derive(Clone)]
pub struct FakeProcessInspector {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeProcessInspector {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                processes: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeProcessInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.inner.lock().calls.clone()
    }

    /// Register a running process matching `jar`.
    pub fn spawn(&self, pid: Pid, jar: &str, uptime: Duration, command_line: &str) {
        self.inner.lock().processes.insert(
            pid,
            FakeProcess {
                jar: jar.to_string(),
                uptime,
                command_line: command_line.to_string(),
                alive: true,
            },
        );
    }

    pub fn set_uptime(&self, pid: Pid, uptime: Duration) {
        if let Some(p) = self.inner.lock().processes.get_mut(&pid) {
            p.uptime = uptime;
        }
    }

    pub fn is_alive(&self, pid: Pid) -> bool {
        self.inner
            .lock()
            .processes
            .get(&pid)
            .map(|p| p.alive)
            .unwrap_or(false)
    }
}

#[async_trait]
impl ProcessInspector for FakeProcessInspector {
    async fn find_pids(&self, jar: &JarName) -> Result<Vec<Pid>, ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::FindPids {
            jar: jar.as_str().to_string(),
        });
        let mut pids: Vec<Pid> = inner
            .processes
            .iter()
            .filter(|(_, p)| p.alive && p.jar == jar.as_str())
            .map(|(pid, _)| *pid)
            .collect();
        pids.sort();
        Ok(pids)
    }

    async fn info(&self, pid: Pid) -> Result<Option<ProcessInfo>, ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Info { pid });
        Ok(inner.processes.get(&pid).filter(|p| p.alive).map(|p| ProcessInfo {
            pid,
            uptime: p.uptime,
            command_line: p.command_line.clone(),
        }))
    }

    async fn terminate(&self, pid: Pid) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Terminate { pid });
        if let Some(p) = inner.processes.get_mut(&pid) {
            p.alive = false;
        }
        Ok(())
    }

    async fn kill(&self, pid: Pid) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Kill { pid });
        if let Some(p) = inner.processes.get_mut(&pid) {
            p.alive = false;
        }
        Ok(())
    }

    async fn kill_all_matching(&self, jar: &JarName) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::KillAllMatching {
            jar: jar.as_str().to_string(),
        });
        for p in inner.processes.values_mut() {
            if p.jar == jar.as_str() {
                p.alive = false;
            }
        }
        Ok(())
    }
}
