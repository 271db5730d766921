// SPDX-License-Identifier: MIT

//! Process inspector: finds PIDs matching a jar-name pattern, reports a
//! PID's uptime and command line, and sends it signals.

mod shell;

pub use shell::ShellProcessInspector;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessInspector, ProcessCall};

use async_trait::async_trait;
use mcsup_core::JarName;
use std::time::Duration;
use thiserror::Error;

/// Operating-system process identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

/// A snapshot of a running process relevant to supervision decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Pid,
    /// Time elapsed since the process started.
    pub uptime: Duration,
    /// Full command line, used only for logging which instance was culled.
    pub command_line: String,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process lookup failed: {0}")]
    Lookup(String),
    #[error("signal delivery failed: {0}")]
    Signal(String),
}

/// Adapter over process discovery and signalling.
#[async_trait]
pub trait ProcessInspector: Clone + Send + Sync + 'static {
    /// PIDs of every process whose command line matches `jar`. Empty when
    /// none are running; this is not an error.
    async fn find_pids(&self, jar: &JarName) -> Result<Vec<Pid>, ProcessError>;

    /// Uptime and command line for a PID, or `None` if it has already exited.
    async fn info(&self, pid: Pid) -> Result<Option<ProcessInfo>, ProcessError>;

    /// True if the PID still has a live process.
    async fn is_running(&self, pid: Pid) -> Result<bool, ProcessError> {
        Ok(self.info(pid).await?.is_some())
    }

    /// Send SIGTERM to a single PID, requesting graceful exit.
    async fn terminate(&self, pid: Pid) -> Result<(), ProcessError>;

    /// Send SIGKILL to a single PID.
    async fn kill(&self, pid: Pid) -> Result<(), ProcessError>;

    /// Send SIGKILL to every process matching `jar`.
    async fn kill_all_matching(&self, jar: &JarName) -> Result<(), ProcessError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
