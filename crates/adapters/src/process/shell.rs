// SPDX-License-Identifier: MIT

//! `pgrep`/`ps`/`kill`/`pkill`-backed process inspector.

use super::{Pid, ProcessError, ProcessInfo, ProcessInspector};
use crate::subprocess::{run_with_timeout, PROCESS_LOOKUP_TIMEOUT};
use async_trait::async_trait;
use mcsup_core::JarName;
use std::time::Duration;
use tokio::process::Command;

#[derive(Clone, Default)]
pub struct ShellProcessInspector;

impl ShellProcessInspector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessInspector for ShellProcessInspector {
    async fn find_pids(&self, jar: &JarName) -> Result<Vec<Pid>, ProcessError> {
        let mut cmd = Command::new("pgrep");
        cmd.args(["-f", jar.as_str()]);
        let output = run_with_timeout(cmd, PROCESS_LOOKUP_TIMEOUT, "pgrep")
            .await
            .map_err(ProcessError::Lookup)?;

        // pgrep exits 1 with empty stdout when nothing matches; that's not
        // an error, just an empty result. Any other nonzero exit is.
        if !output.status.success() {
            return match output.status.code() {
                Some(1) => Ok(Vec::new()),
                _ => Err(ProcessError::Lookup(format!(
                    "pgrep exited with {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                ))),
            };
        }

        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u32>()
                    .map(Pid)
                    .map_err(|e| ProcessError::Lookup(format!("unparsable pid {tok:?}: {e}")))
            })
            .collect()
    }

    async fn info(&self, pid: Pid) -> Result<Option<ProcessInfo>, ProcessError> {
        let mut cmd = Command::new("ps");
        cmd.args(["-o", "etimes=,args=", "-p", &pid.0.to_string()]);
        let output = run_with_timeout(cmd, PROCESS_LOOKUP_TIMEOUT, "ps")
            .await
            .map_err(ProcessError::Lookup)?;

        if !output.status.success() {
            // ps returns nonzero when the PID no longer exists.
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = match stdout.lines().next() {
            Some(line) if !line.trim().is_empty() => line.trim_start(),
            _ => return Ok(None),
        };

        let (etimes_str, command_line) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        let etimes: u64 = etimes_str
            .parse()
            .map_err(|e| ProcessError::Lookup(format!("unparsable etimes {etimes_str:?}: {e}")))?;

        Ok(Some(ProcessInfo {
            pid,
            uptime: Duration::from_secs(etimes),
            command_line: command_line.trim().to_string(),
        }))
    }

    async fn terminate(&self, pid: Pid) -> Result<(), ProcessError> {
        send_signal(pid, "TERM").await
    }

    async fn kill(&self, pid: Pid) -> Result<(), ProcessError> {
        send_signal(pid, "KILL").await
    }

    async fn kill_all_matching(&self, jar: &JarName) -> Result<(), ProcessError> {
        let mut cmd = Command::new("pkill");
        cmd.args(["-SIGKILL", "-f", jar.as_str()]);
        let output = run_with_timeout(cmd, PROCESS_LOOKUP_TIMEOUT, "pkill")
            .await
            .map_err(ProcessError::Signal)?;

        // pkill exits 1 when nothing matched, which is fine: the target is
        // already gone.
        match output.status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(ProcessError::Signal(format!(
                "pkill exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ))),
        }
    }
}

async fn send_signal(pid: Pid, signal: &str) -> Result<(), ProcessError> {
    let mut cmd = Command::new("kill");
    cmd.args(["-s", signal, &pid.0.to_string()]);
    let output = run_with_timeout(cmd, PROCESS_LOOKUP_TIMEOUT, "kill")
        .await
        .map_err(ProcessError::Signal)?;

    match output.status.code() {
        Some(0) => Ok(()),
        // The process already exited between lookup and signal; not fatal.
        Some(1) => Ok(()),
        _ => Err(ProcessError::Signal(format!(
            "kill -{signal} exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        ))),
    }
}
