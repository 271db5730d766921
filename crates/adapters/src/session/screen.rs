// SPDX-License-Identifier: MIT

//! `screen`-backed session adapter.

use super::{SessionAdapter, SessionError};
use crate::subprocess::{run_with_timeout, SESSION_COMMAND_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[derive(Clone, Default)]
pub struct ScreenAdapter;

impl ScreenAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionAdapter for ScreenAdapter {
    async fn spawn(&self, name: &str, cwd: &Path, cmd: &str) -> Result<(), SessionError> {
        let mut tmux_cmd = Command::new("screen");
        tmux_cmd.args(["-d", "-m", "-S", name]).current_dir(cwd).arg(cmd);

        let output = run_with_timeout(tmux_cmd, SESSION_COMMAND_TIMEOUT, "screen -d -m")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SessionError::CommandFailed(format!(
                "screen spawn of {name} failed: {stderr}"
            )));
        }
        Ok(())
    }

    async fn send_line(&self, name: &str, text: &str) -> Result<(), SessionError> {
        // \r simulates the return key, causing the stuffed command to run.
        let payload = format!("\r{text}\r");
        let mut cmd = Command::new("screen");
        cmd.args(["-p", "0", "-S", name, "-X", "stuff", &payload]);

        let output = run_with_timeout(cmd, SESSION_COMMAND_TIMEOUT, "screen stuff")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SessionError::CommandFailed(format!(
                "screen stuff into {name} failed: {stderr}"
            )));
        }
        Ok(())
    }

    async fn quit(&self, name: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new("screen");
        cmd.args(["-S", name, "-X", "quit"]);

        // A missing session exits nonzero; that's the expected no-op case,
        // not a failure the caller needs to see.
        let _ = run_with_timeout(cmd, SESSION_COMMAND_TIMEOUT, "screen quit")
            .await
            .map_err(SessionError::CommandFailed)?;
        Ok(())
    }

    async fn authorise(&self, name: &str, user: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new("screen");
        cmd.args(["-S", name, "-X", "acladd", user]);

        let output = run_with_timeout(cmd, SESSION_COMMAND_TIMEOUT, "screen acladd")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SessionError::CommandFailed(format!(
                "screen acladd {user} on {name} failed: {stderr}"
            )));
        }
        Ok(())
    }

    async fn enable_multiuser(&self, name: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new("screen");
        cmd.args(["-S", name, "-X", "multiuser", "on"]);

        let output = run_with_timeout(cmd, SESSION_COMMAND_TIMEOUT, "screen multiuser")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SessionError::CommandFailed(format!(
                "screen multiuser on {name} failed: {stderr}"
            )));
        }
        Ok(())
    }
}
