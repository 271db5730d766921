// SPDX-License-Identifier: MIT

//! Shell-capability adapter: runs opaque shell invocations and returns their
//! captured exit status, stdout, and stderr.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// `pgrep`/`pkill` against a jar pattern are expected to return promptly.
pub const PROCESS_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// `screen` session-management invocations (spawn, stuff, quit, acl).
pub const SESSION_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a subprocess command with a timeout, converting timeout expiration
/// into a descriptive error. The child is killed automatically if the
/// timeout elapses (via the tokio `Child` drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
