// SPDX-License-Identifier: MIT

//! Session adapter: starts a named detachable `screen` session running a
//! script, injects keystrokes, tears it down, and grants multi-user ACL.

mod screen;

pub use screen::ScreenAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session command failed: {0}")]
    CommandFailed(String),
}

/// Adapter over the terminal-multiplexer session a target's process runs in.
#[async_trait]
pub trait SessionAdapter: Clone + Send + Sync + 'static {
    /// Create a detached session named `name`, running `cmd` in `cwd`. The
    /// caller is responsible for quitting any stale session of the same
    /// name first.
    async fn spawn(&self, name: &str, cwd: &Path, cmd: &str) -> Result<(), SessionError>;

    /// Inject `text` followed by a carriage return, as the `stuff` command
    /// would: `\r<text>\r`.
    async fn send_line(&self, name: &str, text: &str) -> Result<(), SessionError>;

    /// Terminate the session outright. A no-op if it does not exist.
    async fn quit(&self, name: &str) -> Result<(), SessionError>;

    /// Enable multi-user mode and grant ACL to `user`.
    async fn authorise(&self, name: &str, user: &str) -> Result<(), SessionError>;

    /// Enable multi-user mode without granting any account yet.
    async fn enable_multiuser(&self, name: &str) -> Result<(), SessionError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
