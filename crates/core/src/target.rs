// SPDX-License-Identifier: MIT

//! Immutable per-target configuration.

use crate::id::{JarName, Nick};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete, immutable configuration for one supervised target.
///
/// Built once from the configuration loader and never mutated afterwards;
/// every field here corresponds one-to-one with a key of the source
/// configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Unique identifier; used to name the multiplexer session.
    pub nick: Nick,
    /// Working directory the target runs in.
    pub path: PathBuf,
    /// Jar-name pattern used to match this target's process; unique per target.
    pub jar: JarName,
    /// Path to the start script, relative to `path`.
    pub start_script: String,
    pub enable_chatlog: bool,
    pub enable_responsiveness_check: bool,
    pub enable_automated_restarts: bool,
    pub start_at_launch: bool,
    pub multi_user: bool,
    pub authorised_accounts: Vec<String>,
    pub host: String,
    pub port: u16,
    pub startup_grace: Duration,
    pub restart_period: Duration,
}

impl TargetConfig {
    /// Absolute path to the configured start script.
    pub fn start_script_path(&self) -> PathBuf {
        self.path.join(&self.start_script)
    }
}
