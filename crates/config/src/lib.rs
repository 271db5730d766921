// SPDX-License-Identifier: MIT

//! Loads the immutable list of per-target configurations from a TOML file.
//!
//! ```toml
//! [[target]]
//! nick = "test"
//! path = "/home/minecraft/test"
//! jar = "test-server.jar"
//! start_script = "ServerStart.sh"
//! enable_chatlog = true
//! enable_responsiveness_check = true
//! enable_automated_restarts = true
//! start_at_launch = true
//! multi_user = true
//! authorised_accounts = ["anedaar", "jeronimokant"]
//! host = "localhost"
//! port = 25595
//! startup_grace_seconds = 30
//! restart_period_seconds = 120
//! ```

use mcsup_core::TargetConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Every config-loading failure is fatal at startup: a bad config never
/// produces a partially-usable supervisor set.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("duplicate nick {0:?} across target list")]
    DuplicateNick(String),
    #[error("duplicate jar {0:?} across target list")]
    DuplicateJar(String),
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(rename = "target", default)]
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    nick: String,
    path: PathBuf,
    jar: String,
    start_script: String,
    enable_chatlog: bool,
    enable_responsiveness_check: bool,
    enable_automated_restarts: bool,
    start_at_launch: bool,
    #[serde(default)]
    multi_user: bool,
    #[serde(default)]
    authorised_accounts: Vec<String>,
    host: String,
    port: u16,
    startup_grace_seconds: u64,
    restart_period_seconds: u64,
}

impl From<RawTarget> for TargetConfig {
    fn from(raw: RawTarget) -> Self {
        TargetConfig {
            nick: raw.nick.into(),
            path: raw.path,
            jar: raw.jar.into(),
            start_script: raw.start_script,
            enable_chatlog: raw.enable_chatlog,
            enable_responsiveness_check: raw.enable_responsiveness_check,
            enable_automated_restarts: raw.enable_automated_restarts,
            start_at_launch: raw.start_at_launch,
            multi_user: raw.multi_user,
            authorised_accounts: raw.authorised_accounts,
            host: raw.host,
            port: raw.port,
            startup_grace: Duration::from_secs(raw.startup_grace_seconds),
            restart_period: Duration::from_secs(raw.restart_period_seconds),
        }
    }
}

/// Load and validate the target list from `path`. `nick` and `jar` must be
/// unique across the whole file.
pub fn load(path: &Path) -> Result<Vec<TargetConfig>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

fn parse(text: &str, path: &Path) -> Result<Vec<TargetConfig>, ConfigError> {
    let raw: RawFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen_nicks = HashSet::new();
    let mut seen_jars = HashSet::new();
    for target in &raw.targets {
        if !seen_nicks.insert(target.nick.clone()) {
            return Err(ConfigError::DuplicateNick(target.nick.clone()));
        }
        if !seen_jars.insert(target.jar.clone()) {
            return Err(ConfigError::DuplicateJar(target.jar.clone()));
        }
    }

    Ok(raw.targets.into_iter().map(TargetConfig::from).collect())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
