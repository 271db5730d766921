// SPDX-License-Identifier: MIT

//! Desired/observed state types shared between the supervisor and its callers.

use serde::{Deserialize, Serialize};

/// The operator's intent for a target, independent of what the OS reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesiredState {
    Online,
    Offline,
}

impl DesiredState {
    pub fn is_online(self) -> bool {
        matches!(self, DesiredState::Online)
    }
}

/// Snapshot of a supervisor's reconciled state, returned by `status()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorStatus {
    pub desired: DesiredState,
    pub observed_online: bool,
    pub responsive: Option<bool>,
}
