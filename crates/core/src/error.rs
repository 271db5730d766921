// SPDX-License-Identifier: MIT

//! Error classification shared across the supervisor crates.
//!
//! Kinds follow the policy described for the wrapper: `Precondition`
//! violations are logged and are a no-op, never propagated as a failure
//! to the scheduler; everything else that can recur is left for the next
//! tick to resolve.

use thiserror::Error;

/// A precondition for a supervisor operation was not met.
///
/// These are never fatal: the caller logs a warning and treats the call
/// as a no-op, per the wrapper's error-handling policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("start() called while already online")]
    AlreadyOnline,
    #[error("stop() called while already offline")]
    AlreadyOffline,
}
