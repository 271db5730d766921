// SPDX-License-Identifier: MIT

//! mcsup-adapters: the system-facing adapters a supervisor is built from —
//! process discovery, the multiplexer session, liveness probing, and the
//! shared subprocess-execution helper they're all built on.

pub mod liveness;
pub mod process;
pub mod session;
pub mod subprocess;

pub use liveness::{LivenessProber, TcpLivenessProber};
pub use process::{Pid, ProcessError, ProcessInfo, ProcessInspector, ShellProcessInspector};
pub use session::{ScreenAdapter, SessionAdapter, SessionError};

#[cfg(any(test, feature = "test-support"))]
pub use liveness::FakeLivenessProber;
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessInspector, ProcessCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
