// SPDX-License-Identifier: MIT

//! In-memory session adapter for tests.

use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum SessionCall {
    Spawn {
        name: String,
        cwd: PathBuf,
        cmd: String,
    },
    SendLine {
        name: String,
        text: String,
    },
    Quit {
        name: String,
    },
    Authorise {
        name: String,
        user: String,
    },
    EnableMultiuser {
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub cwd: PathBuf,
    pub cmd: String,
    pub lines: Vec<String>,
    pub multiuser: bool,
    pub authorised: Vec<String>,
    pub alive: bool,
}

struct State {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
}

#[derive(Clone)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeSessionAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                sessions: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    pub fn session(&self, name: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.alive)
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn spawn(&self, name: &str, cwd: &Path, cmd: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Spawn {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
        });
        inner.sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: cwd.to_path_buf(),
                cmd: cmd.to_string(),
                lines: Vec::new(),
                multiuser: false,
                authorised: Vec::new(),
                alive: true,
            },
        );
        Ok(())
    }

    async fn send_line(&self, name: &str, text: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::SendLine {
            name: name.to_string(),
            text: text.to_string(),
        });
        match inner.sessions.get_mut(name) {
            Some(session) if session.alive => {
                session.lines.push(text.to_string());
                Ok(())
            }
            _ => Err(SessionError::CommandFailed(format!("no such session: {name}"))),
        }
    }

    async fn quit(&self, name: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Quit {
            name: name.to_string(),
        });
        if let Some(session) = inner.sessions.get_mut(name) {
            session.alive = false;
        }
        Ok(())
    }

    async fn authorise(&self, name: &str, user: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Authorise {
            name: name.to_string(),
            user: user.to_string(),
        });
        match inner.sessions.get_mut(name) {
            Some(session) => {
                session.authorised.push(user.to_string());
                Ok(())
            }
            None => Err(SessionError::CommandFailed(format!("no such session: {name}"))),
        }
    }

    async fn enable_multiuser(&self, name: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::EnableMultiuser {
            name: name.to_string(),
        });
        match inner.sessions.get_mut(name) {
            Some(session) => {
                session.multiuser = true;
                Ok(())
            }
            None => Err(SessionError::CommandFailed(format!("no such session: {name}"))),
        }
    }
}
