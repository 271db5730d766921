// SPDX-License-Identifier: MIT

//! Liveness prober: the legacy Minecraft server-list-ping handshake.
//!
//! Opens a TCP connection, sends the pre-modern ping (`0xFE 0x01`), and
//! checks that the reply begins with a `0xFF` disconnect packet whose
//! UTF-16BE payload opens with the three code points `U+00A7 U+0031 U+0000`
//! (the `§1\0` protocol-version marker). Any socket error, timeout, short
//! read, or mismatch is a negative result, never an error: retry policy is
//! the supervisor's concern, not the prober's.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REPLY_BYTES: usize = 1024;
const EXPECTED_PREFIX: [u16; 3] = [0x00A7, 0x0031, 0x0000];

#[async_trait]
pub trait LivenessProber: Clone + Send + Sync + 'static {
    /// Probe `(host, port)` for liveness. Never returns an error: a failed
    /// probe is represented as `Ok(false)`.
    async fn probe(&self, host: &str, port: u16) -> bool;
}

#[derive(Clone, Default)]
pub struct TcpLivenessProber;

impl TcpLivenessProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LivenessProber for TcpLivenessProber {
    async fn probe(&self, host: &str, port: u16) -> bool {
        match tokio::time::timeout(RECEIVE_TIMEOUT, probe_inner(host, port)).await {
            Ok(Ok(responsive)) => responsive,
            Ok(Err(_)) | Err(_) => false,
        }
    }
}

async fn probe_inner(host: &str, port: u16) -> std::io::Result<bool> {
    let mut stream = TcpStream::connect((host, port)).await?;
    stream.write_all(&[0xFE, 0x01]).await?;

    let mut buf = [0u8; MAX_REPLY_BYTES];
    let n = stream.read(&mut buf).await?;
    Ok(is_legacy_ping_reply(&buf[..n]))
}

fn is_legacy_ping_reply(data: &[u8]) -> bool {
    if data.first() != Some(&0xFF) {
        return false;
    }
    // Byte 0 is the 0xFF packet ident, bytes 1-2 are a big-endian u16 length
    // of the following UTF-16BE string; the payload starts at byte 3.
    let Some(payload) = data.get(3..) else {
        return false;
    };
    if payload.len() < EXPECTED_PREFIX.len() * 2 {
        return false;
    }
    let code_points: Vec<u16> = payload
        .chunks_exact(2)
        .take(EXPECTED_PREFIX.len())
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    code_points == EXPECTED_PREFIX
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLivenessProber;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::LivenessProber;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Fake prober whose answers are pre-programmed per `(host, port)`,
    /// defaulting to `true` for addresses never configured.
    #[derive(Clone, Default)]
    pub struct FakeLivenessProber {
        answers: Arc<Mutex<HashMap<(String, u16), Vec<bool>>>>,
    }

    impl FakeLivenessProber {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a sequence of answers for `(host, port)`; each call to
        /// `probe` for that address consumes the next one. Once the queue
        /// is drained, the last answer repeats.
        pub fn set_answers(&self, host: &str, port: u16, answers: Vec<bool>) {
            self.answers
                .lock()
                .insert((host.to_string(), port), answers);
        }
    }

    #[async_trait]
    impl LivenessProber for FakeLivenessProber {
        async fn probe(&self, host: &str, port: u16) -> bool {
            let mut answers = self.answers.lock();
            match answers.get_mut(&(host.to_string(), port)) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue[0],
                None => true,
            }
        }
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
