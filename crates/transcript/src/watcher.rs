// SPDX-License-Identifier: MIT

use crate::formatting::{banner, format_line, leading_date};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::{mpsc, oneshot};

const ROTATION_DEST_NAME: &str = "ForgeModLoader-server-1.log";
const TRANSCRIPT_NAME: &str = "chatlog.txt";

/// A running transcriber task. Dropping this without calling [`stop`] leaves
/// the task running; call `stop` for an orderly shutdown.
///
/// [`stop`]: TranscriberHandle::stop
pub struct TranscriberHandle {
    shutdown: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TranscriberHandle {
    /// Signal the transcriber to stop and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Start watching `server_path` for the Forge log-rotation rename.
pub fn spawn_transcriber(server_path: PathBuf) -> TranscriberHandle {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(watch_loop(server_path, shutdown_rx));
    TranscriberHandle {
        shutdown: shutdown_tx,
        task,
    }
}

async fn watch_loop(server_path: PathBuf, mut shutdown_rx: oneshot::Receiver<()>) {
    let dest_path = server_path.join(ROTATION_DEST_NAME);
    let (tx, mut file_rx) = mpsc::channel(32);

    let _watcher = match create_dir_watcher(&server_path, dest_path.clone(), tx) {
        Ok(w) => Some(w),
        Err(error) => {
            tracing::warn!(path = %server_path.display(), %error, "failed to watch directory for log rotation");
            None
        }
    };

    let mut last_processed: Option<SystemTime> = None;

    loop {
        tokio::select! {
            event = file_rx.recv() => {
                if event.is_none() {
                    break;
                }
                try_process_rotation(&server_path, &dest_path, &mut last_processed);
            }
            _ = &mut shutdown_rx => {
                tracing::debug!(path = %server_path.display(), "transcriber shutdown requested");
                break;
            }
        }
    }
}

/// Watch `dir` and notify `tx` whenever an event touches `dest_path`.
fn create_dir_watcher(
    dir: &Path,
    dest_path: PathBuf,
    tx: mpsc::Sender<()>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if let Ok(event) = res {
            if event.paths.iter().any(|p| p == &dest_path) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Process a rotation if `dest_path` exists and has changed since the last
/// time we transcribed it. A directory watch can deliver more than one
/// filesystem event for a single logical rename; comparing modification
/// time keeps a rotation from being appended to the transcript twice.
fn try_process_rotation(
    server_path: &Path,
    dest_path: &Path,
    last_processed: &mut Option<SystemTime>,
) {
    let Ok(metadata) = std::fs::metadata(dest_path) else {
        return;
    };
    let Ok(modified) = metadata.modified() else {
        return;
    };
    if *last_processed == Some(modified) {
        return;
    }

    match transcribe_rotation(server_path, dest_path) {
        Ok(()) => *last_processed = Some(modified),
        Err(error) => {
            tracing::warn!(path = %dest_path.display(), %error, "failed to transcribe rotated log");
        }
    }
}

fn transcribe_rotation(server_path: &Path, rotated_log: &Path) -> std::io::Result<()> {
    let mut transcript = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(server_path.join(TRANSCRIPT_NAME))?;

    let log = File::open(rotated_log)?;
    let mut lines = BufReader::new(log).lines();

    let Some(first_line) = lines.next().transpose()? else {
        return Ok(());
    };
    let Some(date) = leading_date(&first_line) else {
        return Ok(());
    };
    transcript.write_all(banner(date).as_bytes())?;

    for line in lines {
        let line = line?;
        if let Some(formatted) = format_line(&line) {
            transcript.write_all(formatted.as_bytes())?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
