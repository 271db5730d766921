// SPDX-License-Identifier: MIT

//! Log transcriber: watches a target's directory for the Forge log-rotation
//! rename, then streams the rotated log into a persistent chat transcript.

pub mod formatting;
mod watcher;

pub use watcher::{spawn_transcriber, TranscriberHandle};
