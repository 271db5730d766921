// SPDX-License-Identifier: MIT

//! Line formatting: ANSI color stripping, chat/broadcast recognition, and
//! the transcript's banner and column layout.

use regex::Regex;
use std::sync::LazyLock;

static COLOR_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b.+?m").unwrap());

static CHAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<date>\d{4}-\d{2}-\d{2}\ \d{2}:\d{2}:\d{2})
        \ \[INFO\]\ \[(?:MyTown|Dynmap)\]\ (?P<username>.+?:)
        \ (?P<message>.+)$",
    )
    .unwrap()
});

static BROADCAST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<date>\d{4}-\d{2}-\d{2}\ \d{2}:\d{2}:\d{2})
        \ \[INFO\]\ \[Minecraft-Server\]\ \[Server\]\ (?P<message>.+)$",
    )
    .unwrap()
});

static LEADING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap());

/// Extract a leading `YYYY-MM-DD HH:MM:SS` timestamp from a line, if present.
pub fn leading_date(line: &str) -> Option<&str> {
    LEADING_DATE.find(line).map(|m| m.as_str())
}

/// Strip ANSI color escape sequences (`\x1B...m`, matched non-greedily).
pub fn strip_color_codes(line: &str) -> String {
    COLOR_CODE.replace_all(line, "").into_owned()
}

/// The banner written as the first line of a transcribed rotation.
pub fn banner(date: &str) -> String {
    format!("\n{date} {}\n", center_asterisks("Starting Minecraft server", 60))
}

/// A single recognised, formatted transcript line, or `None` if the raw
/// line matched neither the chat nor broadcast pattern.
pub fn format_line(raw_line: &str) -> Option<String> {
    let stripped = strip_color_codes(raw_line);

    if let Some(caps) = CHAT_LINE.captures(&stripped) {
        return Some(column_line(&caps["date"], &caps["username"], &caps["message"]));
    }
    if let Some(caps) = BROADCAST_LINE.captures(&stripped) {
        return Some(column_line(&caps["date"], "[Server]", &caps["message"]));
    }
    None
}

fn column_line(date: &str, username: &str, message: &str) -> String {
    format!("{date} {username:>30} {message}\n")
}

/// Center `text` in a field `width` columns wide, padded with `*`. Mirrors
/// Python's `'{:*^N}'.format(text)`: an odd remainder pads one extra
/// asterisk on the right.
fn center_asterisks(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let total_pad = width - len;
    let left = total_pad / 2;
    let right = total_pad - left;
    format!("{}{}{}", "*".repeat(left), text, "*".repeat(right))
}

#[cfg(test)]
#[path = "formatting_tests.rs"]
mod tests;
