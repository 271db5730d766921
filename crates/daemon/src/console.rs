// SPDX-License-Identifier: MIT

//! Operator console: a line-oriented command loop reading standard input.
//!
//! Runs on its own OS thread so it can poll with a short timeout and remain
//! cancellable without pulling stdin onto the async runtime. A second
//! reader thread does the actual blocking line reads and forwards them
//! over a channel; the console loop itself only ever blocks for up to one
//! second at a time, so a shutdown request is never kept waiting long.

use mcsup_adapters::{ScreenAdapter, ShellProcessInspector, TcpLivenessProber};
use mcsup_core::SystemClock;
use mcsup_supervisor::Supervisor;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

type AppSupervisor = Supervisor<ShellProcessInspector, ScreenAdapter, TcpLivenessProber, SystemClock>;

const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// A configured target as the console sees it: its nick and the supervisor
/// that owns it.
pub struct ConsoleTarget {
    pub nick: String,
    pub supervisor: Arc<AppSupervisor>,
}

/// Spawn the console on a dedicated thread. `stop` is polled once a second
/// and, once set, causes the loop to exit; `shutdown` is notified when the
/// operator issues `exit`, which the lifecycle root also listens on.
pub fn spawn(
    targets: Vec<ConsoleTarget>,
    runtime: Handle,
    stop: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) -> std::thread::JoinHandle<()> {
    match std::thread::Builder::new()
        .name("mcsup-console".to_string())
        .spawn(move || run(targets, runtime, stop, shutdown))
    {
        Ok(handle) => handle,
        Err(error) => {
            tracing::error!(%error, "failed to spawn operator console thread");
            std::process::exit(1);
        }
    }
}

fn run(targets: Vec<ConsoleTarget>, runtime: Handle, stop: Arc<AtomicBool>, shutdown: Arc<Notify>) {
    print_help(None);
    prompt();

    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        match rx.recv_timeout(POLL_TIMEOUT) {
            Ok(line) => {
                if dispatch(&line, &targets, &runtime, &shutdown) {
                    return;
                }
                prompt();
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn prompt() {
    print!("\nmcsup> ");
    let _ = std::io::stdout().flush();
}

/// Returns `true` if the console should stop reading further input.
fn dispatch(line: &str, targets: &[ConsoleTarget], runtime: &Handle, shutdown: &Arc<Notify>) -> bool {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        print_help(None);
        return false;
    };
    let verb = verb.to_lowercase();
    let args: Vec<&str> = words.collect();

    match verb.as_str() {
        "exit" if args.is_empty() => {
            shutdown.notify_one();
            return true;
        }
        "help" if args.len() <= 1 => print_help(args.first().copied()),
        "list" if args.is_empty() => {
            println!("Configured targets:");
            for target in targets {
                println!("\t{}", target.nick);
            }
        }
        "start" if args.len() == 1 => {
            if let Some(target) = find(targets, args[0]) {
                runtime.block_on(target.supervisor.start());
            }
        }
        "stop" if args.len() == 1 => {
            if let Some(target) = find(targets, args[0]) {
                runtime.block_on(target.supervisor.stop());
            }
        }
        "restart" if args.len() == 1 => {
            if let Some(target) = find(targets, args[0]) {
                runtime.block_on(target.supervisor.restart());
            }
        }
        "status" if args.len() == 1 => {
            if let Some(target) = find(targets, args[0]) {
                let status = runtime.block_on(target.supervisor.status());
                println!(
                    "{}: desired={:?} observed_online={} responsive={:?}",
                    target.nick, status.desired, status.observed_online, status.responsive
                );
            }
        }
        _ => print_help(None),
    }
    false
}

fn find<'a>(targets: &'a [ConsoleTarget], nick: &str) -> Option<&'a ConsoleTarget> {
    match targets.iter().find(|t| t.nick == nick) {
        found @ Some(_) => found,
        None => {
            println!("Server {nick} was not found in the configuration.");
            println!("Use \"list\" to see the currently configured servers.");
            None
        }
    }
}

fn print_help(command: Option<&str>) {
    match command {
        Some("exit") => {
            println!("exit:");
            println!("Stops the supervisor process. Any servers it is monitoring keep running");
            println!("inside their own sessions and resume being monitored the next time the");
            println!("supervisor starts.");
        }
        Some("help") => {
            println!("help [command]:");
            println!("Shows a description of the given command, or a list of all commands if");
            println!("no argument is given.");
        }
        Some("list") => {
            println!("list:");
            println!("Lists the nicks of every server this supervisor is configured to monitor.");
        }
        Some("restart") => {
            println!("restart <nick>:");
            println!("If the named server is online, stops then starts it.");
        }
        Some("start") => {
            println!("start <nick>:");
            println!("If the named server is offline, starts it in a fresh session.");
        }
        Some("status") => {
            println!("status <nick>:");
            println!("Shows whether the named server is running and responding to the network.");
        }
        Some("stop") => {
            println!("stop <nick>:");
            println!("If the named server is online, stops it gracefully, falling back to a");
            println!("forced kill after 60 seconds.");
        }
        _ => {
            println!("Available commands:");
            println!("\texit");
            println!("\thelp\t[command]");
            println!("\tlist");
            println!("\trestart\t<nick>");
            println!("\tstart\t<nick>");
            println!("\tstatus\t<nick>");
            println!("\tstop\t<nick>");
        }
    }
}
