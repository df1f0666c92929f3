// Allow-listed diagnostic commands with line-streamed execution

use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Bounded event buffer per session; a slow client backpressures the read
/// loop instead of growing memory.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Synthetic exit code when the process never produced a status
/// (spawn failure, or killed by signal).
const NO_STATUS_EXIT: i32 = -1;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("command '{0}' requires a target")]
    MissingTarget(&'static str),
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

/// The fixed allow-list of remotely runnable diagnostics. Each variant
/// carries its binary, default-argument template, and whether a target
/// host is mandatory. Matched exhaustively; nothing is dispatched by
/// string indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagCommand {
    Ping,
    Traceroute,
    Mtr,
    Dig,
    Ip,
    Ss,
}

impl DiagCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Self::Ping),
            "traceroute" => Some(Self::Traceroute),
            "mtr" => Some(Self::Mtr),
            "dig" => Some(Self::Dig),
            "ip" => Some(Self::Ip),
            "ss" => Some(Self::Ss),
            _ => None,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Traceroute => "traceroute",
            Self::Mtr => "mtr",
            Self::Dig => "dig",
            Self::Ip => "ip",
            Self::Ss => "ss",
        }
    }

    pub fn default_args(self) -> &'static [&'static str] {
        match self {
            Self::Ping => &["-c", "4"],
            Self::Traceroute => &[],
            Self::Mtr => &["-r", "-c", "10"],
            Self::Dig => &[],
            Self::Ip => &["addr"],
            Self::Ss => &["-s"],
        }
    }

    pub fn requires_target(self) -> bool {
        match self {
            Self::Ping | Self::Traceroute | Self::Mtr | Self::Dig => true,
            Self::Ip | Self::Ss => false,
        }
    }
}

/// Shell-word tokenizer: whitespace-separated, single- or double-quoted
/// segments kept as one token. Feeds a discrete argv; nothing ever goes
/// through a shell interpreter.
pub fn split_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }
    // An unterminated quote keeps the remainder as one token.
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Validate a request and assemble the argument vector:
/// default args, then caller extras, then the target.
/// Fails before anything is spawned.
pub fn build_argv(
    name: &str,
    target: Option<&str>,
    extra: Option<&str>,
) -> Result<(&'static str, Vec<String>), CommandError> {
    let command = DiagCommand::parse(name).ok_or_else(|| CommandError::Unknown(name.into()))?;
    let target = target.map(str::trim).filter(|t| !t.is_empty());
    if command.requires_target() && target.is_none() {
        return Err(CommandError::MissingTarget(command.program()));
    }
    if let Some(t) = target
        && (t.starts_with('-') || t.chars().any(char::is_whitespace))
    {
        return Err(CommandError::InvalidTarget(t.into()));
    }
    let mut args: Vec<String> = command
        .default_args()
        .iter()
        .map(|s| s.to_string())
        .collect();
    if let Some(extra) = extra {
        args.extend(split_args(extra));
    }
    if let Some(t) = target {
        args.push(t.to_string());
    }
    Ok((command.program(), args))
}

/// One event on a streaming session: a line of merged stdout/stderr, or
/// the terminal exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Line(String),
    Exit(i32),
}

/// A live subprocess-to-client relay. Dropping `events` terminates the
/// subprocess; the session never leaks a running process.
pub struct CommandStream {
    pub events: mpsc::Receiver<StreamEvent>,
    /// OS pid of the spawned child, if it started.
    pub pid: Option<u32>,
}

/// Spawn a diagnostic and stream its output line-by-line. Each line is
/// emitted as soon as it is read, never buffering the full output, so
/// slow long-running diagnostics get a low time-to-first-byte.
///
/// If spawning fails the stream carries exactly one error line followed by
/// a synthetic non-zero exit event, so the caller never hangs on a process
/// that never started.
pub fn stream_command(program: &str, args: &[String]) -> CommandStream {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            let message = format!("error: failed to start {}: {}", program, e);
            tracing::warn!(program, error = %e, "diagnostic spawn failed");
            tokio::spawn(async move {
                let _ = tx.send(StreamEvent::Line(message)).await;
                let _ = tx.send(StreamEvent::Exit(NO_STATUS_EXIT)).await;
            });
            return CommandStream {
                events: rx,
                pid: None,
            };
        }
    };

    let pid = child.id();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::spawn(async move {
        relay_output(child, stdout, stderr, tx).await;
    });
    CommandStream { events: rx, pid }
}

async fn relay_output(
    mut child: Child,
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
    tx: mpsc::Sender<StreamEvent>,
) {
    let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
        // Both pipes were requested at spawn; missing handles mean the
        // session is unusable, so tear it down rather than hang the client.
        let _ = child.kill().await;
        let _ = tx.send(StreamEvent::Exit(NO_STATUS_EXIT)).await;
        return;
    };
    let mut out_lines = BufReader::new(stdout).lines();
    let mut err_lines = BufReader::new(stderr).lines();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            _ = tx.closed() => {
                // Client disconnected mid-stream: terminate and reap so no
                // orphaned process survives the session.
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "failed to kill diagnostic subprocess");
                }
                return;
            }
            line = out_lines.next_line(), if out_open => {
                match line {
                    Ok(Some(text)) => {
                        if tx.send(StreamEvent::Line(text)).await.is_err() {
                            let _ = child.kill().await;
                            return;
                        }
                    }
                    // Read errors end the pipe the same way EOF does.
                    _ => out_open = false,
                }
            }
            line = err_lines.next_line(), if err_open => {
                match line {
                    Ok(Some(text)) => {
                        if tx.send(StreamEvent::Line(text)).await.is_err() {
                            let _ = child.kill().await;
                            return;
                        }
                    }
                    _ => err_open = false,
                }
            }
        }
    }

    // Output exhausted: reap and report the exit code, even when the
    // process died unexpectedly mid-stream.
    let code = match child.wait().await {
        Ok(status) => status.code().unwrap_or(NO_STATUS_EXIT),
        Err(e) => {
            tracing::warn!(error = %e, "failed to reap diagnostic subprocess");
            NO_STATUS_EXIT
        }
    };
    let _ = tx.send(StreamEvent::Exit(code)).await;
}
