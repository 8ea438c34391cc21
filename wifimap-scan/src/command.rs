use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::ScanError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    /// Stdout, or stderr when stdout is empty. Some tools (route, ping)
    /// report on stderr.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Runs OS tools for the scan providers
pub trait CommandRunner: Send + Sync {
    /// Runs `program` to completion. A non-zero exit status is not an error:
    /// callers inspect the captured output.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ScanError>;
}

/// Spawns real processes and kills them after `timeout`
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = reader.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ScanError> {
        let command_line = format!("{} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScanError::CommandFailed(format!("{}: {}", command_line, e)))?;

        // Pipes are drained on their own threads so a chatty tool can't block
        // on a full pipe while we wait for it
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    log::warn!("Command timed out after {:?}: {}", self.timeout, command_line);
                    return Err(ScanError::Timeout(command_line));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(ScanError::CommandFailed(format!("{}: {}", command_line, e)));
                }
            }
        };

        let output = CommandOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            success: status.success(),
        };

        if !output.success {
            log::debug!("Command exited with {}: {}", status, command_line);
        }

        Ok(output)
    }
}
