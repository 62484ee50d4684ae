//! Process execution behind a trait, so update flows can be tested
//! without spawning `ansible-inventory`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// A fully resolved process invocation.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Successful,
    Failed,
}

/// Outcome of a finished process.
#[derive(Debug, Clone, Copy)]
pub struct RunResult {
    pub status: RunStatus,
    pub rc: i32,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Successful
    }

    fn from_exit(status: ExitStatus) -> Self {
        RunResult {
            status: if status.success() {
                RunStatus::Successful
            } else {
                RunStatus::Failed
            },
            rc: status.code().unwrap_or(-1),
        }
    }
}

/// Runs update processes.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, request: &RunRequest) -> Result<RunResult>;
}

/// Spawns the real process with a scrubbed environment and polls it so a
/// cancel flag (usually set from a Ctrl-C handler) can kill it.
pub struct RealProcessRunner {
    cancel: Arc<AtomicBool>,
}

impl RealProcessRunner {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run(&self, request: &RunRequest) -> Result<RunResult> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .env_clear()
            .envs(&request.env)
            .current_dir(&request.working_dir);
        // The scrubbed environment still needs PATH for program lookup.
        if !request.env.contains_key("PATH") {
            if let Ok(path) = std::env::var("PATH") {
                command.env("PATH", path);
            }
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", request.program))?;

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                let _ = child.kill();
                let _ = child.wait();
                bail!("Inventory update canceled");
            }
            match child
                .try_wait()
                .with_context(|| format!("Failed waiting for '{}'", request.program))?
            {
                Some(status) => return Ok(RunResult::from_exit(status)),
                None => std::thread::sleep(Duration::from_millis(100)),
            }
        }
    }
}

/// Mock runner that records requests and replays canned results.
#[cfg(test)]
pub struct MockProcessRunner {
    results: std::sync::Mutex<Vec<RunResult>>,
    seen: std::sync::Mutex<Vec<RunRequest>>,
}

#[cfg(test)]
impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            results: std::sync::Mutex::new(Vec::new()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue a result; later calls pop in order. With the queue empty the
    /// mock reports success.
    pub fn push_result(&self, result: RunResult) {
        self.results.lock().unwrap().push(result);
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProcessRunner for MockProcessRunner {
    fn run(&self, request: &RunRequest) -> Result<RunResult> {
        self.seen.lock().unwrap().push(request.clone());
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(RunResult {
                status: RunStatus::Successful,
                rc: 0,
            })
        } else {
            Ok(results.remove(0))
        }
    }
}
