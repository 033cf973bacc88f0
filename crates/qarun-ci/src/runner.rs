//! Command execution for QA steps.
//!
//! The pipeline only sees the [`CommandRunner`] trait: run one argv with a
//! timeout and environment overrides, return exit status and captured text.
//! [`ProcessRunner`] is the tokio implementation.

use anyhow::Context;
use async_trait::async_trait;
use qarun_core::{Status, StepResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long to keep draining pipes after the child exited or was killed.
const IO_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Note for a non-zero exit.
pub const NON_ZERO_EXIT_NOTE: &str = "Command returned non-zero exit code.";

/// One command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command to execute (first element is the executable).
    pub argv: Vec<String>,

    /// Working directory.
    pub cwd: PathBuf,

    /// Timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,

    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(argv: Vec<String>, cwd: PathBuf, timeout_secs: u64) -> Self {
        Self {
            argv,
            cwd,
            timeout_secs,
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Shell-quoted command line for the report.
    pub fn display(&self) -> String {
        render_command(&self.argv)
    }
}

/// How a command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited on its own; signal-terminated children report `-1`.
    Exited(i32),

    /// Killed after the timeout elapsed.
    TimedOut,

    /// Started, but waiting for it failed; the child was killed.
    WaitFailed(String),
}

/// Raw result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExecution {
    pub outcome: ExitOutcome,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Executes external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion or timeout.
    ///
    /// Errors only when the command cannot be started at all. Anything that
    /// goes wrong after spawning is reported through [`ExitOutcome`].
    async fn execute(&self, spec: &CommandSpec) -> anyhow::Result<RawExecution>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

type SharedBuf = Arc<Mutex<Vec<u8>>>;

async fn read_into<R: AsyncRead + Unpin>(mut reader: R, buf: SharedBuf) -> std::io::Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(&chunk[..n]);
    }
}

/// Wait for a reader task, then take whatever it captured.
async fn drain(
    task: Option<JoinHandle<std::io::Result<()>>>,
    buf: &SharedBuf,
    stream: &str,
) -> String {
    if let Some(task) = task {
        let abort = task.abort_handle();
        match tokio::time::timeout(IO_CAPTURE_TIMEOUT, task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(err))) => warn!(stream = stream, error = %err, "output capture failed"),
            Ok(Err(err)) => warn!(stream = stream, error = %err, "output capture task panicked"),
            Err(_) => {
                warn!(stream = stream, "output capture timed out; keeping partial output");
                abort.abort();
            }
        }
    }
    let bytes = std::mem::take(&mut *buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, spec: &CommandSpec) -> anyhow::Result<RawExecution> {
        let Some((exe, args)) = spec.argv.split_first() else {
            anyhow::bail!("empty command");
        };

        let start = Instant::now();
        let mut child = Command::new(exe)
            .args(args)
            .current_dir(&spec.cwd)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn {exe}"))?;

        debug!(command = %spec.display(), cwd = %spec.cwd.display(), "spawned");

        let stdout_buf = SharedBuf::default();
        let stderr_buf = SharedBuf::default();
        let stdout_task = child
            .stdout
            .take()
            .map(|out| tokio::spawn(read_into(out, stdout_buf.clone())));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(read_into(err, stderr_buf.clone())));

        let waited = if spec.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(spec.timeout_secs), child.wait())
                .await
                .ok()
        } else {
            Some(child.wait().await)
        };

        let outcome = match waited {
            Some(Ok(status)) => ExitOutcome::Exited(status.code().unwrap_or(-1)),
            Some(Err(err)) => {
                warn!(command = %spec.display(), error = %err, "wait failed; killing");
                if let Err(kill_err) = child.kill().await {
                    warn!(error = %kill_err, "failed to kill command");
                }
                ExitOutcome::WaitFailed(err.to_string())
            }
            None => {
                warn!(
                    command = %spec.display(),
                    timeout_secs = spec.timeout_secs,
                    "command timed out; killing"
                );
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill timed-out command");
                }
                ExitOutcome::TimedOut
            }
        };

        let stdout = drain(stdout_task, &stdout_buf, "stdout").await;
        let stderr = drain(stderr_task, &stderr_buf, "stderr").await;

        Ok(RawExecution {
            outcome,
            stdout,
            stderr,
            duration: start.elapsed(),
        })
    }
}

/// Execute one step and classify the outcome.
///
/// Never fails: a command that cannot start becomes a FAIL record.
pub async fn run_step(
    runner: &dyn CommandRunner,
    name: &str,
    spec: &CommandSpec,
    note_on_success: &str,
) -> StepResult {
    let start = Instant::now();
    let command = spec.display();

    match runner.execute(spec).await {
        Ok(raw) => {
            let (status, exit_code, note) = match raw.outcome {
                ExitOutcome::Exited(0) => (Status::Pass, Some(0), note_on_success.to_string()),
                ExitOutcome::Exited(code) => {
                    (Status::Fail, Some(code), NON_ZERO_EXIT_NOTE.to_string())
                }
                ExitOutcome::TimedOut => (
                    Status::Fail,
                    None,
                    format!("Command timed out after {}s.", spec.timeout_secs),
                ),
                ExitOutcome::WaitFailed(err) => (
                    Status::Fail,
                    None,
                    format!("Failed while waiting for command: {err}"),
                ),
            };
            StepResult {
                name: name.to_string(),
                status,
                command,
                exit_code,
                duration_ms: raw.duration.as_millis() as u64,
                note,
                stdout: raw.stdout,
                stderr: raw.stderr,
            }
        }
        Err(err) => {
            warn!(step = %name, error = %err, "step could not be started");
            StepResult {
                name: name.to_string(),
                status: Status::Fail,
                command,
                exit_code: None,
                duration_ms: start.elapsed().as_millis() as u64,
                note: format!("Failed to start command: {err:#}"),
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }
}

/// Quote one argument for a POSIX shell.
pub fn shell_quote(arg: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

/// Join argv into a copy-pasteable command line.
pub fn render_command(argv: &[String]) -> String {
    argv.iter()
        .map(|a| shell_quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, timeout_secs: u64) -> CommandSpec {
        CommandSpec::new(
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            PathBuf::from("."),
            timeout_secs,
        )
    }

    /// Replays a fixed result.
    struct Scripted(Option<RawExecution>);

    #[async_trait]
    impl CommandRunner for Scripted {
        async fn execute(&self, _spec: &CommandSpec) -> anyhow::Result<RawExecution> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("No such file or directory"))
        }
    }

    fn raw(outcome: ExitOutcome, stdout: &str) -> RawExecution {
        RawExecution {
            outcome,
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("phpunit.xml.dist"), "phpunit.xml.dist");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_render_command() {
        let argv = vec![
            "/p/vendor/bin/phpunit".to_string(),
            "-c".to_string(),
            "phpunit.xml.dist".to_string(),
            "--testsuite".to_string(),
            "static".to_string(),
        ];
        assert_eq!(
            render_command(&argv),
            "/p/vendor/bin/phpunit -c phpunit.xml.dist --testsuite static"
        );
    }

    #[tokio::test]
    async fn test_run_step_pass_uses_success_note() {
        let runner = Scripted(Some(raw(ExitOutcome::Exited(0), "OK")));
        let step = run_step(&runner, "PHPUnit Static Suite", &sh("true", 5), "done").await;
        assert_eq!(step.status, Status::Pass);
        assert_eq!(step.exit_code, Some(0));
        assert_eq!(step.note, "done");
        assert_eq!(step.duration_ms, 250);
        assert_eq!(step.command, "sh -c true");
    }

    #[tokio::test]
    async fn test_run_step_non_zero_exit() {
        let runner = Scripted(Some(raw(ExitOutcome::Exited(2), "")));
        let step = run_step(&runner, "x", &sh("exit 2", 5), "done").await;
        assert_eq!(step.status, Status::Fail);
        assert_eq!(step.exit_code, Some(2));
        assert_eq!(step.note, NON_ZERO_EXIT_NOTE);
    }

    #[tokio::test]
    async fn test_run_step_timeout_has_no_exit_code() {
        let runner = Scripted(Some(raw(ExitOutcome::TimedOut, "partial")));
        let step = run_step(&runner, "x", &sh("sleep 9", 7), "done").await;
        assert_eq!(step.status, Status::Fail);
        assert_eq!(step.exit_code, None);
        assert_eq!(step.note, "Command timed out after 7s.");
        assert_eq!(step.stdout, "partial");
    }

    #[tokio::test]
    async fn test_run_step_wait_failure_keeps_output() {
        let mut exec = raw(ExitOutcome::WaitFailed("Interrupted".to_string()), "partial out");
        exec.stderr = "partial err".to_string();
        let runner = Scripted(Some(exec));
        let step = run_step(&runner, "x", &sh("true", 5), "done").await;
        assert_eq!(step.status, Status::Fail);
        assert_eq!(step.exit_code, None);
        assert_eq!(step.note, "Failed while waiting for command: Interrupted");
        assert_eq!(step.stdout, "partial out");
        assert_eq!(step.stderr, "partial err");
    }

    #[tokio::test]
    async fn test_run_step_spawn_error_is_fail() {
        let runner = Scripted(None);
        let step = run_step(&runner, "x", &sh("true", 5), "done").await;
        assert_eq!(step.status, Status::Fail);
        assert!(step.exit_code.is_none());
        assert!(step.note.starts_with("Failed to start command:"));
    }

    #[tokio::test]
    async fn test_process_runner_captures_both_streams() {
        let raw = ProcessRunner
            .execute(&sh("echo out; echo err 1>&2; exit 3", 30))
            .await
            .expect("execute");
        assert_eq!(raw.outcome, ExitOutcome::Exited(3));
        assert_eq!(raw.stdout.trim(), "out");
        assert_eq!(raw.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_process_runner_env_overrides() {
        let spec = sh("printf %s \"$QARUN_TEST_VAR\"", 30).with_env("QARUN_TEST_VAR", "bitrix");
        let raw = ProcessRunner.execute(&spec).await.expect("execute");
        assert_eq!(raw.stdout, "bitrix");
    }

    #[tokio::test]
    async fn test_process_runner_timeout_keeps_partial_output() {
        let raw = ProcessRunner
            .execute(&sh("echo started; exec sleep 30", 1))
            .await
            .expect("execute");
        assert_eq!(raw.outcome, ExitOutcome::TimedOut);
        assert!(raw.stdout.contains("started"));
        assert!(raw.duration < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_process_runner_missing_executable_errors() {
        let spec = CommandSpec::new(
            vec!["/nonexistent-binary-that-does-not-exist".to_string()],
            PathBuf::from("."),
            5,
        );
        assert!(ProcessRunner.execute(&spec).await.is_err());
    }

    #[tokio::test]
    async fn test_process_runner_empty_command_errors() {
        let spec = CommandSpec::new(vec![], PathBuf::from("."), 5);
        assert!(ProcessRunner.execute(&spec).await.is_err());
    }
}
