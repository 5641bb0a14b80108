//! Process-backed stage execution
//!
//! The runner spawns a stage's external command inside the project
//! directory, streams its output, and applies the stage's output policy.
//! Only error-stream data and spawn errors fail a stage; exit status is
//! never consulted.

use std::io::Write;
use std::process::Stdio;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, StageError};
use crate::orchestrator::StageOutcome;
use crate::scraper;
use crate::stage::{OutputPolicy, Stage};

/// Runs a single stage to settlement. The seam the orchestrator is
/// generic over, so the state machine is testable without spawning
/// processes.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run_stage(&self, stage: &Stage) -> Result<StageOutcome>;
}

/// The tokio-backed runner used in production
pub struct ProcessRunner {
    /// Working directory for every stage (the new project directory)
    workdir: Utf8PathBuf,
}

impl ProcessRunner {
    pub fn new(workdir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl StageRunner for ProcessRunner {
    async fn run_stage(&self, stage: &Stage) -> Result<StageOutcome> {
        debug!("spawning stage '{}': {}", stage.name, stage.command_line());

        let mut child = Command::new(&stage.command)
            .args(&stage.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| StageError::Spawn {
                command: stage.command_line(),
                source,
            })?;

        let mut stdout = child.stdout.take().expect("stdout is piped");
        let mut stderr = child.stderr.take().expect("stderr is piped");

        let mut stdout_open = true;
        let mut stderr_open = true;
        let mut out_buf = vec![0u8; 8192];
        let mut err_buf = vec![0u8; 8192];

        let read_err = |source| StageError::OutputRead {
            command: stage.command_line(),
            source,
        };

        loop {
            tokio::select! {
                read = stdout.read(&mut out_buf), if stdout_open => {
                    let n = read.map_err(read_err)?;
                    if n == 0 {
                        stdout_open = false;
                        continue;
                    }
                    let chunk = String::from_utf8_lossy(&out_buf[..n]);
                    match &stage.policy {
                        OutputPolicy::Suppressed => {}
                        OutputPolicy::Passthrough => {
                            let mut out = std::io::stdout();
                            let _ = out.write_all(chunk.as_bytes());
                            let _ = out.flush();
                        }
                        OutputPolicy::Scraped(pattern) => {
                            if let Some(signal) = scraper::scrape(&chunk, pattern) {
                                // First match settles the stage; the child is
                                // left to run to its natural exit, unkilled.
                                debug!("stage '{}' signal: {}", stage.name, signal);
                                return Ok(StageOutcome::Signal(signal));
                            }
                        }
                    }
                }
                read = stderr.read(&mut err_buf), if stderr_open => {
                    let n = read.map_err(read_err)?;
                    if n == 0 {
                        stderr_open = false;
                        continue;
                    }
                    // Any error-stream data is a stage failure.
                    return Err(StageError::Stderr {
                        command: stage.command_line(),
                        stderr: String::from_utf8_lossy(&err_buf[..n]).into_owned(),
                    });
                }
                else => break,
            }
        }

        // Both streams hit EOF with no signal and no stderr: the soft
        // "completed with no signal" outcome, regardless of exit status.
        let _ = child.wait().await;
        Ok(StageOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::default_deploy_url_pattern;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn runner_in(dir: &TempDir) -> ProcessRunner {
        ProcessRunner::new(
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir"),
        )
    }

    fn suppressed_sh(name: &str, script: &str) -> Stage {
        Stage::suppressed(name, "sh", ["-c", script])
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_only_stage_completes_without_signal() {
        let dir = TempDir::new().unwrap();
        let stage = suppressed_sh("echo", "echo hello");

        let outcome = runner_in(&dir).run_stage(&stage).await.unwrap();
        assert!(matches!(outcome, StageOutcome::Completed));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_without_stderr_is_not_a_failure() {
        let dir = TempDir::new().unwrap();
        let stage = suppressed_sh("exit", "exit 3");

        let outcome = runner_in(&dir).run_stage(&stage).await.unwrap();
        assert!(matches!(outcome, StageOutcome::Completed));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_data_fails_the_stage() {
        let dir = TempDir::new().unwrap();
        let stage = suppressed_sh("boom", "echo boom 1>&2");

        let err = runner_in(&dir).run_stage(&stage).await.unwrap_err();
        match err {
            StageError::Stderr { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("expected stderr failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passthrough_stage_echoes_and_completes_without_signal() {
        let dir = TempDir::new().unwrap();
        let stage = Stage::passthrough("echo", "sh", ["-c", "echo visible progress"]);

        let outcome = runner_in(&dir).run_stage(&stage).await.unwrap();
        assert!(matches!(outcome, StageOutcome::Completed));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passthrough_stage_still_fails_on_stderr() {
        let dir = TempDir::new().unwrap();
        let stage = Stage::passthrough("mixed", "sh", ["-c", "echo ok; echo bad 1>&2"]);

        let err = runner_in(&dir).run_stage(&stage).await.unwrap_err();
        assert!(matches!(err, StageError::Stderr { .. }));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let stage = Stage::suppressed("ghost", "ignitekv-test-no-such-binary", ["--version"]);

        let err = runner_in(&dir).run_stage(&stage).await.unwrap_err();
        assert!(matches!(err, StageError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scraped_stage_resolves_on_first_match_before_exit() {
        let dir = TempDir::new().unwrap();
        let stage = Stage::scraped(
            "deploy",
            "sh",
            ["-c", "echo https://my-app.example-platform.dev; sleep 5"],
            default_deploy_url_pattern(),
        );

        let start = Instant::now();
        let outcome = runner_in(&dir).run_stage(&stage).await.unwrap();

        match outcome {
            StageOutcome::Signal(url) => {
                assert_eq!(url, "https://my-app.example-platform.dev")
            }
            other => panic!("expected a signal, got {:?}", other),
        }
        // Settled on the match, not on the 5s sleep finishing.
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scraped_stage_without_match_completes_softly() {
        let dir = TempDir::new().unwrap();
        let stage = Stage::scraped(
            "deploy",
            "sh",
            ["-c", "echo nothing interesting here"],
            default_deploy_url_pattern(),
        );

        let outcome = runner_in(&dir).run_stage(&stage).await.unwrap();
        assert!(matches!(outcome, StageOutcome::Completed));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stages_run_in_the_working_directory() {
        let dir = TempDir::new().unwrap();
        let stage = suppressed_sh("touch", "touch marker-file");

        runner_in(&dir).run_stage(&stage).await.unwrap();
        assert!(dir.path().join("marker-file").exists());
    }
}
