//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as a child process. Progress is read from the
//! `-progress pipe:1` stream on stdout while stderr is collected on a separate
//! task, so neither pipe can fill up and stall the child.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::engine::progress::{parse_progress_line, ProgressSampler, ProgressSender};
use crate::ports::*;

/// Lines of stderr kept in a failure diagnostic
const DIAGNOSTIC_LINES: usize = 12;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    binary: PathBuf,
}

impl FFmpegAdapter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn run(
        &self,
        invocation: &EngineInvocation,
        progress: Option<&ProgressSender>,
    ) -> Result<(), EngineFailure> {
        debug!(
            stage = %invocation.stage,
            output = %invocation.output.display(),
            "{} {}",
            self.binary.display(),
            invocation.command_line()
        );

        let mut child = Command::new(&self.binary)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineFailure::spawn(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut sampler = ProgressSampler::new(&invocation.stage, invocation.expected_duration);
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let Some(event) = parse_progress_line(&line) else {
                    continue;
                };
                if let Some(update) = sampler.observe(&event) {
                    trace!(stage = %update.stage, percent = update.percent, "progress");
                    if let Some(sender) = progress {
                        sender.send(&update.stage, update.percent);
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| EngineFailure::spawn(format!("failed to wait for engine: {}", e)))?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            if !stderr.trim().is_empty() {
                debug!(stage = %invocation.stage, "engine stderr: {}", stderr.trim());
            }
            return Ok(());
        }

        let failure = EngineFailure {
            status: status.code(),
            diagnostic: summarize_diagnostic(&stderr),
        };
        warn!(stage = %invocation.stage, "engine failed: {}", failure);
        Err(failure)
    }
}

/// Keep the tail of the engine's stderr, where the actual error lives
pub fn summarize_diagnostic(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return "engine reported no diagnostic".to_string();
    }
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_keeps_tail() {
        let stderr: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let summary = summarize_diagnostic(&stderr);
        assert!(summary.starts_with("line 9"));
        assert!(summary.ends_with("line 20"));
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(
            summarize_diagnostic("\n  \n"),
            "engine reported no diagnostic"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let adapter = FFmpegAdapter::new("/nonexistent/ffmpeg-binary");
        let invocation = EngineInvocation::new("cut", vec!["-version".to_string()], "out.mp4");
        let failure = adapter.run(&invocation, None).await.unwrap_err();
        assert_eq!(failure.status, None);
        assert!(failure.diagnostic.contains("failed to start"));
    }
}
