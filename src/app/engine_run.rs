// Engine runs shared by the interactors

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::engine::progress::ProgressSender;
use crate::ports::*;

/// Removes a partially written output unless disarmed.
///
/// Only reached when the run is dropped mid-flight: an aborted job drops its
/// future, which kills the engine child and then removes the file here.
pub(crate) struct OutputGuard {
    path: PathBuf,
    armed: bool,
}

impl OutputGuard {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    /// Keep the output
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial output {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove partial output {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Run one invocation and make sure it produced a non-empty output.
///
/// On any failure the output file is removed through `fs` before returning.
pub(crate) async fn run_engine(
    execute: &dyn ExecutePort,
    fs: &dyn FsPort,
    invocation: &EngineInvocation,
    progress: Option<&ProgressSender>,
) -> Result<(), EngineFailure> {
    let guard = OutputGuard::new(&invocation.output);
    let result = produce(execute, fs, invocation, progress).await;
    if result.is_err() {
        match fs.remove_file(&invocation.output).await {
            Ok(()) => debug!("Removed partial output {}", invocation.output.display()),
            Err(e) => warn!("{}", e),
        }
    }
    guard.disarm();
    result
}

async fn produce(
    execute: &dyn ExecutePort,
    fs: &dyn FsPort,
    invocation: &EngineInvocation,
    progress: Option<&ProgressSender>,
) -> Result<(), EngineFailure> {
    execute.run(invocation, progress).await?;

    let size = fs
        .file_size(&invocation.output)
        .await
        .map_err(|e| EngineFailure::spawn(e.to_string()))?;
    if size == 0 {
        return Err(EngineFailure {
            status: Some(0),
            diagnostic: format!("engine produced no output at {}", invocation.output.display()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::adapters::FsLocalAdapter;
    use crate::domain::errors::DomainError;

    /// Local filesystem that records every removal
    #[derive(Default)]
    struct RecordingFs {
        inner: FsLocalAdapter,
        removed: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl FsPort for RecordingFs {
        async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
            self.inner.file_exists(file_path).await
        }

        async fn file_size(&self, file_path: &Path) -> Result<u64, DomainError> {
            self.inner.file_size(file_path).await
        }

        async fn remove_file(&self, file_path: &Path) -> Result<(), DomainError> {
            self.removed.lock().unwrap().push(file_path.to_path_buf());
            self.inner.remove_file(file_path).await
        }

        async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
            self.inner.copy_file(from, to).await
        }

        async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError> {
            self.inner.create_directory(dir_path).await
        }
    }

    /// Writes `contents` to the output, then exits with `status`
    struct WritingEngine {
        contents: &'static [u8],
        status: i32,
    }

    #[async_trait]
    impl ExecutePort for WritingEngine {
        async fn run(
            &self,
            invocation: &EngineInvocation,
            _progress: Option<&ProgressSender>,
        ) -> Result<(), EngineFailure> {
            std::fs::write(&invocation.output, self.contents).unwrap();
            if self.status == 0 {
                Ok(())
            } else {
                Err(EngineFailure {
                    status: Some(self.status),
                    diagnostic: "Conversion failed!".to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_failed_run_removes_output_through_port() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let fs = RecordingFs::default();
        let engine = WritingEngine {
            contents: b"half a file",
            status: 1,
        };
        let invocation = EngineInvocation::new("cut", Vec::new(), &output);

        let failure = run_engine(&engine, &fs, &invocation, None).await.unwrap_err();
        assert_eq!(failure.status, Some(1));
        assert!(failure.diagnostic.contains("Conversion failed!"));
        assert_eq!(*fs.removed.lock().unwrap(), vec![output.clone()]);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let fs = RecordingFs::default();
        let engine = WritingEngine {
            contents: b"",
            status: 0,
        };
        let invocation = EngineInvocation::new("cut", Vec::new(), &output);

        let failure = run_engine(&engine, &fs, &invocation, None).await.unwrap_err();
        assert!(failure.diagnostic.contains("no output"));
        assert_eq!(fs.removed.lock().unwrap().len(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_successful_run_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let fs = RecordingFs::default();
        let engine = WritingEngine {
            contents: b"encoded",
            status: 0,
        };
        let invocation = EngineInvocation::new("cut", Vec::new(), &output);

        run_engine(&engine, &fs, &invocation, None).await.unwrap();
        assert!(fs.removed.lock().unwrap().is_empty());
        assert!(output.exists());
    }

    #[test]
    fn test_guard_removes_unless_disarmed() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.mp4");
        let kept = dir.path().join("kept.mp4");
        std::fs::write(&partial, b"x").unwrap();
        std::fs::write(&kept, b"x").unwrap();

        drop(OutputGuard::new(&partial));
        OutputGuard::new(&kept).disarm();

        assert!(!partial.exists());
        assert!(kept.exists());
    }

    #[test]
    fn test_guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        drop(OutputGuard::new(&dir.path().join("never-written.mp4")));
    }
}
