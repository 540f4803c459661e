// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::ProgressSender;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe container and primary stream information
    async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError>;

    /// Geometry of the primary video stream
    async fn probe_dimensions(&self, file_path: &Path) -> Result<Dimensions, DomainError>;

    /// Keyframe timestamps of the primary video stream inside `window`
    async fn probe_keyframes(
        &self,
        file_path: &Path,
        window: TimeSpan,
    ) -> Result<Vec<f64>, DomainError>;
}

/// One fully pre-computed engine call
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInvocation {
    /// Human-readable stage name used in progress updates and logs
    pub stage: String,
    /// Arguments after the engine binary name
    pub args: Vec<String>,
    /// File the call is expected to produce
    pub output: PathBuf,
    /// Duration of the produced media, used to turn progress into a percentage
    pub expected_duration: Option<f64>,
}

impl EngineInvocation {
    pub fn new(stage: impl Into<String>, args: Vec<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            stage: stage.into(),
            args,
            output: output.into(),
            expected_duration: None,
        }
    }

    pub fn with_expected_duration(mut self, seconds: f64) -> Self {
        self.expected_duration = Some(seconds);
        self
    }

    /// Arguments joined for logging
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Engine exit failure, carrying the engine's own diagnostic text
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFailure {
    /// Exit code, `None` when the process could not be started or was killed
    pub status: Option<i32>,
    pub diagnostic: String,
}

impl EngineFailure {
    pub fn spawn(message: impl Into<String>) -> Self {
        Self {
            status: None,
            diagnostic: message.into(),
        }
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "exit status {}: {}", code, self.diagnostic),
            None => write!(f, "{}", self.diagnostic),
        }
    }
}

/// Port for running the encoding engine
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run one invocation to completion, forwarding progress when a sender is given
    async fn run(
        &self,
        invocation: &EngineInvocation,
        progress: Option<&ProgressSender>,
    ) -> Result<(), EngineFailure>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Size in bytes, 0 when the file is missing
    async fn file_size(&self, file_path: &Path) -> Result<u64, DomainError>;

    /// Remove a file; a missing file is not an error
    async fn remove_file(&self, file_path: &Path) -> Result<(), DomainError>;

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;

    /// Create a directory and its parents
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;
}
