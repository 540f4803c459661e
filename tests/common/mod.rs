//! Stub ports shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mediaclip::adapters::{AppConfig, FsLocalAdapter};
use mediaclip::app::DefaultAppContainer;
use mediaclip::domain::errors::DomainError;
use mediaclip::domain::model::*;
use mediaclip::engine::progress::ProgressSender;
use mediaclip::ports::*;

/// H.264/AAC source at 30 fps
pub fn media_info(path: &Path, duration: f64, width: u32, height: u32, audio: bool) -> MediaInfo {
    MediaInfo {
        path: path.display().to_string(),
        container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        duration,
        dimensions: Dimensions::new(width, height),
        frame_rate: 30.0,
        video_codec: "h264".to_string(),
        audio_codec: audio.then(|| "aac".to_string()),
        file_size: 1024,
        bit_rate: None,
    }
}

/// Write a placeholder file so existence checks pass
pub fn touch(path: &Path) {
    std::fs::write(path, b"placeholder").unwrap();
}

/// Probe answering from a fixed table
#[derive(Default)]
pub struct StubProbe {
    media: Mutex<HashMap<PathBuf, MediaInfo>>,
    keyframes: Mutex<Vec<f64>>,
    calls: AtomicUsize,
    dimensions_only: bool,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(self, info: MediaInfo) -> Self {
        self.media
            .lock()
            .unwrap()
            .insert(PathBuf::from(&info.path), info);
        self
    }

    pub fn with_keyframes(self, keyframes: Vec<f64>) -> Self {
        *self.keyframes.lock().unwrap() = keyframes;
        self
    }

    /// Answer dimension queries but fail full media probes
    pub fn dimensions_only(mut self) -> Self {
        self.dimensions_only = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.media
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| DomainError::ProbeFailed {
                path: path.display().to_string(),
                diagnostic: "unknown file".to_string(),
            })
    }
}

#[async_trait]
impl ProbePort for StubProbe {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError> {
        let info = self.lookup(file_path)?;
        if self.dimensions_only {
            return Err(DomainError::ProbeFailed {
                path: info.path,
                diagnostic: "moov atom not found".to_string(),
            });
        }
        Ok(info)
    }

    async fn probe_dimensions(&self, file_path: &Path) -> Result<Dimensions, DomainError> {
        self.lookup(file_path).map(|info| info.dimensions)
    }

    async fn probe_keyframes(
        &self,
        _file_path: &Path,
        _window: TimeSpan,
    ) -> Result<Vec<f64>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keyframes.lock().unwrap().clone())
    }
}

/// Engine that records every invocation and writes a small output file.
///
/// Stages listed in `fail_stages` write a partial file and exit non-zero.
#[derive(Default)]
pub struct StubEngine {
    invocations: Mutex<Vec<EngineInvocation>>,
    fail_stages: Vec<String>,
    delay: Option<Duration>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(stage: &str) -> Self {
        Self {
            fail_stages: vec![stage.to_string()],
            ..Self::default()
        }
    }

    /// Writes a partial file, reports progress, then hangs for `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<EngineInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    pub fn stages(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|inv| inv.stage)
            .collect()
    }
}

#[async_trait]
impl ExecutePort for StubEngine {
    async fn run(
        &self,
        invocation: &EngineInvocation,
        progress: Option<&ProgressSender>,
    ) -> Result<(), EngineFailure> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if self.fail_stages.contains(&invocation.stage) {
            let _ = std::fs::write(&invocation.output, b"partial");
            return Err(EngineFailure {
                status: Some(1),
                diagnostic: format!("{} exploded", invocation.stage),
            });
        }

        if let Some(delay) = self.delay {
            let _ = std::fs::write(&invocation.output, b"partial");
            if let Some(progress) = progress {
                progress.send(&invocation.stage, 10.0);
            }
            tokio::time::sleep(delay).await;
        }

        if let Some(progress) = progress {
            progress.send(&invocation.stage, 50.0);
            progress.send(&invocation.stage, 100.0);
        }
        std::fs::write(&invocation.output, b"encoded media").map_err(|e| EngineFailure {
            status: Some(1),
            diagnostic: e.to_string(),
        })
    }
}

/// Container over the stubs and the real local filesystem
pub fn container(probe: Arc<StubProbe>, engine: Arc<StubEngine>) -> DefaultAppContainer {
    let mut config = AppConfig::default();
    config.encoder.threads = 2;
    DefaultAppContainer::with_ports(probe, engine, Arc::new(FsLocalAdapter::new()), &config)
}

/// Value following `flag` in an argument list
pub fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).map(String::as_str)
}
