// Stack interactor - Two sources composited top and bottom

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::app::engine_run::run_engine;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::compose;
use crate::engine::progress::ProgressSender;
use crate::ports::*;

/// Result of a successful stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackOutcome {
    pub output: PathBuf,
    /// Length of the output; the longer source's duration
    pub duration: f64,
    pub canvas: Dimensions,
    pub has_audio: bool,
}

/// Interactor for the vertical stack pipeline
pub struct StackInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    fs_port: Arc<dyn FsPort>,
    settings: EncoderSettings,
    layout: StackLayout,
}

impl StackInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        fs_port: Arc<dyn FsPort>,
        settings: EncoderSettings,
        layout: StackLayout,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            fs_port,
            settings,
            layout,
        }
    }

    /// Resize both sources, loop the shorter one, composite them and encode
    /// with the audio of the chosen source.
    ///
    /// Each stage reports its own error: [`DomainError::ResizeFailed`] naming
    /// the source, [`DomainError::CompositeFailed`] or
    /// [`DomainError::EncodeFailed`].
    pub async fn stack_vertical(
        &self,
        top: &Path,
        bottom: &Path,
        output: &Path,
        use_top_audio: bool,
        progress: Option<&ProgressSender>,
    ) -> Result<StackOutcome, DomainError> {
        let top_info = self.probe_source(top).await?;
        let bottom_info = self.probe_source(bottom).await?;
        let duration = top_info.duration.max(bottom_info.duration);

        let (audio_label, audio_path, audio_info) = if use_top_audio {
            (StackSource::Top, top, &top_info)
        } else {
            (StackSource::Bottom, bottom, &bottom_info)
        };
        let audio_source = audio_info.has_audio().then_some(audio_path);
        if audio_source.is_none() {
            warn!("{} source has no audio; output will be silent", audio_label);
        }

        let scratch = tempfile::Builder::new()
            .prefix("mediaclip-stack-")
            .tempdir()
            .map_err(|e| DomainError::FsFail(format!("Failed to create scratch directory: {}", e)))?;
        let top_pane = scratch.path().join("top.mkv");
        let bottom_pane = scratch.path().join("bottom.mkv");
        let composite = scratch.path().join("composite.mkv");

        info!(
            "Stacking {} over {} on a {} canvas, {:.3}s",
            top.display(),
            bottom.display(),
            self.layout.canvas(),
            duration
        );

        for (label, source, pane, info) in [
            (StackSource::Top, top, &top_pane, &top_info),
            (StackSource::Bottom, bottom, &bottom_pane, &bottom_info),
        ] {
            let invocation = EngineInvocation::new(
                format!("resize-{}", label),
                compose::resize_pane(source, pane, &self.layout),
                pane,
            )
            .with_expected_duration(info.duration);
            self.run(&invocation, progress)
                .await
                .map_err(|diagnostic| DomainError::ResizeFailed {
                    source_label: label.to_string(),
                    diagnostic,
                })?;
        }

        let invocation = EngineInvocation::new(
            "composite",
            compose::composite(&top_pane, &bottom_pane, &composite, duration),
            &composite,
        )
        .with_expected_duration(duration);
        self.run(&invocation, progress)
            .await
            .map_err(|diagnostic| DomainError::CompositeFailed { diagnostic })?;

        let invocation = EngineInvocation::new(
            "encode",
            compose::mux_encode(&composite, audio_source, output, duration, &self.settings),
            output,
        )
        .with_expected_duration(duration);
        self.run(&invocation, progress)
            .await
            .map_err(|diagnostic| DomainError::EncodeFailed {
                output: output.display().to_string(),
                diagnostic,
            })?;

        info!("Stack written to {}", output.display());
        Ok(StackOutcome {
            output: output.to_path_buf(),
            duration,
            canvas: self.layout.canvas(),
            has_audio: audio_source.is_some(),
        })
    }

    async fn probe_source(&self, input: &Path) -> Result<MediaInfo, DomainError> {
        if !self.fs_port.file_exists(input).await? {
            return Err(DomainError::FsFail(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }
        self.probe_port.probe_media(input).await
    }

    async fn run(
        &self,
        invocation: &EngineInvocation,
        progress: Option<&ProgressSender>,
    ) -> Result<(), String> {
        run_engine(
            self.execute_port.as_ref(),
            self.fs_port.as_ref(),
            invocation,
            progress,
        )
        .await
        .map_err(|failure| failure.to_string())
    }
}
