// Crop interactor - Side crops and vertical splits

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::engine_run::run_engine;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::progress::ProgressSender;
use crate::engine::reencode;
use crate::ports::*;

/// Interactor for crop and split
pub struct CropInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    fs_port: Arc<dyn FsPort>,
    settings: EncoderSettings,
}

impl CropInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        fs_port: Arc<dyn FsPort>,
        settings: EncoderSettings,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            fs_port,
            settings,
        }
    }

    /// Trim `left` and `right` pixels off the frame
    pub async fn crop_sides(
        &self,
        input: &Path,
        output: &Path,
        left: u32,
        right: u32,
        progress: Option<&ProgressSender>,
    ) -> Result<CropGeometry, DomainError> {
        let source = self.probe_dimensions(input).await?;
        let geometry = GeometryRules::crop_sides(source, left, right)?;
        info!(
            "Cropping {} ({} -> {}x{})",
            input.display(),
            source,
            geometry.width,
            geometry.height
        );

        let duration = self.source_duration(input).await;
        self.encode_crop(input, output, &geometry, duration, "crop", progress)
            .await?;
        Ok(geometry)
    }

    /// Write the left half to `left_out` and the right half to `right_out`.
    ///
    /// Both halves are attempted; one failing leaves the other on disk and is
    /// recorded in the report under `left` or `right`.
    pub async fn split_vertical(
        &self,
        input: &Path,
        left_out: &Path,
        right_out: &Path,
        progress: Option<&ProgressSender>,
    ) -> Result<BatchReport, DomainError> {
        let source = self.probe_dimensions(input).await?;
        let (left, right) = GeometryRules::split_halves(source)?;
        info!(
            "Splitting {} ({}) into {}px and {}px halves",
            input.display(),
            source,
            left.width,
            right.width
        );

        let duration = self.source_duration(input).await;
        let mut report = BatchReport::new("split");
        for (side, geometry, output) in [
            (SplitSide::Left, left, left_out),
            (SplitSide::Right, right, right_out),
        ] {
            let stage = format!("split-{}", side);
            let label = side.to_string();
            match self
                .encode_crop(input, output, &geometry, duration, &stage, progress)
                .await
            {
                Ok(()) => report.push(ItemOutcome::success(label, output)),
                Err(e) => {
                    warn!("{} half of {} failed: {}", side, input.display(), e);
                    report.push(ItemOutcome::failure(label, output, e));
                }
            }
        }
        Ok(report)
    }

    async fn probe_dimensions(&self, input: &Path) -> Result<Dimensions, DomainError> {
        if !self.fs_port.file_exists(input).await? {
            return Err(DomainError::FsFail(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }
        self.probe_port.probe_dimensions(input).await
    }

    /// Duration for progress percentages only
    async fn source_duration(&self, input: &Path) -> Option<f64> {
        match self.probe_port.probe_media(input).await {
            Ok(info) => Some(info.duration),
            Err(e) => {
                warn!("Duration unknown, progress will not show percentages: {}", e);
                None
            }
        }
    }

    async fn encode_crop(
        &self,
        input: &Path,
        output: &Path,
        geometry: &CropGeometry,
        duration: Option<f64>,
        stage: &str,
        progress: Option<&ProgressSender>,
    ) -> Result<(), DomainError> {
        let args = reencode::crop(input, output, geometry, &self.settings);
        let mut invocation = EngineInvocation::new(stage, args, output);
        if let Some(duration) = duration {
            invocation = invocation.with_expected_duration(duration);
        }

        run_engine(
            self.execute_port.as_ref(),
            self.fs_port.as_ref(),
            &invocation,
            progress,
        )
        .await
        .map_err(|failure| DomainError::EncodeFailed {
            output: output.display().to_string(),
            diagnostic: failure.to_string(),
        })?;
        info!("Crop written to {}", output.display());
        Ok(())
    }
}
