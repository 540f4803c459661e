use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{AppConfig, FFmpegAdapter, FFprobeAdapter, FsLocalAdapter};
use crate::app::{
    crop_interactor::CropInteractor,
    cut_interactor::{CutInteractor, CutOutcome},
    inspect_interactor::InspectInteractor,
    stack_interactor::{StackInteractor, StackOutcome},
    verify_interactor::VerifyInteractor,
};
use crate::domain::model::*;
use crate::engine::job::{spawn_job, JobHandle};
use crate::ports::{ExecutePort, FsPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn cut_interactor(&self) -> Arc<CutInteractor>;
    fn crop_interactor(&self) -> Arc<CropInteractor>;
    fn stack_interactor(&self) -> Arc<StackInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn verify_interactor(&self) -> Arc<VerifyInteractor>;
}

/// Final value of a [`MediaJob`]
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    Cut(CutOutcome),
    Cropped { output: PathBuf, geometry: CropGeometry },
    Split(BatchReport),
    Stacked(StackOutcome),
}

pub struct DefaultAppContainer {
    cut_interactor: Arc<CutInteractor>,
    crop_interactor: Arc<CropInteractor>,
    stack_interactor: Arc<StackInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
    verify_interactor: Arc<VerifyInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg/ffprobe adapters named in `config`
    pub fn new(config: &AppConfig) -> Self {
        let probe_port = Arc::new(FFprobeAdapter::new(&config.tools.ffprobe));
        let execute_port = Arc::new(FFmpegAdapter::new(&config.tools.ffmpeg));
        let fs_port = Arc::new(FsLocalAdapter::new());
        Self::with_ports(probe_port, execute_port, fs_port, config)
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        fs_port: Arc<dyn FsPort>,
        config: &AppConfig,
    ) -> Self {
        let cut_interactor = Arc::new(CutInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            Arc::clone(&fs_port),
            config.encoder.clone(),
            config.cut.mode,
        ));

        let crop_interactor = Arc::new(CropInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            Arc::clone(&fs_port),
            config.encoder.clone(),
        ));

        let stack_interactor = Arc::new(StackInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            Arc::clone(&fs_port),
            config.encoder.clone(),
            config.stack,
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&fs_port),
        ));

        let verify_interactor = Arc::new(VerifyInteractor::new(probe_port, fs_port));

        Self {
            cut_interactor,
            crop_interactor,
            stack_interactor,
            inspect_interactor,
            verify_interactor,
        }
    }

    /// Run `job` in the background; the handle yields its progress and result
    pub fn execute_job(&self, job: MediaJob) -> JobHandle<JobOutput> {
        let cut = self.cut_interactor();
        let crop = self.crop_interactor();
        let stack = self.stack_interactor();
        debug!(outputs = ?job.outputs(), "Queued {}", job.describe());

        spawn_job(move |progress| async move {
            let progress = Some(&progress);
            let MediaJob {
                input_path,
                output_path,
                operation,
            } = job;
            match operation {
                JobOperation::Cut(span) => cut
                    .cut_range(&input_path, &output_path, span, progress)
                    .await
                    .map(JobOutput::Cut),
                JobOperation::CropSides { left, right } => crop
                    .crop_sides(&input_path, &output_path, left, right, progress)
                    .await
                    .map(|geometry| JobOutput::Cropped {
                        output: output_path.clone(),
                        geometry,
                    }),
                JobOperation::SplitVertical { right_output } => crop
                    .split_vertical(&input_path, &output_path, &right_output, progress)
                    .await
                    .map(JobOutput::Split),
                JobOperation::StackVertical {
                    bottom_input,
                    use_top_audio,
                } => stack
                    .stack_vertical(
                        &input_path,
                        &bottom_input,
                        &output_path,
                        use_top_audio,
                        progress,
                    )
                    .await
                    .map(JobOutput::Stacked),
            }
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn cut_interactor(&self) -> Arc<CutInteractor> {
        Arc::clone(&self.cut_interactor)
    }

    fn crop_interactor(&self) -> Arc<CropInteractor> {
        Arc::clone(&self.crop_interactor)
    }

    fn stack_interactor(&self) -> Arc<StackInteractor> {
        Arc::clone(&self.stack_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn verify_interactor(&self) -> Arc<VerifyInteractor> {
        Arc::clone(&self.verify_interactor)
    }
}
