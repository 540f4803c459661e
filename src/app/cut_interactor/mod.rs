// Cut interactor - Orchestrates time-range extraction

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::app::engine_run::run_engine;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::progress::ProgressSender;
use crate::engine::{copy, reencode};
use crate::ports::*;

/// Result of one successful cut
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutOutcome {
    pub output: PathBuf,
    pub span: TimeSpan,
    pub strategy: CutStrategy,
}

/// Interactor for the cut use cases
pub struct CutInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    fs_port: Arc<dyn FsPort>,
    settings: EncoderSettings,
    mode: CutMode,
}

impl CutInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        fs_port: Arc<dyn FsPort>,
        settings: EncoderSettings,
        mode: CutMode,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            fs_port,
            settings,
            mode,
        }
    }

    /// Cut between two timestamps; ordering is checked before anything runs
    pub async fn cut_between(
        &self,
        input: &Path,
        output: &Path,
        start: TimeSpec,
        end: TimeSpec,
        progress: Option<&ProgressSender>,
    ) -> Result<CutOutcome, DomainError> {
        let span = TimeSpan::new(start.as_seconds(), end.as_seconds())?;
        self.cut_range(input, output, span, progress).await
    }

    /// Extract `span` from `input` into `output`
    pub async fn cut_range(
        &self,
        input: &Path,
        output: &Path,
        span: TimeSpan,
        progress: Option<&ProgressSender>,
    ) -> Result<CutOutcome, DomainError> {
        span.validate()?;
        info!("Cutting {} [{}] -> {}", input.display(), span, output.display());
        let media_info = self.probe_source(input).await?;
        span.validate_against_duration(media_info.duration)?;
        self.cut_probed(input, output, span, &media_info, "cut", progress)
            .await
    }

    /// Cut every line of a `START to END` list into `out_dir/cut_<n>.<ext>`.
    ///
    /// A bad line or a failed encode is recorded and the rest of the list
    /// still runs.
    pub async fn cut_list(
        &self,
        input: &Path,
        list_text: &str,
        out_dir: &Path,
        progress: Option<&ProgressSender>,
    ) -> Result<BatchReport, DomainError> {
        let entries = parse_cut_list(list_text);
        if entries.is_empty() {
            return Err(DomainError::BadArgs("cut list has no entries".to_string()));
        }
        let media_info = self.probe_source(input).await?;
        self.fs_port.create_directory(out_dir).await?;

        let mut report = BatchReport::new("cut list");
        for entry in entries {
            let label = format!("cut_{}", entry.index);
            let output = OutputRules::cut_list_output(out_dir, entry.index, input);
            let span = entry
                .span
                .and_then(|span| span.validate_against_duration(media_info.duration).map(|_| span));
            let result = match span {
                Ok(span) => self
                    .cut_probed(input, &output, span, &media_info, &label, progress)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => report.push(ItemOutcome::success(label, output)),
                Err(e) => {
                    if e.is_validation() {
                        warn!("Skipping cut list line {} ('{}'): {}", entry.index, entry.line, e);
                    } else {
                        error!("Cut list line {} ('{}') failed: {}", entry.index, entry.line, e);
                    }
                    report.push(ItemOutcome::failure(label, output, e));
                }
            }
        }

        info!(
            "Cut list finished: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        Ok(report)
    }

    /// Cut once and place a copy under `<root>/<date>/<platform>/` for each
    /// platform
    pub async fn cut_for_platforms(
        &self,
        input: &Path,
        span: TimeSpan,
        root: &Path,
        date: NaiveDate,
        platforms: &[Platform],
        progress: Option<&ProgressSender>,
    ) -> Result<BatchReport, DomainError> {
        let (first, rest) = platforms
            .split_first()
            .ok_or_else(|| DomainError::BadArgs("no platforms selected".to_string()))?;
        span.validate()?;

        let media_info = self.probe_source(input).await?;
        span.validate_against_duration(media_info.duration)?;

        let mut report = BatchReport::new("platform fan-out");
        let primary = OutputRules::platform_output(root, date, *first, input);
        let encoded = match self
            .fs_port
            .create_directory(&OutputRules::platform_dir(root, date, *first))
            .await
        {
            Ok(()) => {
                self.cut_probed(input, &primary, span, &media_info, "cut", progress)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = encoded {
            for platform in platforms {
                let output = OutputRules::platform_output(root, date, *platform, input);
                report.push(ItemOutcome::failure(platform.dir_name(), output, e.clone()));
            }
            return Ok(report);
        }
        report.push(ItemOutcome::success(first.dir_name(), &primary));

        for platform in rest {
            let output = OutputRules::platform_output(root, date, *platform, input);
            let copied = match self
                .fs_port
                .create_directory(&OutputRules::platform_dir(root, date, *platform))
                .await
            {
                Ok(()) => self.fs_port.copy_file(&primary, &output).await,
                Err(e) => Err(e),
            };
            match copied {
                Ok(()) => {
                    info!("Copied cut to {}", output.display());
                    report.push(ItemOutcome::success(platform.dir_name(), output));
                }
                Err(e) => {
                    warn!("Failed to place cut for {}: {}", platform, e);
                    report.push(ItemOutcome::failure(platform.dir_name(), output, e));
                }
            }
        }
        Ok(report)
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

    /// Cut with the source already probed and the span already validated
    async fn cut_probed(
        &self,
        input: &Path,
        output: &Path,
        span: TimeSpan,
        media_info: &MediaInfo,
        stage: &str,
        progress: Option<&ProgressSender>,
    ) -> Result<CutOutcome, DomainError> {
        let strategy = self.select_strategy(input, output, &span, media_info).await;
        info!("Cut strategy for {}: {:?}", output.display(), strategy);

        let args = match strategy {
            CutStrategy::StreamCopy => copy::stream_copy_cut(input, output, &span),
            CutStrategy::Reencode => reencode::reencode_cut(input, output, &span, &self.settings),
        };
        let invocation =
            EngineInvocation::new(stage, args, output).with_expected_duration(span.duration());

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

        info!("Cut written to {}", output.display());
        Ok(CutOutcome {
            output: output.to_path_buf(),
            span,
            strategy,
        })
    }

    async fn select_strategy(
        &self,
        input: &Path,
        output: &Path,
        span: &TimeSpan,
        media_info: &MediaInfo,
    ) -> CutStrategy {
        let keyframes = match self.mode {
            CutMode::Auto if CutStrategySelector::copy_compatible(media_info, input, output) => {
                let window = TimeSpan {
                    start: span.start,
                    end: span.start + media_info.frame_duration(),
                };
                match self.probe_port.probe_keyframes(input, window).await {
                    Ok(keyframes) => keyframes,
                    Err(e) => {
                        warn!("Keyframe probe failed, re-encoding: {}", e);
                        return CutStrategy::Reencode;
                    }
                }
            }
            _ => Vec::new(),
        };

        let strategy =
            CutStrategySelector::select(self.mode, media_info, span, &keyframes, input, output);
        if self.mode == CutMode::Copy && span.start > 0.0 {
            warn!(
                "Stream copy forced; the cut starts at the keyframe at or before {:.3}s",
                span.start
            );
        }
        strategy
    }
}
