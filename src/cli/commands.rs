//! Command implementations

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{init_logging, AppConfig};
use crate::app::inspect_interactor::{format_as_json, format_as_text};
use crate::app::{AppContainer, DefaultAppContainer, JobOutput};
use crate::cli::{args::*, Cli, Commands};
use crate::config_initialization::{initialize_configuration, log_configuration};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::job::{spawn_job, JobHandle};
use crate::engine::progress::ProgressUpdate;

/// Resolve configuration, set up logging and run the selected command
pub async fn run(cli: Cli) -> Result<()> {
    let config = initialize_configuration(&cli.config_overrides())
        .context("Failed to load configuration")?;
    init_logging(&config.logging.level, config.logging.json)
        .context("Failed to initialize logging")?;
    log_configuration(&config);

    let container = DefaultAppContainer::new(&config);
    match cli.command {
        Commands::Cut(args) => cut(&container, args).await,
        Commands::CutList(args) => cut_list(&container, args).await,
        Commands::Fanout(args) => fanout(&container, args).await,
        Commands::Crop(args) => crop(&container, args).await,
        Commands::Split(args) => split(&container, args).await,
        Commands::Stack(args) => stack(&container, &config, args).await,
        Commands::Probe(args) => probe(&container, args).await,
        Commands::Verify(args) => verify(&container, args).await,
    }
}

/// Execute the cut command
async fn cut(container: &DefaultAppContainer, args: CutArgs) -> Result<()> {
    let span = TimeSpan::parse(&args.start, &args.end).context("Invalid time range")?;
    let job = MediaJob::new(&args.input, &args.output, JobOperation::Cut(span));
    info!("Starting {}", job.describe());

    if let JobOutput::Cut(outcome) = drive(container.execute_job(job)).await? {
        println!(
            "{} ({}, {:?})",
            outcome.output.display(),
            format_seconds(outcome.span.duration()),
            outcome.strategy
        );
    }
    Ok(())
}

async fn cut_list(container: &DefaultAppContainer, args: CutListArgs) -> Result<()> {
    let list = tokio::fs::read_to_string(&args.list)
        .await
        .with_context(|| format!("Failed to read cut list {}", args.list.display()))?;

    let interactor = container.cut_interactor();
    let CutListArgs { input, out_dir, .. } = args;
    let handle = spawn_job(move |progress| async move {
        interactor
            .cut_list(&input, &list, &out_dir, Some(&progress))
            .await
    });
    finish_batch(drive(handle).await?)
}

async fn fanout(container: &DefaultAppContainer, args: FanoutArgs) -> Result<()> {
    let span = TimeSpan::parse(&args.start, &args.end).context("Invalid time range")?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let platforms = if args.platforms.is_empty() {
        Platform::ALL.to_vec()
    } else {
        args.platforms
    };

    let interactor = container.cut_interactor();
    let FanoutArgs { input, root, .. } = args;
    let handle = spawn_job(move |progress| async move {
        interactor
            .cut_for_platforms(&input, span, &root, date, &platforms, Some(&progress))
            .await
    });
    finish_batch(drive(handle).await?)
}

async fn crop(container: &DefaultAppContainer, args: CropArgs) -> Result<()> {
    let job = MediaJob::new(
        &args.input,
        &args.output,
        JobOperation::CropSides {
            left: args.left,
            right: args.right,
        },
    );
    info!("Starting {}", job.describe());

    if let JobOutput::Cropped { output, geometry } = drive(container.execute_job(job)).await? {
        println!("{} ({}x{})", output.display(), geometry.width, geometry.height);
    }
    Ok(())
}

async fn split(container: &DefaultAppContainer, args: SplitArgs) -> Result<()> {
    let job = MediaJob::new(
        &args.input,
        &args.left_out,
        JobOperation::SplitVertical {
            right_output: args.right_out.clone(),
        },
    );
    info!("Starting {}", job.describe());

    match drive(container.execute_job(job)).await? {
        JobOutput::Split(report) => finish_batch(report),
        _ => Ok(()),
    }
}

async fn stack(container: &DefaultAppContainer, config: &AppConfig, args: StackArgs) -> Result<()> {
    let job = MediaJob::new(
        &args.top,
        &args.output,
        JobOperation::StackVertical {
            bottom_input: args.bottom.clone(),
            use_top_audio: args.audio == AudioFrom::Top,
        },
    );
    info!("Starting {} on a {} canvas", job.describe(), config.stack.canvas());

    if let JobOutput::Stacked(outcome) = drive(container.execute_job(job)).await? {
        println!(
            "{} ({}, {}{})",
            outcome.output.display(),
            outcome.canvas,
            format_seconds(outcome.duration),
            if outcome.has_audio { "" } else { ", no audio" }
        );
    }
    Ok(())
}

/// Execute the probe command
async fn probe(container: &DefaultAppContainer, args: ProbeArgs) -> Result<()> {
    let inspector = container.inspect_interactor();
    if args.dimensions {
        println!("{}", inspector.dimensions(&args.input).await?);
        return Ok(());
    }

    let media_info = inspector.inspect(&args.input).await?;
    if args.json {
        println!("{}", format_as_json(&media_info)?);
    } else {
        print!("{}", format_as_text(&media_info));
    }
    Ok(())
}

/// Execute the verify command
async fn verify(container: &DefaultAppContainer, args: VerifyArgs) -> Result<()> {
    let expected = TimeSpec::parse(&args.duration).context("Invalid expected duration")?;
    let report = container
        .verify_interactor()
        .verify_duration(&args.input, expected.as_seconds(), args.tolerance)
        .await?;

    println!(
        "{}: {:.3}s (expected {:.3}s, difference {:.3}s)",
        report.path.display(),
        report.actual,
        report.expected,
        report.difference()
    );
    if !report.passed() {
        anyhow::bail!(
            "verification failed: difference {:.3}s exceeds tolerance {:.3}s",
            report.difference(),
            report.tolerance
        );
    }
    Ok(())
}

/// Render a job's progress on stderr and return its result
async fn drive<T>(handle: JobHandle<T>) -> Result<T, DomainError> {
    let mut renderer = ProgressRenderer::default();
    let result = handle.drive(|update| renderer.render(update)).await;
    renderer.finish();
    result
}

/// Print one line per item, then fail if any item failed
fn finish_batch(report: BatchReport) -> Result<()> {
    for item in &report.items {
        match &item.error {
            None => println!("ok     {} -> {}", item.label, item.output.display()),
            Some(e) => println!("failed {}: {}", item.label, e),
        }
    }
    report.into_result()?;
    Ok(())
}

/// Single-line progress display on stderr
#[derive(Default)]
struct ProgressRenderer {
    stage: Option<String>,
}

impl ProgressRenderer {
    fn render(&mut self, update: &ProgressUpdate) {
        let mut stderr = std::io::stderr().lock();
        if self.stage.as_deref() != Some(update.stage.as_str()) {
            if self.stage.is_some() {
                let _ = writeln!(stderr);
            }
            self.stage = Some(update.stage.clone());
        }
        let _ = write!(stderr, "\r{:<14} {:>5.1}%", update.stage, update.percent);
        let _ = stderr.flush();
    }

    fn finish(&mut self) {
        if self.stage.take().is_some() {
            let _ = writeln!(std::io::stderr());
        }
    }
}
