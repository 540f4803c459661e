//! Configuration initialization and hierarchy management
//!
//! Precedence, highest first: CLI flags, environment, config file, defaults.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::GeometryRules;

/// Values given on the command line; `None` leaves the lower layers in charge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub json_logs: bool,
    pub hwaccel: bool,
    pub preset: Option<String>,
    pub crf: Option<u8>,
    pub threads: Option<usize>,
    pub cut_mode: Option<CutMode>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// Build the effective configuration from every layer
pub fn initialize_configuration(overrides: &ConfigOverrides) -> Result<AppConfig, DomainError> {
    let cwd = std::env::current_dir()
        .map_err(|e| DomainError::FsFail(format!("Failed to read working directory: {}", e)))?;
    resolve_configuration(overrides, &cwd, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration`] with an explicit working directory and
/// environment lookup
pub fn resolve_configuration<F>(
    overrides: &ConfigOverrides,
    cwd: &Path,
    env: F,
) -> Result<AppConfig, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = TomlConfigAdapter::load_or_default(overrides.config_path.as_deref(), cwd)?;
    apply_environment(&mut config, env)?;
    apply_cli_overrides(&mut config, overrides);
    finalize(config)
}

/// Apply `MEDIACLIP_*` variables, plus the legacy `VIDEO_HWACCEL` switch
pub fn apply_environment<F>(config: &mut AppConfig, env: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        env(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let mut applied = 0;

    // Any non-empty value turns the hardware encoder on
    if var("VIDEO_HWACCEL").is_some() {
        config.encoder.hwaccel = true;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_HWACCEL") {
        config.encoder.hwaccel = parse_bool("MEDIACLIP_HWACCEL", &value)?;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_PRESET") {
        config.encoder.preset = value;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_CRF") {
        config.encoder.crf = value.parse().map_err(|_| {
            DomainError::BadArgs(format!("MEDIACLIP_CRF must be 0-51, got '{}'", value))
        })?;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_THREADS") {
        config.encoder.threads = value.parse().map_err(|_| {
            DomainError::BadArgs(format!(
                "MEDIACLIP_THREADS must be a non-negative integer, got '{}'",
                value
            ))
        })?;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_CUT_MODE") {
        config.cut.mode = CutMode::parse(&value)?;
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_FFMPEG") {
        config.tools.ffmpeg = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_FFPROBE") {
        config.tools.ffprobe = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = var("MEDIACLIP_LOG_LEVEL") {
        config.logging.level = value;
        applied += 1;
    }

    if applied > 0 {
        debug!("Applied {} environment overrides", applied);
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DomainError::BadArgs(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

/// Apply CLI flags on top of everything else
pub fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }
    if overrides.json_logs {
        config.logging.json = true;
    }
    if overrides.hwaccel {
        config.encoder.hwaccel = true;
    }
    if let Some(preset) = &overrides.preset {
        config.encoder.preset = preset.clone();
    }
    if let Some(crf) = overrides.crf {
        config.encoder.crf = crf;
    }
    if let Some(threads) = overrides.threads {
        config.encoder.threads = threads;
    }
    if let Some(mode) = overrides.cut_mode {
        config.cut.mode = mode;
    }
    if let Some(ffmpeg) = &overrides.ffmpeg {
        config.tools.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &overrides.ffprobe {
        config.tools.ffprobe = ffprobe.clone();
    }
}

/// Validate and fill in derived values: 0 threads means one per CPU, stack
/// panes are forced even
pub fn finalize(mut config: AppConfig) -> Result<AppConfig, DomainError> {
    config.encoder.validate()?;
    if config.encoder.threads == 0 {
        config.encoder.threads = num_cpus::get();
    }
    config.stack = GeometryRules::stack_layout(config.stack)?;
    Ok(config)
}

/// Summary of the effective configuration; call once logging is installed
pub fn log_configuration(config: &AppConfig) {
    info!(
        hwaccel = config.encoder.hwaccel,
        preset = %config.encoder.preset,
        crf = config.encoder.crf,
        threads = config.encoder.threads,
        cut_mode = %config.cut.mode,
        ffmpeg = %config.tools.ffmpeg.display(),
        "Configuration resolved"
    );
}
