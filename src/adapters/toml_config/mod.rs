// TOML config adapter - Typed configuration file loading

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "mediaclip.toml";

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub encoder: EncoderSettings,
    pub cut: CutSection,
    pub stack: StackLayout,
    pub tools: ToolsSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutSection {
    pub mode: CutMode,
}

impl Default for CutSection {
    fn default() -> Self {
        Self {
            mode: CutMode::Auto,
        }
    }
}

/// Engine binaries, looked up on PATH unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing` filter directive, e.g. `info` or `mediaclip=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a config document
    pub fn parse(toml_content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load an explicitly named config file; it must exist
    pub fn load(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::BadArgs(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, else `mediaclip.toml` in `cwd` when present,
    /// else defaults
    pub fn load_or_default(explicit: Option<&Path>, cwd: &Path) -> Result<AppConfig, DomainError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        debug!("No config file found, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = TomlConfigAdapter::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.encoder.preset, "slow");
        assert_eq!(config.encoder.crf, 18);
        assert_eq!(config.stack.width, 720);
        assert_eq!(config.stack.half_height, 640);
        assert_eq!(config.cut.mode, CutMode::Auto);
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfigAdapter::parse(
            r#"
            [encoder]
            hwaccel = true
            crf = 23

            [cut]
            mode = "reencode"

            [tools]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
            "#,
        )
        .unwrap();
        assert!(config.encoder.hwaccel);
        assert_eq!(config.encoder.crf, 23);
        assert_eq!(config.encoder.preset, "slow");
        assert_eq!(config.cut.mode, CutMode::Reencode);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.tools.ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = TomlConfigAdapter::parse("[trimx]\nlog_level = \"info\"\n").unwrap_err();
        assert!(matches!(err, DomainError::BadArgs(_)));
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(TomlConfigAdapter::parse("[cut]\nmode = \"fast\"\n").is_err());
    }

    #[test]
    fn test_load_from_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let config = TomlConfigAdapter::load_or_default(None, dir.path()).unwrap();
        assert_eq!(config.logging.level, "debug");

        let missing = dir.path().join("nope.toml");
        assert!(TomlConfigAdapter::load_or_default(Some(&missing), dir.path()).is_err());
    }
}
