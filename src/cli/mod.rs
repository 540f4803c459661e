//! CLI module for MediaClip
//!
//! Argument parsing and presentation. All mutable UI state (progress lines,
//! report printing) lives here; the interactors never see it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

pub use args::*;

/// MediaClip video tool
///
/// Cut, crop, split and stack video files by driving ffmpeg with
/// pre-computed parameters.
#[derive(Parser, Debug)]
#[command(name = "mediaclip")]
#[command(about = "Cut, crop, split and stack video files")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./mediaclip.toml when present)
    #[arg(long, env = "MEDIACLIP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `mediaclip=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Use the hardware H.264 encoder
    #[arg(long, global = true)]
    pub hwaccel: bool,

    /// Encoder preset
    #[arg(long, global = true)]
    pub preset: Option<String>,

    /// Constant rate factor (0-51)
    #[arg(long, global = true, value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// Encoder threads (0 = one per CPU)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract a time range from a video file
    Cut(CutArgs),
    /// Cut every range listed in a text file
    CutList(CutListArgs),
    /// Cut once and file a copy per publishing platform
    Fanout(FanoutArgs),
    /// Trim pixels off the left and right edges
    Crop(CropArgs),
    /// Split a video into left and right halves
    Split(SplitArgs),
    /// Stack two videos top and bottom
    Stack(StackArgs),
    /// Show container and stream information
    Probe(ProbeArgs),
    /// Check a file's duration against an expected value
    Verify(VerifyArgs),
}

fn parse_crf(s: &str) -> Result<u8, String> {
    clap_num::number_range(s, 0, 51)
}

impl Cli {
    /// Flags that take part in configuration resolution
    pub fn config_overrides(&self) -> ConfigOverrides {
        let cut_mode = match &self.command {
            Commands::Cut(args) => args.mode,
            Commands::CutList(args) => args.mode,
            Commands::Fanout(args) => args.mode,
            _ => None,
        };
        ConfigOverrides {
            config_path: self.config.clone(),
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
            hwaccel: self.hwaccel,
            preset: self.preset.clone(),
            crf: self.crf,
            threads: self.threads,
            cut_mode,
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CutMode;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mediaclip", "cut", "-i", "in.mp4", "-s", "10", "-e", "20", "-o", "out.mp4",
            "--mode", "copy", "--crf", "23", "--hwaccel",
        ])
        .unwrap();
        let overrides = cli.config_overrides();
        assert_eq!(overrides.crf, Some(23));
        assert!(overrides.hwaccel);
        assert_eq!(overrides.cut_mode, Some(CutMode::Copy));
    }

    #[test]
    fn test_crf_out_of_range_rejected() {
        let result = Cli::try_parse_from(["mediaclip", "--crf", "52", "probe", "-i", "in.mp4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_mode_rejected() {
        let result = Cli::try_parse_from([
            "mediaclip", "cut", "-i", "in.mp4", "-s", "0", "-e", "1", "-o", "o.mp4", "--mode",
            "fast",
        ]);
        assert!(result.is_err());
    }
}
