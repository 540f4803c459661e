//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::model::{CutMode, Platform};

fn parse_mode(s: &str) -> Result<CutMode, String> {
    CutMode::parse(s).map_err(|e| e.to_string())
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::parse(s).map_err(|e| e.to_string())
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (HH:MM:SS[.f], MM:SS[.f] or seconds)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM:SS[.f], MM:SS[.f] or seconds)
    #[arg(short, long)]
    pub end: String,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Cut strategy: auto, copy or reencode
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<CutMode>,
}

/// Arguments for the cut-list command
#[derive(Args, Debug)]
pub struct CutListArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Text file with one `START to END` range per line
    #[arg(short, long)]
    pub list: PathBuf,

    /// Directory receiving cut_<n> files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<CutMode>,
}

/// Arguments for the fanout command
#[derive(Args, Debug)]
pub struct FanoutArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub start: String,

    #[arg(short, long)]
    pub end: String,

    /// Root of the dated platform directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Date directory (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Platform to publish for; repeat for several (default: all)
    #[arg(long = "platform", value_parser = parse_platform)]
    pub platforms: Vec<Platform>,

    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<CutMode>,
}

/// Arguments for the crop command
#[derive(Args, Debug)]
pub struct CropArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Pixels removed from the left edge
    #[arg(long, default_value_t = 0)]
    pub left: u32,

    /// Pixels removed from the right edge
    #[arg(long, default_value_t = 0)]
    pub right: u32,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output for the left half
    #[arg(long)]
    pub left_out: PathBuf,

    /// Output for the right half
    #[arg(long)]
    pub right_out: PathBuf,
}

/// Which stack source provides the audio
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFrom {
    Top,
    Bottom,
}

/// Arguments for the stack command
#[derive(Args, Debug)]
pub struct StackArgs {
    /// Video placed in the upper half
    #[arg(long)]
    pub top: PathBuf,

    /// Video placed in the lower half
    #[arg(long)]
    pub bottom: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Source of the audio track
    #[arg(long, value_enum, default_value_t = AudioFrom::Top)]
    pub audio: AudioFrom,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Print only WIDTHxHEIGHT
    #[arg(long, conflicts_with = "json")]
    pub dimensions: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// File to check
    #[arg(short, long)]
    pub input: PathBuf,

    /// Expected duration (HH:MM:SS[.f], MM:SS[.f] or seconds)
    #[arg(short, long)]
    pub duration: String,

    /// Allowed difference in seconds
    #[arg(long, default_value_t = crate::app::verify_interactor::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}
