// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse `SS[.f]`, `MM:SS[.f]` or `HH:MM:SS[.f]`.
    ///
    /// Hours and minutes must be whole non-negative numbers; only the seconds
    /// component may carry a fraction. Components are not range-checked, so
    /// `0:90` is 90 seconds.
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_format(time_str, "empty timestamp"));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() > 3 {
            return Err(DomainError::invalid_format(
                time_str,
                format!("expected 1 to 3 components, found {}", parts.len()),
            ));
        }

        let (whole, last) = parts.split_at(parts.len() - 1);
        let seconds = parse_seconds_component(time_str, last[0])?;

        // Walk hours/minutes from the right: minutes weigh 60, hours 3600
        let mut total = seconds;
        let mut weight = 60.0;
        for component in whole.iter().rev() {
            let value = parse_whole_component(time_str, component)?;
            total += value as f64 * weight;
            weight *= 60.0;
        }

        Ok(Self::from_seconds(total))
    }

    /// Format as zero-padded `HH:MM:SS`, dropping any sub-second part
    pub fn format_hms(&self) -> String {
        format_seconds(self.seconds)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

fn parse_whole_component(input: &str, component: &str) -> Result<u64, DomainError> {
    let component = component.trim();
    if component.is_empty() || !component.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::invalid_format(
            input,
            format!("'{}' is not a whole non-negative number", component),
        ));
    }
    component
        .parse::<u64>()
        .map_err(|e| DomainError::invalid_format(input, e.to_string()))
}

fn parse_seconds_component(input: &str, component: &str) -> Result<f64, DomainError> {
    let component = component.trim();
    let well_formed = !component.is_empty()
        && component.chars().all(|c| c.is_ascii_digit() || c == '.')
        && component.matches('.').count() <= 1
        && component.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(DomainError::invalid_format(
            input,
            format!("'{}' is not a non-negative number of seconds", component),
        ));
    }
    component
        .parse::<f64>()
        .map_err(|e| DomainError::invalid_format(input, e.to_string()))
}

/// Format seconds as `HH:MM:SS`. Negative and non-finite input formats as zero.
pub fn format_seconds(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Half-open time range `[start, end)` in seconds.
///
/// The fields are public, so spans built by hand are re-checked with
/// [`TimeSpan::validate`] before any engine work. Deserialization goes through
/// [`TimeSpan::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpanBounds")]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

#[derive(Deserialize)]
struct SpanBounds {
    start: f64,
    end: f64,
}

impl TryFrom<SpanBounds> for TimeSpan {
    type Error = DomainError;

    fn try_from(bounds: SpanBounds) -> Result<Self, Self::Error> {
        TimeSpan::new(bounds.start, bounds.end)
    }
}

impl TimeSpan {
    /// Create a span, rejecting negative starts and empty or reversed ranges
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        let span = Self { start, end };
        span.validate()?;
        Ok(span)
    }

    /// Bounds are finite, start is non-negative and strictly before end
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(DomainError::out_of_bounds("span bounds must be finite"));
        }
        if self.start < 0.0 {
            return Err(DomainError::out_of_bounds(format!(
                "start {:.3}s is negative",
                self.start
            )));
        }
        if self.end <= self.start {
            return Err(DomainError::out_of_bounds(format!(
                "start {:.3}s must be before end {:.3}s",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Parse both ends with [`TimeSpec::parse`]
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let start = TimeSpec::parse(start)?;
        let end = TimeSpec::parse(end)?;
        Self::new(start.seconds, end.seconds)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// [`TimeSpan::validate`], then reject spans that run past the end of
    /// the source
    pub fn validate_against_duration(&self, media_duration: f64) -> Result<(), DomainError> {
        self.validate()?;
        // Containers report durations rounded to the millisecond
        const DURATION_SLACK: f64 = 1e-3;
        if self.end > media_duration + DURATION_SLACK {
            return Err(DomainError::out_of_bounds(format!(
                "end {:.3}s exceeds source duration {:.3}s",
                self.end, media_duration
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s-{:.3}s", self.start, self.end)
    }
}

/// Frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Crop rectangle anchored at `left` on the x axis and 0 on the y axis.
///
/// `width` and `height` are the resulting frame size; both are even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropGeometry {
    pub left: u32,
    pub right: u32,
    pub width: u32,
    pub height: u32,
}

impl CropGeometry {
    /// ffmpeg `crop` filter expression
    pub fn filter(&self) -> String {
        format!("crop={}:{}:{}:0", self.width, self.height, self.left)
    }
}

/// How a cut should be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Stream-copy when the boundaries allow it, else re-encode
    Auto,
    Copy,
    Reencode,
}

impl CutMode {
    pub fn parse(mode_str: &str) -> Result<Self, DomainError> {
        match mode_str.trim().to_lowercase().as_str() {
            "auto" => Ok(CutMode::Auto),
            "copy" => Ok(CutMode::Copy),
            "reencode" | "re-encode" => Ok(CutMode::Reencode),
            other => Err(DomainError::BadArgs(format!(
                "Invalid cut mode: {}. Valid modes: auto, copy, reencode",
                other
            ))),
        }
    }
}

impl fmt::Display for CutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CutMode::Auto => "auto",
            CutMode::Copy => "copy",
            CutMode::Reencode => "reencode",
        };
        f.write_str(name)
    }
}

/// Strategy actually used for a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CutStrategy {
    StreamCopy,
    Reencode,
}

/// Video encoder selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoEncoder {
    Libx264,
    H264Nvenc,
    LibvpxVp9,
}

impl VideoEncoder {
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            VideoEncoder::Libx264 => "libx264",
            VideoEncoder::H264Nvenc => "h264_nvenc",
            VideoEncoder::LibvpxVp9 => "libvpx-vp9",
        }
    }
}

/// Audio encoder selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioEncoder {
    Aac,
    Libvorbis,
    Copy,
}

impl AudioEncoder {
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            AudioEncoder::Aac => "aac",
            AudioEncoder::Libvorbis => "libvorbis",
            AudioEncoder::Copy => "copy",
        }
    }
}

/// Encoder knobs recognized from the environment and config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Use the hardware H.264 encoder instead of libx264
    pub hwaccel: bool,
    pub preset: String,
    /// Constant rate factor, 0-51
    pub crf: u8,
    /// Encoder threads; 0 leaves the choice to the engine
    pub threads: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            hwaccel: false,
            preset: "slow".to_string(),
            crf: 18,
            threads: 0,
        }
    }
}

impl EncoderSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.crf > 51 {
            return Err(DomainError::BadArgs(format!(
                "CRF value {} cannot exceed 51",
                self.crf
            )));
        }
        if self.preset.trim().is_empty() {
            return Err(DomainError::BadArgs("Preset cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Output canvas for the vertical stack: two `width x half_height` panes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackLayout {
    pub width: u32,
    pub half_height: u32,
}

impl Default for StackLayout {
    fn default() -> Self {
        // 720x1280 portrait canvas
        Self {
            width: 720,
            half_height: 640,
        }
    }
}

impl StackLayout {
    pub fn canvas(&self) -> Dimensions {
        Dimensions::new(self.width, self.half_height * 2)
    }
}

/// Label for one output of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSide {
    Left,
    Right,
}

impl fmt::Display for SplitSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitSide::Left => f.write_str("left"),
            SplitSide::Right => f.write_str("right"),
        }
    }
}

/// Label for one input of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSource {
    Top,
    Bottom,
}

impl fmt::Display for StackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackSource::Top => f.write_str("top"),
            StackSource::Bottom => f.write_str("bottom"),
        }
    }
}

/// Publishing platforms that get their own output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    YouTube,
    TikTok,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::TikTok, Platform::Instagram];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.trim().to_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "tiktok" => Ok(Platform::TikTok),
            "instagram" => Ok(Platform::Instagram),
            other => Err(DomainError::BadArgs(format!(
                "Unknown platform: {}. Valid platforms: youtube, tiktok, instagram",
                other
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// What a job does to its source
#[derive(Debug, Clone, PartialEq)]
pub enum JobOperation {
    Cut(TimeSpan),
    /// Pixels trimmed from the left and right edges
    CropSides { left: u32, right: u32 },
    /// `output_path` receives the left half
    SplitVertical { right_output: PathBuf },
    /// `input_path` is the top source
    StackVertical {
        bottom_input: PathBuf,
        use_top_audio: bool,
    },
}

/// One user-triggered action, consumed once
#[derive(Debug, Clone, PartialEq)]
pub struct MediaJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub operation: JobOperation,
}

impl MediaJob {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        operation: JobOperation,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            operation,
        }
    }

    /// Every file the job may write
    pub fn outputs(&self) -> Vec<&Path> {
        match &self.operation {
            JobOperation::SplitVertical { right_output } => {
                vec![self.output_path.as_path(), right_output.as_path()]
            }
            _ => vec![self.output_path.as_path()],
        }
    }

    pub fn describe(&self) -> String {
        match &self.operation {
            JobOperation::Cut(span) => format!("cut {} [{}]", self.input_path.display(), span),
            JobOperation::CropSides { left, right } => format!(
                "crop {} (left {}px, right {}px)",
                self.input_path.display(),
                left,
                right
            ),
            JobOperation::SplitVertical { .. } => {
                format!("split {}", self.input_path.display())
            }
            JobOperation::StackVertical { bottom_input, .. } => format!(
                "stack {} over {}",
                self.input_path.display(),
                bottom_input.display()
            ),
        }
    }
}

/// Probed container and primary stream information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub path: String,
    pub container: String,
    pub duration: f64,
    pub dimensions: Dimensions,
    pub frame_rate: f64,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub file_size: u64,
    pub bit_rate: Option<u64>,
}

impl MediaInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    /// Duration of one frame, falling back to 30 fps when unknown
    pub fn frame_duration(&self) -> f64 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            1.0 / 30.0
        }
    }
}

/// Outcome of one item of a multi-file operation
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub label: String,
    pub output: PathBuf,
    pub error: Option<DomainError>,
}

impl ItemOutcome {
    pub fn success(label: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(label: impl Into<String>, output: impl Into<PathBuf>, error: DomainError) -> Self {
        Self {
            label: label.into(),
            output: output.into(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-item outcomes of a multi-file operation
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub operation: String,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.items.push(outcome);
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| item.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| !item.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(ItemOutcome::is_success)
    }

    pub fn item(&self, label: &str) -> Option<&ItemOutcome> {
        self.items.iter().find(|item| item.label == label)
    }

    /// Collapse into a single result naming every failed item
    pub fn into_result(self) -> Result<Vec<PathBuf>, DomainError> {
        let failed: Vec<String> = self.failed().map(|item| item.label.clone()).collect();
        if failed.is_empty() {
            Ok(self.items.into_iter().map(|item| item.output).collect())
        } else {
            Err(DomainError::PartialFailure {
                operation: self.operation,
                failed,
            })
        }
    }
}

#[cfg(test)]
mod tests;
