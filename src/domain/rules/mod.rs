// Domain rules - Business logic and policies

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Round down to the nearest even number. Chroma subsampling needs even sizes.
pub fn even_floor(value: u32) -> u32 {
    value & !1
}

/// Geometry rules for crop and split
pub struct GeometryRules;

impl GeometryRules {
    /// Trim `left` and `right` pixels off a source frame
    pub fn crop_sides(
        source: Dimensions,
        left: u32,
        right: u32,
    ) -> Result<CropGeometry, DomainError> {
        let trimmed = u64::from(left) + u64::from(right);
        if trimmed >= u64::from(source.width) {
            return Err(DomainError::InvalidGeometry(format!(
                "trimming {}px left and {}px right leaves nothing of a {}px wide source",
                left, right, source.width
            )));
        }

        let width = even_floor(source.width - left - right);
        let height = even_floor(source.height);
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidGeometry(format!(
                "crop of {} degenerates to {}x{}",
                source, width, height
            )));
        }
        if u64::from(left) + u64::from(width) > u64::from(source.width) {
            return Err(DomainError::InvalidGeometry(format!(
                "crop at x={} with width {} exceeds source width {}",
                left, width, source.width
            )));
        }

        Ok(CropGeometry {
            left,
            right,
            width,
            height,
        })
    }

    /// Left and right halves of a source frame, split at `floor(width / 2)`
    /// rounded down to even
    pub fn split_halves(source: Dimensions) -> Result<(CropGeometry, CropGeometry), DomainError> {
        let half = even_floor(source.width / 2);
        if half == 0 {
            return Err(DomainError::InvalidGeometry(format!(
                "source {} is too narrow to split",
                source
            )));
        }
        let left = Self::crop_sides(source, 0, source.width - half)?;
        let right = Self::crop_sides(source, half, 0)?;
        Ok((left, right))
    }

    /// Force both pane dimensions even and non-zero
    pub fn stack_layout(layout: StackLayout) -> Result<StackLayout, DomainError> {
        let fitted = StackLayout {
            width: even_floor(layout.width),
            half_height: even_floor(layout.half_height),
        };
        if fitted.width == 0 || fitted.half_height == 0 {
            return Err(DomainError::InvalidGeometry(format!(
                "stack pane {}x{} is too small",
                layout.width, layout.half_height
            )));
        }
        Ok(fitted)
    }
}

/// Business rules for cut strategy selection
pub struct CutStrategySelector;

impl CutStrategySelector {
    const COPY_VIDEO_CODECS: [&'static str; 6] = ["h264", "hevc", "vp8", "vp9", "av1", "mpeg4"];
    const COPY_AUDIO_CODECS: [&'static str; 7] =
        ["aac", "mp3", "opus", "vorbis", "ac3", "eac3", "flac"];

    /// Whether the codecs and containers allow a lossless re-mux
    pub fn copy_compatible(media_info: &MediaInfo, input: &Path, output: &Path) -> bool {
        let video_ok = Self::COPY_VIDEO_CODECS.contains(&media_info.video_codec.as_str());
        let audio_ok = media_info
            .audio_codec
            .as_deref()
            .map_or(true, |codec| Self::COPY_AUDIO_CODECS.contains(&codec));
        video_ok && audio_ok && ContainerRules::same_container(input, output)
    }

    /// Whether `start` lands on a keyframe within half a frame
    pub fn starts_on_keyframe(start: f64, keyframes: &[f64], frame_duration: f64) -> bool {
        if start <= 0.0 {
            return true;
        }
        let tolerance = frame_duration / 2.0;
        keyframes.iter().any(|kf| (kf - start).abs() <= tolerance)
    }

    /// Resolve the requested mode into the strategy actually used.
    ///
    /// `keyframes` is only consulted for [`CutMode::Auto`].
    pub fn select(
        requested: CutMode,
        media_info: &MediaInfo,
        span: &TimeSpan,
        keyframes: &[f64],
        input: &Path,
        output: &Path,
    ) -> CutStrategy {
        match requested {
            CutMode::Copy => CutStrategy::StreamCopy,
            CutMode::Reencode => CutStrategy::Reencode,
            CutMode::Auto => {
                if Self::copy_compatible(media_info, input, output)
                    && Self::starts_on_keyframe(span.start, keyframes, media_info.frame_duration())
                {
                    CutStrategy::StreamCopy
                } else {
                    CutStrategy::Reencode
                }
            }
        }
    }
}

/// Container-dependent choices
pub struct ContainerRules;

impl ContainerRules {
    /// Lowercased extension, `mp4` when absent
    pub fn container_of(path: &Path) -> String {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp4".to_string())
    }

    pub fn same_container(input: &Path, output: &Path) -> bool {
        let family = |ext: String| match ext.as_str() {
            "mp4" | "m4v" | "mov" => "isobmff".to_string(),
            "mkv" | "mka" => "matroska".to_string(),
            _ => ext,
        };
        family(Self::container_of(input)) == family(Self::container_of(output))
    }

    /// Encoders suitable for the output container
    pub fn encoders_for(output: &Path, settings: &EncoderSettings) -> (VideoEncoder, AudioEncoder) {
        match Self::container_of(output).as_str() {
            "webm" => (VideoEncoder::LibvpxVp9, AudioEncoder::Libvorbis),
            _ if settings.hwaccel => (VideoEncoder::H264Nvenc, AudioEncoder::Aac),
            _ => (VideoEncoder::Libx264, AudioEncoder::Aac),
        }
    }
}

/// One parsed line of a cut list
#[derive(Debug, Clone, PartialEq)]
pub struct CutListEntry {
    /// 1-based position among non-blank lines
    pub index: usize,
    pub line: String,
    pub span: Result<TimeSpan, DomainError>,
}

/// Parse a cut list of `START to END` lines.
///
/// Blank lines and `#` comments are skipped. Each remaining line yields an
/// entry; malformed lines carry their error instead of aborting the list.
pub fn parse_cut_list(text: &str) -> Vec<CutListEntry> {
    const SEPARATORS: [&str; 3] = [" to ", " até ", " - "];

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(i, line)| {
            let span = SEPARATORS
                .iter()
                .find_map(|sep| line.split_once(*sep))
                .ok_or_else(|| {
                    DomainError::invalid_format(line, "expected 'START to END'")
                })
                .and_then(|(start, end)| TimeSpan::parse(start, end));
            CutListEntry {
                index: i + 1,
                line: line.to_string(),
                span,
            }
        })
        .collect()
}

/// Output locations for derived files
pub struct OutputRules;

impl OutputRules {
    /// `<out_dir>/cut_<n>.<ext of input>`
    pub fn cut_list_output(out_dir: &Path, index: usize, input: &Path) -> PathBuf {
        out_dir.join(format!(
            "cut_{}.{}",
            index,
            ContainerRules::container_of(input)
        ))
    }

    /// `<root>/<YYYY-MM-DD>/<platform>`
    pub fn platform_dir(root: &Path, date: NaiveDate, platform: Platform) -> PathBuf {
        root.join(date.format("%Y-%m-%d").to_string())
            .join(platform.dir_name())
    }

    /// `<platform dir>/cut_<platform>.<ext of input>`
    pub fn platform_output(root: &Path, date: NaiveDate, platform: Platform, input: &Path) -> PathBuf {
        Self::platform_dir(root, date, platform).join(format!(
            "cut_{}.{}",
            platform.dir_name(),
            ContainerRules::container_of(input)
        ))
    }
}
