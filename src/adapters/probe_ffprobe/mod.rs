//! FFprobe adapter for media file probing
//!
//! Stream and container information comes from ffprobe's JSON writer;
//! dimensions and keyframes use the compact csv writer.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::adapters::exec_ffmpeg::summarize_diagnostic;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Seconds read on each side of a cut start when looking for keyframes
const KEYFRAME_WINDOW: f64 = 2.0;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn query(&self, file_path: &Path, args: &[String]) -> Result<String, DomainError> {
        debug!("{} {}", self.binary.display(), args.join(" "));
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| probe_failed(file_path, format!("failed to start ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(probe_failed(
                file_path,
                summarize_diagnostic(&String::from_utf8_lossy(&output.stderr)),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

fn probe_failed(path: &Path, diagnostic: impl Into<String>) -> DomainError {
    DomainError::ProbeFailed {
        path: path.display().to_string(),
        diagnostic: diagnostic.into(),
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaInfo, DomainError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            file_path.to_string_lossy().into_owned(),
        ];
        let json = self.query(file_path, &args).await?;
        parse_media_info(file_path, &json)
    }

    async fn probe_dimensions(&self, file_path: &Path) -> Result<Dimensions, DomainError> {
        let args: Vec<String> = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(file_path.to_string_lossy().into_owned()))
        .collect();
        let text = self.query(file_path, &args).await?;
        parse_dimensions(&text).ok_or_else(|| {
            probe_failed(
                file_path,
                format!("unexpected dimension output '{}'", text.trim()),
            )
        })
    }

    async fn probe_keyframes(
        &self,
        file_path: &Path,
        window: TimeSpan,
    ) -> Result<Vec<f64>, DomainError> {
        let from = (window.start - KEYFRAME_WINDOW).max(0.0);
        let to = window.end + KEYFRAME_WINDOW;
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-read_intervals".to_string(),
            format!("{:.3}%{:.3}", from, to),
            "-show_entries".to_string(),
            "packet=pts_time,flags".to_string(),
            "-of".to_string(),
            "csv=p=0".to_string(),
            file_path.to_string_lossy().into_owned(),
        ];
        let text = self.query(file_path, &args).await?;
        Ok(parse_keyframes(&text))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

/// Build [`MediaInfo`] from `ffprobe -print_format json -show_format -show_streams`
pub fn parse_media_info(path: &Path, json: &str) -> Result<MediaInfo, DomainError> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| probe_failed(path, format!("unreadable ffprobe output: {}", e)))?;

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| probe_failed(path, "no video stream"))?;
    let audio = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let dimensions = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Dimensions::new(w, h),
        _ => return Err(probe_failed(path, "video stream has no dimensions")),
    };

    let format = output.format.as_ref();
    let duration = format
        .and_then(|f| parse_number(f.duration.as_deref()))
        .or_else(|| parse_number(video.duration.as_deref()))
        .ok_or_else(|| probe_failed(path, "duration unknown"))?;

    let frame_rate = parse_frame_rate(video.avg_frame_rate.as_deref())
        .or_else(|| parse_frame_rate(video.r_frame_rate.as_deref()))
        .unwrap_or(0.0);

    Ok(MediaInfo {
        path: path.display().to_string(),
        container: format
            .and_then(|f| f.format_name.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        duration,
        dimensions,
        frame_rate,
        video_codec: video
            .codec_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        audio_codec: audio.map(|a| a.codec_name.clone().unwrap_or_else(|| "unknown".to_string())),
        file_size: format
            .and_then(|f| f.size.as_deref())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        bit_rate: format
            .and_then(|f| f.bit_rate.as_deref())
            .and_then(|s| s.parse().ok()),
    })
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// `30000/1001` style rate; `0/0` is unknown
pub fn parse_frame_rate(rate: Option<&str>) -> Option<f64> {
    let (num, den) = rate?.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

/// `WIDTHxHEIGHT` from the csv writer, first non-empty line
pub fn parse_dimensions(text: &str) -> Option<Dimensions> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    // Some builds append a trailing separator
    let line = line.trim_end_matches('x');
    let (w, h) = line.split_once('x')?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(Dimensions::new(width, height))
}

/// Timestamps of packets flagged `K`, sorted
pub fn parse_keyframes(text: &str) -> Vec<f64> {
    let mut keyframes: Vec<f64> = text
        .lines()
        .filter_map(|line| {
            let mut fields = line.trim().split(',');
            let pts = fields.next()?.trim().parse::<f64>().ok()?;
            let flags = fields.next()?;
            flags.starts_with('K').then_some(pts)
        })
        .collect();
    keyframes.sort_by(|a, b| a.total_cmp(b));
    keyframes
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
             "avg_frame_rate": "30000/1001", "r_frame_rate": "30000/1001", "duration": "60.060000"},
            {"codec_type": "audio", "codec_name": "aac"}
        ],
        "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "60.095000",
                   "size": "1048576", "bit_rate": "139586"}
    }"#;

    #[test]
    fn test_parse_media_info() {
        let info = parse_media_info(Path::new("in.mp4"), SAMPLE).unwrap();
        assert_eq!(info.dimensions, Dimensions::new(1920, 1080));
        assert_eq!(info.duration, 60.095);
        assert_eq!(info.video_codec, "h264");
        assert_eq!(info.audio_codec.as_deref(), Some("aac"));
        assert_eq!(info.file_size, 1_048_576);
        assert_eq!(info.bit_rate, Some(139_586));
        assert!((info.frame_rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_media_info_without_video() {
        let json = r#"{"streams": [{"codec_type": "audio", "codec_name": "mp3"}],
                       "format": {"duration": "3.0"}}"#;
        let err = parse_media_info(Path::new("song.mp3"), json).unwrap_err();
        assert!(matches!(err, DomainError::ProbeFailed { .. }));
    }

    #[test]
    fn test_parse_media_info_garbage() {
        assert!(parse_media_info(Path::new("x"), "not json").is_err());
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1280x720\n"), Some(Dimensions::new(1280, 720)));
        assert_eq!(parse_dimensions("101x75x"), Some(Dimensions::new(101, 75)));
        assert_eq!(parse_dimensions(""), None);
        assert_eq!(parse_dimensions("0x720"), None);
        assert_eq!(parse_dimensions("N/AxN/A"), None);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("25/1")), Some(25.0));
        assert_eq!(parse_frame_rate(Some("0/0")), None);
        assert_eq!(parse_frame_rate(None), None);
    }

    #[test]
    fn test_parse_keyframes() {
        let text = "4.000000,K__\n4.033367,___\n6.000000,K_\n\n2.000000,K__\n";
        assert_eq!(parse_keyframes(text), vec![2.0, 4.0, 6.0]);
    }
}
