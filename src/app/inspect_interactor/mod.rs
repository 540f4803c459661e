// Inspect interactor - Orchestrates media file inspection use case

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
}

impl InspectInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, fs_port: Arc<dyn FsPort>) -> Self {
        Self {
            probe_port,
            fs_port,
        }
    }

    /// Probe `input` and return its container and primary stream details
    pub async fn inspect(&self, input: &Path) -> Result<MediaInfo, DomainError> {
        self.ensure_exists(input).await?;
        let media_info = self.probe_port.probe_media(input).await?;
        info!(
            "Probed {}: {} {:.3}s",
            input.display(),
            media_info.dimensions,
            media_info.duration
        );
        Ok(media_info)
    }

    /// Frame size of the primary video stream
    pub async fn dimensions(&self, input: &Path) -> Result<Dimensions, DomainError> {
        self.ensure_exists(input).await?;
        self.probe_port.probe_dimensions(input).await
    }

    async fn ensure_exists(&self, input: &Path) -> Result<(), DomainError> {
        if !self.fs_port.file_exists(input).await? {
            return Err(DomainError::FsFail(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }
        Ok(())
    }
}

/// Render media info as pretty JSON
pub fn format_as_json(media_info: &MediaInfo) -> Result<String, DomainError> {
    serde_json::to_string_pretty(media_info)
        .map_err(|e| DomainError::BadArgs(format!("JSON serialization failed: {}", e)))
}

/// Render media info as human-readable text
pub fn format_as_text(media_info: &MediaInfo) -> String {
    let mut output = String::new();
    output.push_str("Media File Information:\n");
    output.push_str(&format!("  File: {}\n", media_info.path));
    output.push_str(&format!("  Container: {}\n", media_info.container));
    output.push_str(&format!(
        "  Duration: {} ({:.3}s)\n",
        format_seconds(media_info.duration),
        media_info.duration
    ));
    output.push_str(&format!(
        "  File Size: {:.2} MB\n",
        media_info.file_size as f64 / 1_048_576.0
    ));
    if let Some(bit_rate) = media_info.bit_rate {
        output.push_str(&format!("  Bit Rate: {} kb/s\n", bit_rate / 1000));
    }
    output.push_str(&format!(
        "  Video: {} {} @ {:.2}fps\n",
        media_info.video_codec, media_info.dimensions, media_info.frame_rate
    ));
    match &media_info.audio_codec {
        Some(codec) => output.push_str(&format!("  Audio: {}\n", codec)),
        None => output.push_str("  Audio: none\n"),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MediaInfo {
        MediaInfo {
            path: "clip.mp4".to_string(),
            container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: 3723.5,
            dimensions: Dimensions::new(1920, 1080),
            frame_rate: 25.0,
            video_codec: "h264".to_string(),
            audio_codec: None,
            file_size: 2 * 1_048_576,
            bit_rate: Some(128_000),
        }
    }

    #[test]
    fn test_text_report() {
        let text = format_as_text(&sample());
        assert!(text.contains("Duration: 01:02:03 (3723.500s)"));
        assert!(text.contains("Video: h264 1920x1080 @ 25.00fps"));
        assert!(text.contains("Audio: none"));
        assert!(text.contains("File Size: 2.00 MB"));
        assert!(text.contains("Bit Rate: 128 kb/s"));
    }

    #[test]
    fn test_json_report() {
        let json = format_as_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dimensions"]["width"], 1920);
        assert!(value["audio_codec"].is_null());
    }
}
