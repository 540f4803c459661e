//! Re-encoding commands: frame-accurate cuts and side crops

use std::path::Path;

use crate::domain::model::{AudioEncoder, CropGeometry, EncoderSettings, TimeSpan, VideoEncoder};
use crate::domain::rules::ContainerRules;
use crate::engine::{base_args, engine_seconds, path_arg, push_all};

/// Video codec arguments for `encoder` under `settings`
pub fn video_codec_args(encoder: VideoEncoder, settings: &EncoderSettings) -> Vec<String> {
    let mut args = vec!["-c:v".to_string(), encoder.ffmpeg_name().to_string()];
    let crf = settings.crf.to_string();
    match encoder {
        VideoEncoder::Libx264 => {
            args.extend([
                "-preset".to_string(),
                settings.preset.clone(),
                "-crf".to_string(),
                crf,
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]);
        }
        VideoEncoder::H264Nvenc => {
            args.extend([
                "-preset".to_string(),
                settings.preset.clone(),
                "-rc".to_string(),
                "vbr".to_string(),
                "-cq".to_string(),
                crf,
                "-b:v".to_string(),
                "0".to_string(),
            ]);
        }
        VideoEncoder::LibvpxVp9 => {
            args.extend(["-crf".to_string(), crf]);
            push_all(&mut args, &["-b:v", "0", "-deadline", "good", "-row-mt", "1"]);
        }
    }
    if settings.threads > 0 {
        args.push("-threads".to_string());
        args.push(settings.threads.to_string());
    }
    args
}

pub fn audio_codec_args(encoder: AudioEncoder) -> Vec<String> {
    let mut args = vec!["-c:a".to_string(), encoder.ffmpeg_name().to_string()];
    match encoder {
        AudioEncoder::Aac => push_all(&mut args, &["-b:a", "192k"]),
        AudioEncoder::Libvorbis => push_all(&mut args, &["-q:a", "5"]),
        AudioEncoder::Copy => {}
    }
    args
}

/// Muxer options for the output container
pub fn container_args(output: &Path) -> Vec<String> {
    match ContainerRules::container_of(output).as_str() {
        "mp4" | "m4v" | "mov" => vec!["-movflags".to_string(), "+faststart".to_string()],
        _ => Vec::new(),
    }
}

/// Frame-accurate cut of `span` with the encoders suited to `output`
pub fn reencode_cut(
    input: &Path,
    output: &Path,
    span: &TimeSpan,
    settings: &EncoderSettings,
) -> Vec<String> {
    let (video, audio) = ContainerRules::encoders_for(output, settings);
    let mut args = base_args();
    args.push("-ss".to_string());
    args.push(engine_seconds(span.start));
    args.push("-i".to_string());
    args.push(path_arg(input));
    args.push("-t".to_string());
    args.push(engine_seconds(span.duration()));
    push_all(&mut args, &["-map", "0:v:0", "-map", "0:a?"]);
    args.extend(video_codec_args(video, settings));
    args.extend(audio_codec_args(audio));
    args.extend(container_args(output));
    args.push(path_arg(output));
    args
}

/// Crop with `geometry`, keeping the audio as is when the container allows it
pub fn crop(
    input: &Path,
    output: &Path,
    geometry: &CropGeometry,
    settings: &EncoderSettings,
) -> Vec<String> {
    let (video, audio) = ContainerRules::encoders_for(output, settings);
    let audio = if ContainerRules::same_container(input, output) {
        AudioEncoder::Copy
    } else {
        audio
    };

    let mut args = base_args();
    args.push("-i".to_string());
    args.push(path_arg(input));
    push_all(&mut args, &["-map", "0:v:0", "-map", "0:a?"]);
    args.push("-vf".to_string());
    args.push(geometry.filter());
    args.extend(video_codec_args(video, settings));
    args.extend(audio_codec_args(audio));
    args.extend(container_args(output));
    args.push(path_arg(output));
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        let pos = args.iter().position(|a| a == flag)?;
        args.get(pos + 1).map(String::as_str)
    }

    #[test]
    fn test_libx264_args() {
        let settings = EncoderSettings::default();
        let args = video_codec_args(VideoEncoder::Libx264, &settings);
        assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(&args, "-preset"), Some("slow"));
        assert_eq!(value_after(&args, "-crf"), Some("18"));
        assert_eq!(value_after(&args, "-pix_fmt"), Some("yuv420p"));
        assert!(!args.contains(&"-threads".to_string()));
    }

    #[test]
    fn test_nvenc_uses_constant_quality() {
        let settings = EncoderSettings {
            hwaccel: true,
            crf: 23,
            threads: 4,
            ..EncoderSettings::default()
        };
        let args = video_codec_args(VideoEncoder::H264Nvenc, &settings);
        assert_eq!(value_after(&args, "-cq"), Some("23"));
        assert_eq!(value_after(&args, "-rc"), Some("vbr"));
        assert_eq!(value_after(&args, "-threads"), Some("4"));
        assert!(!args.contains(&"-crf".to_string()));
    }

    #[test]
    fn test_audio_args() {
        assert_eq!(
            audio_codec_args(AudioEncoder::Aac),
            vec!["-c:a", "aac", "-b:a", "192k"]
        );
        assert_eq!(audio_codec_args(AudioEncoder::Copy), vec!["-c:a", "copy"]);
    }

    #[test]
    fn test_reencode_cut_for_webm() {
        let span = TimeSpan::new(5.0, 7.5).unwrap();
        let args = reencode_cut(
            Path::new("in.mp4"),
            Path::new("out.webm"),
            &span,
            &EncoderSettings::default(),
        );
        assert_eq!(value_after(&args, "-ss"), Some("5.000000"));
        assert_eq!(value_after(&args, "-t"), Some("2.500000"));
        assert_eq!(value_after(&args, "-c:v"), Some("libvpx-vp9"));
        assert_eq!(value_after(&args, "-c:a"), Some("libvorbis"));
        assert!(!args.contains(&"-movflags".to_string()));
    }

    #[test]
    fn test_reencode_cut_mp4_faststart() {
        let span = TimeSpan::new(0.0, 1.0).unwrap();
        let args = reencode_cut(
            Path::new("in.mkv"),
            Path::new("out.mp4"),
            &span,
            &EncoderSettings::default(),
        );
        assert_eq!(value_after(&args, "-movflags"), Some("+faststart"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_crop_filter_and_audio_copy() {
        let geometry = CropGeometry {
            left: 10,
            right: 20,
            width: 1890,
            height: 1080,
        };
        let args = crop(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &geometry,
            &EncoderSettings::default(),
        );
        assert_eq!(value_after(&args, "-vf"), Some("crop=1890:1080:10:0"));
        assert_eq!(value_after(&args, "-c:a"), Some("copy"));
    }
}
