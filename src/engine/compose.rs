//! Vertical stack pipeline: resize each source, composite, then mux audio
//!
//! The first two stages write lossless intermediates so that only the final
//! encode costs quality.

use std::path::Path;

use crate::domain::model::{EncoderSettings, StackLayout};
use crate::domain::rules::ContainerRules;
use crate::engine::reencode::{audio_codec_args, container_args, video_codec_args};
use crate::engine::{base_args, engine_seconds, path_arg, push_all};

const LOSSLESS: [&str; 8] = [
    "-c:v",
    "libx264",
    "-preset",
    "ultrafast",
    "-crf",
    "0",
    "-pix_fmt",
    "yuv420p",
];

/// Scale one source to a `layout.width x layout.half_height` pane, video only
pub fn resize_pane(input: &Path, output: &Path, layout: &StackLayout) -> Vec<String> {
    let mut args = base_args();
    args.push("-i".to_string());
    args.push(path_arg(input));
    push_all(&mut args, &["-map", "0:v:0", "-an", "-vf"]);
    args.push(format!(
        "scale={}:{}:flags=lanczos,setsar=1",
        layout.width, layout.half_height
    ));
    push_all(&mut args, &LOSSLESS);
    args.push(path_arg(output));
    args
}

/// Stack two panes, looping the shorter one up to `duration` seconds
pub fn composite(top: &Path, bottom: &Path, output: &Path, duration: f64) -> Vec<String> {
    let mut args = base_args();
    for pane in [top, bottom] {
        push_all(&mut args, &["-stream_loop", "-1", "-i"]);
        args.push(path_arg(pane));
    }
    push_all(
        &mut args,
        &[
            "-filter_complex",
            "[0:v][1:v]vstack=inputs=2[v]",
            "-map",
            "[v]",
            "-t",
        ],
    );
    args.push(engine_seconds(duration));
    push_all(&mut args, &LOSSLESS);
    args.push(path_arg(output));
    args
}

/// Final encode of the composite with audio from `audio_source`, looped to
/// cover `duration`. Without an audio source the output is silent.
pub fn mux_encode(
    composite: &Path,
    audio_source: Option<&Path>,
    output: &Path,
    duration: f64,
    settings: &EncoderSettings,
) -> Vec<String> {
    let (video, audio) = ContainerRules::encoders_for(output, settings);
    let mut args = base_args();
    args.push("-i".to_string());
    args.push(path_arg(composite));
    if let Some(source) = audio_source {
        push_all(&mut args, &["-stream_loop", "-1", "-i"]);
        args.push(path_arg(source));
        push_all(&mut args, &["-map", "0:v:0", "-map", "1:a:0?"]);
    } else {
        push_all(&mut args, &["-map", "0:v:0"]);
    }
    args.push("-t".to_string());
    args.push(engine_seconds(duration));
    args.extend(video_codec_args(video, settings));
    if audio_source.is_some() {
        args.extend(audio_codec_args(audio));
    }
    args.extend(container_args(output));
    args.push(path_arg(output));
    args
}
