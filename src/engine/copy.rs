//! Stream-copy cut: re-mux a time range without re-encoding

use std::path::Path;

use crate::domain::model::TimeSpan;
use crate::engine::{base_args, engine_seconds, path_arg, push_all};

/// Arguments for a lossless cut of `span` from `input` into `output`.
///
/// Input seeking snaps to the keyframe at or before `span.start`, so the cut
/// is exact only when the start is keyframe-aligned.
pub fn stream_copy_cut(input: &Path, output: &Path, span: &TimeSpan) -> Vec<String> {
    let mut args = base_args();
    args.push("-ss".to_string());
    args.push(engine_seconds(span.start));
    args.push("-i".to_string());
    args.push(path_arg(input));
    args.push("-t".to_string());
    args.push(engine_seconds(span.duration()));
    push_all(
        &mut args,
        &[
            "-map",
            "0:v:0",
            "-map",
            "0:a?",
            "-c",
            "copy",
            "-avoid_negative_ts",
            "make_zero",
        ],
    );
    args.push(path_arg(output));
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_copy_cut_args() {
        let span = TimeSpan::new(10.0, 20.0).unwrap();
        let args = stream_copy_cut(Path::new("in.mp4"), Path::new("out.mp4"), &span);

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input, "seek must be an input option");
        assert_eq!(args[ss + 1], "10.000000");

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "10.000000");

        let c = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[c + 1], "copy");
        assert_eq!(args.last().unwrap(), "out.mp4");
    }
}
