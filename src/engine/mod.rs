//! Engine command construction, progress and job handling
//!
//! The builders in [`copy`], [`reencode`] and [`compose`] are pure: they turn
//! validated domain values into ffmpeg argument vectors. Running them is the
//! job of an [`crate::ports::ExecutePort`].

use std::path::Path;

pub mod compose;
pub mod copy;
pub mod job;
pub mod progress;
pub mod reencode;

/// Flags shared by every invocation: quiet stderr except errors, machine
/// readable progress on stdout, never prompt, overwrite outputs
pub fn base_args() -> Vec<String> {
    [
        "-hide_banner",
        "-nostdin",
        "-y",
        "-loglevel",
        "error",
        "-progress",
        "pipe:1",
        "-nostats",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Seconds with microsecond precision, as ffmpeg expects for `-ss`/`-t`
pub fn engine_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds.max(0.0))
}

pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Append string literals to an argument vector
pub(crate) fn push_all(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}
