//! MediaClip video tool library
//!
//! Cuts time ranges (stream-copy when the boundaries allow it, re-encode
//! otherwise), crops and splits frames, and stacks two videos into one
//! portrait canvas. All media work is delegated to ffmpeg/ffprobe child
//! processes with fully pre-computed arguments.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;

// Re-export commonly used types
pub use app::{DefaultAppContainer, JobOutput};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::model::{MediaInfo, MediaJob, TimeSpan, TimeSpec};
pub use engine::job::{spawn_job, JobHandle};
pub use engine::progress::ProgressUpdate;
