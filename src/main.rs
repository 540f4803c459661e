//! MediaClip CLI
//!
//! # Usage
//!
//! ```bash
//! mediaclip cut -i talk.mp4 -s 00:01:00 -e 00:02:30 -o clip.mp4
//! mediaclip split -i wide.mp4 --left-out left.mp4 --right-out right.mp4
//! mediaclip stack --top gameplay.mp4 --bottom facecam.mp4 -o short.mp4 --audio top
//! mediaclip probe -i clip.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;

use mediaclip::cli::{commands, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::run(cli).await
}
