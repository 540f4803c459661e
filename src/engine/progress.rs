//! Progress reporting for long-running engine calls
//!
//! The engine is started with `-progress pipe:1`, which writes `key=value`
//! lines to stdout. [`parse_progress_line`] turns those into events and
//! [`ProgressSampler`] converts them into throttled percentage updates that are
//! pushed through a [`ProgressSender`]. Percentages are best-effort.

use serde::Serialize;
use tokio::sync::mpsc;

/// One sampled progress value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Stage of the operation the value belongs to
    pub stage: String,
    /// 0.0 - 100.0
    pub percent: f32,
}

/// Sending half of a job's progress sequence
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressSender {
    /// Push an update. Dropped silently when nobody is listening any more.
    pub fn send(&self, stage: &str, percent: f32) {
        let _ = self.tx.send(ProgressUpdate {
            stage: stage.to_string(),
            percent: percent.clamp(0.0, 100.0),
        });
    }
}

/// Create a progress channel
pub fn progress_channel() -> (ProgressSender, mpsc::UnboundedReceiver<ProgressUpdate>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, rx)
}

/// Event decoded from one `-progress` line
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Output timestamp reached, in seconds
    OutTime(f64),
    /// Engine reported `progress=end`
    End,
}

/// Decode one `key=value` line of ffmpeg's progress stream
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let (key, value) = line.trim().split_once('=')?;
    let value = value.trim();
    match key.trim() {
        // out_time_ms is also in microseconds
        "out_time_us" | "out_time_ms" => value
            .parse::<i64>()
            .ok()
            .map(|us| ProgressEvent::OutTime(us.max(0) as f64 / 1_000_000.0)),
        "out_time" => parse_clock(value).map(ProgressEvent::OutTime),
        "progress" if value == "end" => Some(ProgressEvent::End),
        _ => None,
    }
}

/// `HH:MM:SS.micro`, possibly negative at the very start of a stream
fn parse_clock(value: &str) -> Option<f64> {
    if value.starts_with('-') {
        return Some(0.0);
    }
    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Turns progress events into percentage updates, at most one per `step`
#[derive(Debug, Clone)]
pub struct ProgressSampler {
    stage: String,
    expected_duration: Option<f64>,
    step: f32,
    last_percent: Option<f32>,
    finished: bool,
}

impl ProgressSampler {
    pub fn new(stage: impl Into<String>, expected_duration: Option<f64>) -> Self {
        Self {
            stage: stage.into(),
            expected_duration: expected_duration.filter(|d| *d > 0.0),
            step: 1.0,
            last_percent: None,
            finished: false,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step.max(0.0);
        self
    }

    /// Feed one event; returns an update when it moved far enough
    pub fn observe(&mut self, event: &ProgressEvent) -> Option<ProgressUpdate> {
        if self.finished {
            return None;
        }
        let percent = match event {
            ProgressEvent::End => {
                self.finished = true;
                100.0
            }
            ProgressEvent::OutTime(seconds) => {
                let duration = self.expected_duration?;
                ((seconds / duration) * 100.0).clamp(0.0, 100.0) as f32
            }
        };

        let due = self.finished
            || match self.last_percent {
                None => true,
                Some(last) => percent >= last + self.step || (percent >= 100.0 && last < 100.0),
            };
        if !due {
            return None;
        }
        self.last_percent = Some(percent);
        Some(ProgressUpdate {
            stage: self.stage.clone(),
            percent,
        })
    }
}
