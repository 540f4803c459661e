// Verify interactor - Checks a produced file against the expected duration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Default allowed difference between expected and actual duration, seconds
pub const DEFAULT_TOLERANCE: f64 = 0.5;

/// Outcome of a duration check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub expected: f64,
    pub actual: f64,
    pub tolerance: f64,
    pub file_size: u64,
}

impl VerifyReport {
    pub fn difference(&self) -> f64 {
        (self.actual - self.expected).abs()
    }

    pub fn passed(&self) -> bool {
        self.file_size > 0 && self.difference() <= self.tolerance
    }
}

/// Interactor for output verification use case
pub struct VerifyInteractor {
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
}

impl VerifyInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, fs_port: Arc<dyn FsPort>) -> Self {
        Self {
            probe_port,
            fs_port,
        }
    }

    /// Probe `output` and compare its duration with `expected`
    pub async fn verify_duration(
        &self,
        output: &Path,
        expected: f64,
        tolerance: f64,
    ) -> Result<VerifyReport, DomainError> {
        if !expected.is_finite() || expected < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "expected duration {} must be a non-negative number",
                expected
            )));
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "tolerance {} must be a non-negative number",
                tolerance
            )));
        }
        if !self.fs_port.file_exists(output).await? {
            return Err(DomainError::FsFail(format!(
                "Output file does not exist: {}",
                output.display()
            )));
        }

        let media_info = self.probe_port.probe_media(output).await?;
        let report = VerifyReport {
            path: output.to_path_buf(),
            expected,
            actual: media_info.duration,
            tolerance,
            file_size: self.fs_port.file_size(output).await?,
        };

        if report.passed() {
            info!(
                "Verified {}: {:.3}s (expected {:.3}s)",
                output.display(),
                report.actual,
                expected
            );
        } else {
            warn!(
                "Verification failed for {}: {:.3}s, expected {:.3}s +/- {:.3}s",
                output.display(),
                report.actual,
                expected,
                tolerance
            );
        }
        Ok(report)
    }
}
