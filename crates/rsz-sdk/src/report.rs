use tracing::warn;

use crate::error::{SdkError, SdkResult};

/// A bundle unit that could not be applied.
#[derive(Debug)]
pub struct BundleFailure {
    /// `<native path>#<id>` for resource units, the native path for
    /// whole-file failures.
    pub unit: String,
    pub error: SdkError,
}

/// Outcome of applying a bundle onto the open files of a session.
#[derive(Debug, Default)]
pub struct BundleReport {
    /// Files whose resources were patched and written back.
    pub patched: Vec<String>,
    /// Files the bundle replaces whole; no diff content was applied.
    pub replaced: Vec<String>,
    /// Listed files that are not open or carry no diff.
    pub skipped: Vec<String>,
    /// Resource units applied.
    pub applied: Vec<String>,
    pub failures: Vec<BundleFailure>,
}

impl BundleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, unit: String, result: SdkResult<()>) {
        match result {
            Ok(()) => self.applied.push(unit),
            Err(error) => self.fail(unit, error),
        }
    }

    pub fn fail(&mut self, unit: String, error: SdkError) {
        warn!(unit = %unit, error = %error, "bundle unit failed");
        self.failures.push(BundleFailure { unit, error });
    }
}
