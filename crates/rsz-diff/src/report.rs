use crate::error::DiffError;

/// A diff unit that could not be applied.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitFailure {
    /// The unit key (object path, resource ID, ...).
    pub unit: String,
    pub error: DiffError,
}

/// Outcome of applying a multi-unit diff document.
///
/// Units are applied independently: a failed unit is recorded and its
/// siblings still run. Nothing is rolled back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: Vec<String>,
    pub failures: Vec<UnitFailure>,
}

impl ApplyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if every unit applied.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, unit: impl Into<String>, result: Result<(), DiffError>) {
        let unit = unit.into();
        match result {
            Ok(()) => self.applied.push(unit),
            Err(error) => {
                tracing::warn!(unit = %unit, error = %error, "diff unit failed to apply");
                self.failures.push(UnitFailure { unit, error });
            }
        }
    }

    /// Fold another report into this one, prefixing its unit keys.
    pub fn merge(&mut self, prefix: &str, other: ApplyReport) {
        self.applied
            .extend(other.applied.into_iter().map(|u| format!("{prefix}{u}")));
        self.failures.extend(other.failures.into_iter().map(|f| UnitFailure {
            unit: format!("{prefix}{}", f.unit),
            error: f.error,
        }));
    }
}
