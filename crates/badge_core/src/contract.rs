use serde::{Deserialize, Serialize};

pub const MIN_COVERAGE: f64 = 0.0;
pub const MAX_COVERAGE: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageReport {
    pub total_coverage: f64,
    pub project: String,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeLocation {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn normalize_report(report: CoverageReport) -> Result<CoverageReport, ValidationError> {
    if !report.total_coverage.is_finite() {
        return Err(ValidationError::new("total_coverage must be a finite number"));
    }

    if !(MIN_COVERAGE..=MAX_COVERAGE).contains(&report.total_coverage) {
        return Err(ValidationError::new(format!(
            "total_coverage must be between {MIN_COVERAGE} and {MAX_COVERAGE}"
        )));
    }

    let project = report.project.trim().to_string();
    if project.is_empty() {
        return Err(ValidationError::new("project cannot be empty"));
    }

    let branch = report.branch.trim().to_string();
    if branch.is_empty() {
        return Err(ValidationError::new("branch cannot be empty"));
    }

    Ok(CoverageReport {
        total_coverage: report.total_coverage,
        project,
        branch,
    })
}

/// Renders a coverage value the way it appears on the badge.
///
/// Whole numbers print without a fraction (`1` -> `1%`).
pub fn format_coverage(total_coverage: f64) -> String {
    // -0.0 would otherwise print as "-0"
    let value = if total_coverage == 0.0 {
        0.0
    } else {
        total_coverage
    };
    format!("{value}%")
}
