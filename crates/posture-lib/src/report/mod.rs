//! Report rendering for AI analysis results
//!
//! Two persisted forms are supported: a JSON document for machines and a
//! self-contained HTML page for people. The summary is always recomputed
//! from the result collection at render time.

mod html;

pub use html::{render_html, write_html};

use crate::models::{AnalysisResult, BatchSummary, SecurityLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render report template: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Persisted report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }

    /// `pod_security_analysis_<YYYYMMDD_HHMMSS>.<ext>`
    pub fn default_file_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "pod_security_analysis_{}.{}",
            at.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }
}

/// JSON report document
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_pods: usize,
    pub summary: BTreeMap<SecurityLevel, usize>,
    pub analyses: &'a [AnalysisResult],
}

impl<'a> AnalysisReport<'a> {
    pub fn from_results(results: &'a [AnalysisResult], generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            total_pods: results.len(),
            summary: BatchSummary::from_results(results).levels,
            analyses: results,
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the JSON report to `path`
pub fn write_json(
    results: &[AnalysisResult],
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<(), ReportError> {
    let report = AnalysisReport::from_results(results, generated_at);
    std::fs::write(path, report.to_json()?)?;
    info!(path = %path.display(), workloads = results.len(), "JSON report written");
    Ok(())
}

/// Write the report in `format` to `path`
pub fn write_report(
    format: ReportFormat,
    results: &[AnalysisResult],
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Json => write_json(results, generated_at, path),
        ReportFormat::Html => write_html(results, generated_at, path),
    }
}
