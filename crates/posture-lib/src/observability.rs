//! Structured event logging for posture runs
//!
//! Every event carries an `event` name and the cluster context label so a
//! JSON log stream can be filtered per run.

use crate::models::{CheckId, SecurityLevel, WorkloadRef};
use tracing::{debug, error, info, warn};

/// Structured logger for audit and analysis events
#[derive(Debug, Clone)]
pub struct AuditLogger {
    cluster: String,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new("default")
    }
}

impl AuditLogger {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Log the start of a rule-engine pass
    pub fn log_audit_started(&self, workloads: usize, checks: usize) {
        info!(
            event = "audit_started",
            cluster = %self.cluster,
            workloads = workloads,
            checks = checks,
            "Starting baseline audit"
        );
    }

    /// Log the outcome of one rule
    pub fn log_rule_evaluated(&self, check: CheckId, findings: usize) {
        debug!(
            event = "rule_evaluated",
            cluster = %self.cluster,
            check = %check,
            findings = findings,
            "Rule evaluated"
        );
    }

    /// Log the start of an AI batch
    pub fn log_analysis_started(&self, workloads: usize, model: &str) {
        info!(
            event = "analysis_started",
            cluster = %self.cluster,
            workloads = workloads,
            model = %model,
            "Starting AI analysis"
        );
    }

    /// Log progress before a workload is sent to the model
    pub fn log_workload_progress(&self, index: usize, total: usize, workload: &WorkloadRef) {
        info!(
            event = "workload_progress",
            cluster = %self.cluster,
            index = index,
            total = total,
            namespace = %workload.namespace,
            pod = %workload.pod,
            "Analyzing workload {}/{}",
            index,
            total
        );
    }

    /// Log a completed workload analysis
    pub fn log_workload_analyzed(&self, workload: &WorkloadRef, level: SecurityLevel, issues: usize) {
        debug!(
            event = "workload_analyzed",
            cluster = %self.cluster,
            namespace = %workload.namespace,
            pod = %workload.pod,
            security_level = %level,
            issues = issues,
            "Workload analyzed"
        );
    }

    /// Log a reply that could not be parsed
    pub fn log_response_unparsed(&self, workload: &WorkloadRef, reason: &str, response: &str) {
        warn!(
            event = "response_unparsed",
            cluster = %self.cluster,
            namespace = %workload.namespace,
            pod = %workload.pod,
            reason = %reason,
            response = %response,
            "Failed to parse AI response as JSON, using fallback analysis"
        );
    }

    /// Log a workload dropped from the batch after a call failure
    pub fn log_workload_skipped(&self, workload: &WorkloadRef, error: &dyn std::fmt::Display) {
        error!(
            event = "workload_skipped",
            cluster = %self.cluster,
            namespace = %workload.namespace,
            pod = %workload.pod,
            error = %error,
            "Failed to analyze workload, skipping"
        );
    }

    /// Log the end of an AI batch
    pub fn log_analysis_completed(&self, analyzed: usize, attempted: usize) {
        info!(
            event = "analysis_completed",
            cluster = %self.cluster,
            analyzed = analyzed,
            skipped = attempted.saturating_sub(analyzed),
            "AI analysis complete"
        );
    }
}
