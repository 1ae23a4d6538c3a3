//! Interpretation of model replies
//!
//! Replies are untrusted free text that should contain a JSON object. Parsing
//! never fails past this boundary: an unusable reply becomes an `UNKNOWN`
//! result carrying the parse error as its only issue.

use crate::models::{AnalysisResult, SecurityLevel, WorkloadRef};
use chrono::Utc;
use serde::Deserialize;

const FALLBACK_RECOMMENDATIONS: [&str; 2] = [
    "Manual security review recommended",
    "Check API response format",
];

#[derive(Debug, Deserialize)]
struct Verdict {
    security_level: SecurityLevel,
    issues: Vec<String>,
    recommendations: Vec<String>,
}

/// Outcome of interpreting one reply
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The reply matched the expected schema
    Parsed(AnalysisResult),
    /// The reply could not be used; `result` is the synthetic `UNKNOWN` record
    Fallback {
        result: AnalysisResult,
        reason: String,
    },
}

impl Interpretation {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Interpretation::Fallback { .. })
    }

    pub fn result(&self) -> &AnalysisResult {
        match self {
            Interpretation::Parsed(result) => result,
            Interpretation::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            Interpretation::Parsed(result) => result,
            Interpretation::Fallback { result, .. } => result,
        }
    }
}

/// Strip surrounding whitespace and a Markdown code fence, if any
///
/// Idempotent: cleaning already-clean text returns it unchanged.
pub fn clean_response(content: &str) -> &str {
    let content = content.trim();
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    let content = content.strip_suffix("```").unwrap_or(content);
    content.trim()
}

/// Turn a raw reply into an analysis record for `workload`
pub fn interpret(workload: &WorkloadRef, content: &str) -> Interpretation {
    match serde_json::from_str::<Verdict>(clean_response(content)) {
        Ok(verdict) => Interpretation::Parsed(AnalysisResult {
            namespace: workload.namespace.clone(),
            pod: workload.pod.clone(),
            security_level: verdict.security_level,
            issues: verdict.issues,
            recommendations: verdict.recommendations,
            timestamp: Utc::now(),
        }),
        Err(err) => Interpretation::Fallback {
            result: AnalysisResult {
                namespace: workload.namespace.clone(),
                pod: workload.pod.clone(),
                security_level: SecurityLevel::Unknown,
                issues: vec![format!("AI analysis failed to parse response: {}", err)],
                recommendations: FALLBACK_RECOMMENDATIONS
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
                timestamp: Utc::now(),
            },
            reason: err.to_string(),
        },
    }
}
