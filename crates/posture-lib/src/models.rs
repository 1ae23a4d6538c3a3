//! Core data models for posture evaluation

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identity of a workload (pod) inside the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub namespace: String,
    pub pod: String,
}

impl WorkloadRef {
    /// Read the identity from pod metadata, tolerating absent fields
    pub fn of(pod: &Pod) -> Self {
        Self {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            pod: pod.metadata.name.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.pod)
    }
}

/// Stable identifier of a hardening check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckId {
    HostPid,
    HostNet,
    HostIpc,
    HostPorts,
    HostPath,
    HostProcess,
    Privileged,
    AllowPrivEsc,
    AddedCaps,
    DroppedCaps,
    Seccomp,
    AppArmor,
    ProcMount,
    Sysctl,
}

impl CheckId {
    /// All checks in catalog order
    pub const ALL: [CheckId; 14] = [
        CheckId::HostPid,
        CheckId::HostNet,
        CheckId::HostIpc,
        CheckId::HostPorts,
        CheckId::HostPath,
        CheckId::HostProcess,
        CheckId::Privileged,
        CheckId::AllowPrivEsc,
        CheckId::AddedCaps,
        CheckId::DroppedCaps,
        CheckId::Seccomp,
        CheckId::AppArmor,
        CheckId::ProcMount,
        CheckId::Sysctl,
    ];

    /// Machine key used on the command line and in JSON output
    pub fn key(&self) -> &'static str {
        match self {
            CheckId::HostPid => "hostpid",
            CheckId::HostNet => "hostnet",
            CheckId::HostIpc => "hostipc",
            CheckId::HostPorts => "hostports",
            CheckId::HostPath => "hostpath",
            CheckId::HostProcess => "hostprocess",
            CheckId::Privileged => "privileged",
            CheckId::AllowPrivEsc => "allowprivesc",
            CheckId::AddedCaps => "addedcaps",
            CheckId::DroppedCaps => "droppedcaps",
            CheckId::Seccomp => "seccomp",
            CheckId::AppArmor => "apparmor",
            CheckId::ProcMount => "procmount",
            CheckId::Sysctl => "sysctl",
        }
    }

    /// Human-readable check title
    pub fn title(&self) -> &'static str {
        match self {
            CheckId::HostPid => "Host PID",
            CheckId::HostNet => "Host Network",
            CheckId::HostIpc => "Host IPC",
            CheckId::HostPorts => "Host Ports",
            CheckId::HostPath => "Host Path",
            CheckId::HostProcess => "Host Process",
            CheckId::Privileged => "Privileged Container",
            CheckId::AllowPrivEsc => "Allow Privilege Escalation",
            CheckId::AddedCaps => "Added Capabilities",
            CheckId::DroppedCaps => "Dropped Capabilities",
            CheckId::Seccomp => "Seccomp Disabled",
            CheckId::AppArmor => "Apparmor Disabled",
            CheckId::ProcMount => "Unmasked Procmount",
            CheckId::Sysctl => "Unsafe Sysctl",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckId::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown check '{}'", s))
    }
}

/// Rule-specific payload carried by a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Capabilities(Vec<String>),
    HostPort(i32),
    HostPath { volume: String, path: String },
    Sysctl(String),
}

/// One violated hardening property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub check: CheckId,
    pub namespace: String,
    pub pod: String,
    /// Empty for pod-scoped findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
}

impl Finding {
    pub fn pod_scoped(check: CheckId, workload: &WorkloadRef) -> Self {
        Self {
            check,
            namespace: workload.namespace.clone(),
            pod: workload.pod.clone(),
            container: None,
            evidence: None,
        }
    }

    pub fn container_scoped(check: CheckId, workload: &WorkloadRef, container: &str) -> Self {
        Self {
            container: Some(container.to_string()),
            ..Self::pod_scoped(check, workload)
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// AI-assessed risk classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    Safe,
    Moderate,
    HighRisk,
    Critical,
    /// Reserved for unparsable model replies
    Unknown,
}

impl SecurityLevel {
    /// All levels in reporting order
    pub const ALL: [SecurityLevel; 5] = [
        SecurityLevel::Safe,
        SecurityLevel::Moderate,
        SecurityLevel::HighRisk,
        SecurityLevel::Critical,
        SecurityLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Safe => "SAFE",
            SecurityLevel::Moderate => "MODERATE",
            SecurityLevel::HighRisk => "HIGH_RISK",
            SecurityLevel::Critical => "CRITICAL",
            SecurityLevel::Unknown => "UNKNOWN",
        }
    }

    /// CSS-friendly slug, e.g. `high-risk`
    pub fn slug(&self) -> String {
        self.as_str().to_lowercase().replace('_', "-")
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI assessment of a single workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub namespace: String,
    pub pod: String,
    pub security_level: SecurityLevel,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Per-level counts derived from a result collection
///
/// Always recomputed from the collection it describes; never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub levels: BTreeMap<SecurityLevel, usize>,
    pub total_issues: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            *summary.levels.entry(result.security_level).or_insert(0) += 1;
            summary.total_issues += result.issues.len();
            summary
        })
    }

    /// Count for a level, zero when absent
    pub fn count(&self, level: SecurityLevel) -> usize {
        self.levels.get(&level).copied().unwrap_or(0)
    }

    pub fn total_workloads(&self) -> usize {
        self.levels.values().sum()
    }
}
