//! Pod security posture library
//!
//! This crate provides the core functionality for:
//! - Baseline hardening checks over pod specifications
//! - AI-assisted workload analysis against an OpenAI-compatible service
//! - JSON and HTML analysis reports
//! - Workload snapshots from a live cluster
//! - Structured audit logging

pub mod ai;
pub mod models;
pub mod observability;
pub mod report;
pub mod rules;
pub mod snapshot;

pub use ai::{
    AnalysisError, ChatClient, ClientConfig, Interpretation, OpenAiClient, PromptBuilder,
    SecurityAnalyzer,
};
pub use models::*;
pub use observability::AuditLogger;
pub use report::{AnalysisReport, ReportError, ReportFormat};
pub use rules::{Rule, RuleEngine, RuleReport};
pub use snapshot::{
    KubeOptions, KubePodSource, NamespaceExclusion, SnapshotError, StaticSource, WorkloadSource,
};
