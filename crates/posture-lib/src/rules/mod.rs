//! Baseline hardening rule engine
//!
//! Each rule is an independent predicate over a pod specification. Rules
//! never fail: absent fields short-circuit to "not applicable" or to the
//! less-safe default documented on the individual rule. Findings come out in
//! workload order, then container group order (primary, init, ephemeral),
//! then declaration order within the group.

mod confinement;
mod containers;
mod host;
mod privilege;


pub use confinement::{AppArmorRule, SeccompRule, SysctlRule, SAFE_SYSCTLS};
pub use containers::{all_containers, ContainerLike, ContainerRole};
pub use host::{HostIpcRule, HostNetworkRule, HostPathRule, HostPidRule, HostPortsRule, HostProcessRule};
pub use privilege::{
    AddedCapabilitiesRule, AllowPrivilegeEscalationRule, DroppedCapabilitiesRule, PrivilegedRule,
    ProcMountRule,
};

use crate::models::{CheckId, Finding, WorkloadRef};
use crate::observability::AuditLogger;
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;

/// A single hardening check
pub trait Rule: Send + Sync {
    /// Stable identifier of the check
    fn id(&self) -> CheckId;

    /// Findings for one workload
    fn check(&self, pod: &Pod) -> Vec<Finding>;

    /// Findings for a workload collection, in collection order
    fn evaluate(&self, pods: &[Pod]) -> Vec<Finding> {
        pods.iter().flat_map(|pod| self.check(pod)).collect()
    }
}

/// Emit one finding per container (across all groups) matched by `violates`
pub(crate) fn per_container<F>(id: CheckId, pod: &Pod, violates: F) -> Vec<Finding>
where
    F: Fn(&dyn ContainerLike) -> bool,
{
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };
    let workload = WorkloadRef::of(pod);

    all_containers(spec)
        .filter(|(_, container)| violates(*container))
        .map(|(_, container)| Finding::container_scoped(id, &workload, container.name()))
        .collect()
}

/// Outcome of one rule over the snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub check: CheckId,
    pub title: &'static str,
    pub findings: Vec<Finding>,
}

/// Fixed catalog of rules evaluated unconditionally on every run
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
    logger: AuditLogger,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Engine with the full built-in catalog
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(HostPidRule),
                Box::new(HostNetworkRule),
                Box::new(HostIpcRule),
                Box::new(HostPortsRule),
                Box::new(HostPathRule),
                Box::new(HostProcessRule),
                Box::new(PrivilegedRule),
                Box::new(AllowPrivilegeEscalationRule),
                Box::new(AddedCapabilitiesRule),
                Box::new(DroppedCapabilitiesRule),
                Box::new(SeccompRule),
                Box::new(AppArmorRule),
                Box::new(ProcMountRule),
                Box::new(SysctlRule),
            ],
            logger: AuditLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: AuditLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Engine restricted to the given checks; catalog order is kept
    pub fn with_checks(checks: &[CheckId]) -> Self {
        let mut engine = Self::new();
        if !checks.is_empty() {
            engine.rules.retain(|rule| checks.contains(&rule.id()));
        }
        engine
    }

    /// Checks this engine will evaluate, in order
    pub fn checks(&self) -> Vec<CheckId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Evaluate every rule against the snapshot
    pub fn run(&self, pods: &[Pod]) -> Vec<RuleReport> {
        self.logger.log_audit_started(pods.len(), self.rules.len());
        self.rules
            .iter()
            .map(|rule| {
                let findings = rule.evaluate(pods);
                self.logger.log_rule_evaluated(rule.id(), findings.len());
                RuleReport {
                    check: rule.id(),
                    title: rule.id().title(),
                    findings,
                }
            })
            .collect()
    }
}
