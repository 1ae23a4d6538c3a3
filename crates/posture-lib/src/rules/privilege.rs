//! Privilege and capability checks

use super::{all_containers, per_container, Rule};
use crate::models::{CheckId, Evidence, Finding, WorkloadRef};
use k8s_openapi::api::core::v1::{Capabilities, Pod};

/// Container security context marks the container privileged
pub struct PrivilegedRule;

impl Rule for PrivilegedRule {
    fn id(&self) -> CheckId {
        CheckId::Privileged
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        per_container(self.id(), pod, |container| {
            container
                .security_context()
                .and_then(|sc| sc.privileged)
                .unwrap_or(false)
        })
    }
}

/// Privilege escalation is not explicitly configured
///
/// An absent security context, or one that leaves `allowPrivilegeEscalation`
/// unset, counts as allowed. Any explicit value silences the check.
pub struct AllowPrivilegeEscalationRule;

impl Rule for AllowPrivilegeEscalationRule {
    fn id(&self) -> CheckId {
        CheckId::AllowPrivEsc
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        per_container(self.id(), pod, |container| {
            container
                .security_context()
                .map_or(true, |sc| sc.allow_privilege_escalation.is_none())
        })
    }
}

fn capability_findings(
    id: CheckId,
    pod: &Pod,
    select: fn(&Capabilities) -> Option<&Vec<String>>,
) -> Vec<Finding> {
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };
    let workload = WorkloadRef::of(pod);

    all_containers(spec)
        .filter_map(|(_, container)| {
            let caps = container
                .security_context()
                .and_then(|sc| sc.capabilities.as_ref())
                .and_then(select)
                .filter(|caps| !caps.is_empty())?;
            Some(
                Finding::container_scoped(id, &workload, container.name())
                    .with_evidence(Evidence::Capabilities(caps.clone())),
            )
        })
        .collect()
}

/// Container adds Linux capabilities
pub struct AddedCapabilitiesRule;

impl Rule for AddedCapabilitiesRule {
    fn id(&self) -> CheckId {
        CheckId::AddedCaps
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        capability_findings(self.id(), pod, |caps| caps.add.as_ref())
    }
}

/// Container drops Linux capabilities
///
/// A hardening signal rather than a violation, surfaced like the other findings.
pub struct DroppedCapabilitiesRule;

impl Rule for DroppedCapabilitiesRule {
    fn id(&self) -> CheckId {
        CheckId::DroppedCaps
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        capability_findings(self.id(), pod, |caps| caps.drop.as_ref())
    }
}

/// Container requests an unmasked /proc mount
pub struct ProcMountRule;

impl Rule for ProcMountRule {
    fn id(&self) -> CheckId {
        CheckId::ProcMount
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        per_container(self.id(), pod, |container| {
            container
                .security_context()
                .and_then(|sc| sc.proc_mount.as_deref())
                == Some("Unmasked")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::pod;
    use serde_json::json;

    #[test]
    fn test_privileged_each_group_independently() {
        let p = pod(json!({
            "containers": [{ "name": "app", "securityContext": { "privileged": false } }],
            "initContainers": [{ "name": "init", "securityContext": { "privileged": true } }],
            "ephemeralContainers": [{ "name": "dbg", "securityContext": { "privileged": true } }]
        }));

        let names: Vec<_> = PrivilegedRule
            .check(&p)
            .into_iter()
            .filter_map(|f| f.container)
            .collect();

        assert_eq!(names, vec!["init", "dbg"]);
    }

    #[test]
    fn test_allow_priv_esc_defaults() {
        let p = pod(json!({
            "containers": [
                { "name": "no-context" },
                { "name": "empty-context", "securityContext": {} },
                { "name": "explicit-false", "securityContext": { "allowPrivilegeEscalation": false } },
                { "name": "explicit-true", "securityContext": { "allowPrivilegeEscalation": true } }
            ]
        }));

        let names: Vec<_> = AllowPrivilegeEscalationRule
            .check(&p)
            .into_iter()
            .filter_map(|f| f.container)
            .collect();

        assert_eq!(names, vec!["no-context", "empty-context"]);
    }

    #[test]
    fn test_capabilities_added_and_dropped() {
        let p = pod(json!({
            "containers": [{
                "name": "net",
                "securityContext": {
                    "capabilities": { "add": ["NET_ADMIN", "SYS_TIME"], "drop": ["ALL"] }
                }
            }],
            "initContainers": [{
                "name": "init",
                "securityContext": { "capabilities": { "add": [] } }
            }]
        }));

        let added = AddedCapabilitiesRule.check(&p);
        assert_eq!(added.len(), 1);
        assert_eq!(
            added[0].evidence,
            Some(Evidence::Capabilities(vec![
                "NET_ADMIN".to_string(),
                "SYS_TIME".to_string()
            ]))
        );

        let dropped = DroppedCapabilitiesRule.check(&p);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].container.as_deref(), Some("net"));
        assert_eq!(
            dropped[0].evidence,
            Some(Evidence::Capabilities(vec!["ALL".to_string()]))
        );
    }

    #[test]
    fn test_unmasked_proc_mount() {
        let p = pod(json!({
            "containers": [
                { "name": "default", "securityContext": { "procMount": "Default" } },
                { "name": "unmasked", "securityContext": { "procMount": "Unmasked" } }
            ]
        }));

        let findings = ProcMountRule.check(&p);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].container.as_deref(), Some("unmasked"));
    }
}
