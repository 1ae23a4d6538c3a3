//! Seccomp, AppArmor and sysctl checks

use super::{per_container, Rule};
use crate::models::{CheckId, Evidence, Finding, WorkloadRef};
use k8s_openapi::api::core::v1::{Pod, SeccompProfile};

/// Sysctls allowed by the baseline profile
pub const SAFE_SYSCTLS: &[&str] = &[
    "kernel.shm_rmid_forced",
    "net.ipv4.ip_local_port_range",
    "net.ipv4.ip_unprivileged_port_start",
    "net.ipv4.tcp_syncookies",
    "net.ipv4.ping_group_range",
];

const APPARMOR_ANNOTATION_PREFIX: &str = "container.apparmor.security.beta.kubernetes.io";

fn unconfined(profile: Option<&SeccompProfile>) -> bool {
    match profile {
        None => true,
        Some(profile) => profile.type_.is_empty() || profile.type_ == "Unconfined",
    }
}

/// Seccomp disabled for a container inside a pod that is itself unconfined
///
/// Containers of a pod with a pod-level profile are never reported, even when
/// they set no profile of their own.
pub struct SeccompRule;

impl Rule for SeccompRule {
    fn id(&self) -> CheckId {
        CheckId::Seccomp
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let pod_profile = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.security_context.as_ref())
            .and_then(|sc| sc.seccomp_profile.as_ref());

        if !unconfined(pod_profile) {
            return Vec::new();
        }

        per_container(self.id(), pod, |container| {
            unconfined(
                container
                    .security_context()
                    .and_then(|sc| sc.seccomp_profile.as_ref()),
            )
        })
    }
}

/// AppArmor explicitly set to unconfined through the beta annotation
///
/// The container is taken from the annotation key suffix.
pub struct AppArmorRule;

impl Rule for AppArmorRule {
    fn id(&self) -> CheckId {
        CheckId::AppArmor
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let Some(annotations) = pod.metadata.annotations.as_ref() else {
            return Vec::new();
        };
        let workload = WorkloadRef::of(pod);

        annotations
            .iter()
            .filter(|(_, value)| value.as_str() == "unconfined")
            .filter_map(|(key, _)| {
                let (prefix, container) = key.split_once('/').unwrap_or((key.as_str(), ""));
                if prefix != APPARMOR_ANNOTATION_PREFIX {
                    return None;
                }
                Some(if container.is_empty() {
                    Finding::pod_scoped(self.id(), &workload)
                } else {
                    Finding::container_scoped(self.id(), &workload, container)
                })
            })
            .collect()
    }
}

/// Pod-level sysctls outside the safe set
pub struct SysctlRule;

impl Rule for SysctlRule {
    fn id(&self) -> CheckId {
        CheckId::Sysctl
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let Some(sysctls) = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.security_context.as_ref())
            .and_then(|sc| sc.sysctls.as_ref())
        else {
            return Vec::new();
        };
        let workload = WorkloadRef::of(pod);

        sysctls
            .iter()
            .filter(|sysctl| !SAFE_SYSCTLS.contains(&sysctl.name.as_str()))
            .map(|sysctl| {
                Finding::pod_scoped(self.id(), &workload)
                    .with_evidence(Evidence::Sysctl(sysctl.name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::{pod, pod_with_annotations};
    use serde_json::json;

    #[test]
    fn test_seccomp_gated_by_pod_profile() {
        let confined_pod = pod(json!({
            "securityContext": { "seccompProfile": { "type": "RuntimeDefault" } },
            "containers": [{ "name": "app" }]
        }));
        assert!(SeccompRule.check(&confined_pod).is_empty());

        let unconfined_pod = pod(json!({
            "securityContext": { "seccompProfile": { "type": "Unconfined" } },
            "containers": [
                { "name": "app" },
                { "name": "hardened", "securityContext": { "seccompProfile": { "type": "RuntimeDefault" } } },
                { "name": "explicit", "securityContext": { "seccompProfile": { "type": "Unconfined" } } }
            ]
        }));
        let names: Vec<_> = SeccompRule
            .check(&unconfined_pod)
            .into_iter()
            .filter_map(|f| f.container)
            .collect();
        assert_eq!(names, vec!["app", "explicit"]);

        let empty_type_pod = pod(json!({
            "securityContext": { "seccompProfile": { "type": "" } },
            "containers": [
                { "name": "blank", "securityContext": { "seccompProfile": { "type": "" } } },
                { "name": "localhost", "securityContext": { "seccompProfile": { "type": "Localhost", "localhostProfile": "audit.json" } } }
            ]
        }));
        let names: Vec<_> = SeccompRule
            .check(&empty_type_pod)
            .into_iter()
            .filter_map(|f| f.container)
            .collect();
        assert_eq!(names, vec!["blank"]);
    }

    #[test]
    fn test_seccomp_without_pod_security_context() {
        let p = pod(json!({
            "containers": [{ "name": "app" }],
            "initContainers": [{ "name": "init", "securityContext": { "runAsNonRoot": true } }]
        }));

        assert_eq!(SeccompRule.check(&p).len(), 2);
    }

    #[test]
    fn test_apparmor_unconfined_annotation() {
        let p = pod_with_annotations(
            json!({
                "container.apparmor.security.beta.kubernetes.io/app": "unconfined",
                "container.apparmor.security.beta.kubernetes.io/sidecar": "runtime/default",
                "example.com/other": "unconfined"
            }),
            json!({ "containers": [{ "name": "app" }, { "name": "sidecar" }] }),
        );

        let findings = AppArmorRule.check(&p);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].container.as_deref(), Some("app"));
    }

    #[test]
    fn test_apparmor_bare_prefix_is_pod_scoped() {
        let p = pod_with_annotations(
            json!({
                "container.apparmor.security.beta.kubernetes.io": "unconfined",
                "container.apparmor.security.beta.kubernetes.io/": "runtime/default"
            }),
            json!({ "containers": [{ "name": "app" }] }),
        );

        let findings = AppArmorRule.check(&p);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check, CheckId::AppArmor);
        assert_eq!(findings[0].pod, "test-pod");
        assert!(findings[0].container.is_none());
    }

    #[test]
    fn test_unsafe_sysctls() {
        let p = pod(json!({
            "securityContext": {
                "sysctls": [
                    { "name": "net.ipv4.tcp_syncookies", "value": "1" },
                    { "name": "kernel.msgmax", "value": "65536" },
                    { "name": "net.core.somaxconn", "value": "1024" }
                ]
            },
            "containers": [{ "name": "app" }]
        }));

        let sysctls: Vec<_> = SysctlRule
            .check(&p)
            .into_iter()
            .map(|f| {
                assert_eq!(f.pod, "test-pod");
                f.evidence.unwrap()
            })
            .collect();

        assert_eq!(
            sysctls,
            vec![
                Evidence::Sysctl("kernel.msgmax".to_string()),
                Evidence::Sysctl("net.core.somaxconn".to_string()),
            ]
        );
    }
}
