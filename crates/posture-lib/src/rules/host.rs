//! Host namespace, port, path and process checks

use super::{all_containers, per_container, Rule};
use crate::models::{CheckId, Evidence, Finding, WorkloadRef};
use k8s_openapi::api::core::v1::{Pod, PodSpec};

fn pod_flag(id: CheckId, pod: &Pod, flag: fn(&PodSpec) -> Option<bool>) -> Vec<Finding> {
    match pod.spec.as_ref().and_then(flag) {
        Some(true) => vec![Finding::pod_scoped(id, &WorkloadRef::of(pod))],
        _ => Vec::new(),
    }
}

/// Pod shares the host PID namespace
pub struct HostPidRule;

impl Rule for HostPidRule {
    fn id(&self) -> CheckId {
        CheckId::HostPid
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        pod_flag(self.id(), pod, |spec| spec.host_pid)
    }
}

/// Pod shares the host network namespace
pub struct HostNetworkRule;

impl Rule for HostNetworkRule {
    fn id(&self) -> CheckId {
        CheckId::HostNet
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        pod_flag(self.id(), pod, |spec| spec.host_network)
    }
}

/// Pod shares the host IPC namespace
pub struct HostIpcRule;

impl Rule for HostIpcRule {
    fn id(&self) -> CheckId {
        CheckId::HostIpc
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        pod_flag(self.id(), pod, |spec| spec.host_ipc)
    }
}

/// Container ports bound to a non-zero host port, one finding per port
pub struct HostPortsRule;

impl Rule for HostPortsRule {
    fn id(&self) -> CheckId {
        CheckId::HostPorts
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let Some(spec) = pod.spec.as_ref() else {
            return Vec::new();
        };
        let workload = WorkloadRef::of(pod);
        let mut findings = Vec::new();

        for (_, container) in all_containers(spec) {
            for port in container.ports() {
                match port.host_port {
                    Some(host_port) if host_port != 0 => findings.push(
                        Finding::container_scoped(self.id(), &workload, container.name())
                            .with_evidence(Evidence::HostPort(host_port)),
                    ),
                    _ => {}
                }
            }
        }

        findings
    }
}

/// Pod volumes backed by a host path
pub struct HostPathRule;

impl Rule for HostPathRule {
    fn id(&self) -> CheckId {
        CheckId::HostPath
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let Some(volumes) = pod.spec.as_ref().and_then(|spec| spec.volumes.as_ref()) else {
            return Vec::new();
        };
        let workload = WorkloadRef::of(pod);

        volumes
            .iter()
            .filter_map(|volume| {
                volume.host_path.as_ref().map(|host_path| {
                    Finding::pod_scoped(self.id(), &workload).with_evidence(Evidence::HostPath {
                        volume: volume.name.clone(),
                        path: host_path.path.clone(),
                    })
                })
            })
            .collect()
    }
}

/// Windows HostProcess enabled at pod or container level
///
/// The pod-level finding comes first, followed by container findings.
pub struct HostProcessRule;

impl Rule for HostProcessRule {
    fn id(&self) -> CheckId {
        CheckId::HostProcess
    }

    fn check(&self, pod: &Pod) -> Vec<Finding> {
        let pod_level = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.security_context.as_ref())
            .and_then(|sc| sc.windows_options.as_ref())
            .and_then(|opts| opts.host_process)
            .unwrap_or(false);

        let mut findings = Vec::new();
        if pod_level {
            findings.push(Finding::pod_scoped(self.id(), &WorkloadRef::of(pod)));
        }

        findings.extend(per_container(self.id(), pod, |container| {
            container
                .security_context()
                .and_then(|sc| sc.windows_options.as_ref())
                .and_then(|opts| opts.host_process)
                .unwrap_or(false)
        }));

        findings
    }
}
