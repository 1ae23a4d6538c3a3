//! Command implementations

pub mod analyze;
pub mod audit;
pub mod setup;

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use posture_lib::{KubeOptions, KubePodSource, NamespaceExclusion, WorkloadSource};
use tracing::info;

/// Connect to the cluster and take the workload snapshot for this run
pub async fn fetch_snapshot(options: &KubeOptions, exclude: &str) -> Result<Vec<Pod>> {
    let source = KubePodSource::connect(options, NamespaceExclusion::parse(exclude))
        .await
        .context("Failed to connect to the Kubernetes cluster")?;

    let pods = source
        .list_workloads()
        .await
        .context("Failed to list pods")?;

    info!(pods = pods.len(), "Workload snapshot ready");
    Ok(pods)
}
