//! Workload snapshot provider
//!
//! Lists pods from the cluster once per run and applies the caller's
//! namespace exclusions. Connectivity failures are fatal and surface before
//! any workload is evaluated.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use std::ffi::OsStr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("Failed to infer Kubernetes config: {0}")]
    Infer(#[from] kube::config::InferConfigError),

    #[error("Failed to create Kubernetes client: {0}")]
    Client(#[source] kube::Error),

    #[error("Failed to list pods: {0}")]
    List(#[source] kube::Error),
}

/// Source of the workload collection evaluated by a run
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    async fn list_workloads(&self) -> Result<Vec<Pod>, SnapshotError>;
}

/// Cluster connection options
#[derive(Debug, Clone, Default)]
pub struct KubeOptions {
    /// Explicit kubeconfig path or path list; inferred when unset
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Restrict listing to one namespace
    pub namespace: Option<String>,
}

/// Comma-separated namespace exclusion list
///
/// A pod is excluded when its namespace contains any listed fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceExclusion {
    fragments: Vec<String>,
}

impl NamespaceExclusion {
    pub fn parse(list: &str) -> Self {
        let fragments = list
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        Self { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn excludes(&self, namespace: &str) -> bool {
        self.fragments.iter().any(|f| namespace.contains(f.as_str()))
    }

    /// Drop excluded pods, keeping the order of the rest
    pub fn filter(&self, pods: Vec<Pod>) -> Vec<Pod> {
        if self.is_empty() {
            return pods;
        }
        pods.into_iter()
            .filter(|pod| !self.excludes(pod.metadata.namespace.as_deref().unwrap_or_default()))
            .collect()
    }
}

/// Read a kubeconfig path list (`a:b` on Unix), merging the files in order
///
/// The first file that sets a field wins, as with kubectl.
fn read_kubeconfig(paths: &OsStr) -> Result<Kubeconfig, SnapshotError> {
    let mut merged: Option<Kubeconfig> = None;
    for path in std::env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()) {
        let next = Kubeconfig::read_from(&path)?;
        merged = Some(match merged {
            Some(current) => current.merge(next)?,
            None => next,
        });
    }

    match merged {
        Some(kubeconfig) => Ok(kubeconfig),
        None => Ok(Kubeconfig::read()?),
    }
}

/// Resolve the client configuration for `options`
///
/// Without an explicit path or context, `KUBECONFIG`, the default file and
/// in-cluster settings are tried through `Config::infer`.
pub async fn resolve_config(options: &KubeOptions) -> Result<Config, SnapshotError> {
    let config = match (&options.kubeconfig, &options.context) {
        (None, None) => Config::infer().await?,
        (path, context) => {
            let kubeconfig = match path {
                Some(path) => read_kubeconfig(path.as_os_str())?,
                None => Kubeconfig::read()?,
            };
            let kube_options = KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(kubeconfig, &kube_options).await?
        }
    };
    Ok(config)
}

/// Lists pods through the Kubernetes API
pub struct KubePodSource {
    client: Client,
    namespace: Option<String>,
    exclusion: NamespaceExclusion,
}

impl KubePodSource {
    /// Connect using the kubeconfig and context in `options`
    pub async fn connect(
        options: &KubeOptions,
        exclusion: NamespaceExclusion,
    ) -> Result<Self, SnapshotError> {
        let config = resolve_config(options).await?;

        debug!(cluster_url = %config.cluster_url, "Kubernetes config resolved");
        let client = Client::try_from(config).map_err(SnapshotError::Client)?;

        Ok(Self {
            client,
            namespace: options.namespace.clone(),
            exclusion,
        })
    }
}

#[async_trait]
impl WorkloadSource for KubePodSource {
    async fn list_workloads(&self) -> Result<Vec<Pod>, SnapshotError> {
        let api: Api<Pod> = match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let listed = api
            .list(&ListParams::default())
            .await
            .map_err(SnapshotError::List)?
            .items;
        let total = listed.len();
        let pods = self.exclusion.filter(listed);

        info!(
            listed = total,
            excluded = total - pods.len(),
            namespace = self.namespace.as_deref().unwrap_or("*"),
            "Workload snapshot fetched"
        );
        Ok(pods)
    }
}

/// Fixed in-memory snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pods: Vec<Pod>,
}

impl StaticSource {
    pub fn new(pods: Vec<Pod>) -> Self {
        Self { pods }
    }
}

#[async_trait]
impl WorkloadSource for StaticSource {
    async fn list_workloads(&self) -> Result<Vec<Pod>, SnapshotError> {
        Ok(self.pods.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_in(namespace: &str, name: &str) -> Pod {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": namespace },
            "spec": { "containers": [{ "name": "app" }] }
        }))
        .unwrap()
    }

    fn names(pods: &[Pod]) -> Vec<String> {
        pods.iter()
            .map(|p| p.metadata.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_parse_ignores_empty_fragments() {
        let exclusion = NamespaceExclusion::parse(" kube-system, ,monitoring,");
        assert_eq!(exclusion.fragments(), ["kube-system", "monitoring"]);

        assert!(NamespaceExclusion::parse("").is_empty());
        assert!(NamespaceExclusion::parse(",,").is_empty());
    }

    #[test]
    fn test_exclusion_uses_substring_match() {
        let exclusion = NamespaceExclusion::parse("kube");
        assert!(exclusion.excludes("kube-system"));
        assert!(exclusion.excludes("kube-public"));
        assert!(!exclusion.excludes("default"));
    }

    #[test]
    fn test_filter_keeps_order() {
        let pods = vec![
            pod_in("default", "a"),
            pod_in("kube-system", "b"),
            pod_in("shop", "c"),
            pod_in("monitoring", "d"),
            pod_in("default", "e"),
        ];

        let kept = NamespaceExclusion::parse("kube-system,monitor").filter(pods);
        assert_eq!(names(&kept), ["a", "c", "e"]);
    }

    #[test]
    fn test_empty_exclusion_keeps_everything() {
        let pods = vec![pod_in("kube-system", "a"), pod_in("default", "b")];
        let kept = NamespaceExclusion::default().filter(pods);
        assert_eq!(kept.len(), 2);
    }

    fn kubeconfig(name: &str) -> String {
        format!(
            "apiVersion: v1
kind: Config
clusters:
- name: {name}
  cluster:
    server: https://{name}.example.com:6443
contexts:
- name: {name}
  context:
    cluster: {name}
    user: {name}
    namespace: team-{name}
users:
- name: {name}
  user:
    token: {name}-token
current-context: {name}
"
        )
    }

    fn kubeconfig_list(dir: &tempfile::TempDir) -> PathBuf {
        let alpha = dir.path().join("alpha.yaml");
        let beta = dir.path().join("beta.yaml");
        std::fs::write(&alpha, kubeconfig("alpha")).unwrap();
        std::fs::write(&beta, kubeconfig("beta")).unwrap();
        PathBuf::from(std::env::join_paths([alpha, beta]).unwrap())
    }

    #[tokio::test]
    async fn test_kubeconfig_path_list_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let options = KubeOptions {
            kubeconfig: Some(kubeconfig_list(&dir)),
            context: Some("beta".to_string()),
            namespace: None,
        };

        let config = resolve_config(&options).await.unwrap();

        assert_eq!(config.cluster_url.host(), Some("beta.example.com"));
        assert_eq!(config.default_namespace, "team-beta");
    }

    #[tokio::test]
    async fn test_kubeconfig_path_list_uses_first_current_context() {
        let dir = tempfile::tempdir().unwrap();
        let options = KubeOptions {
            kubeconfig: Some(kubeconfig_list(&dir)),
            ..Default::default()
        };

        let config = resolve_config(&options).await.unwrap();

        assert_eq!(config.cluster_url.host(), Some("alpha.example.com"));
        assert_eq!(config.default_namespace, "team-alpha");
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = KubeOptions {
            kubeconfig: Some(dir.path().join("absent.yaml")),
            ..Default::default()
        };

        assert!(matches!(
            resolve_config(&options).await,
            Err(SnapshotError::Kubeconfig(_))
        ));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new(vec![pod_in("default", "web")]);
        let pods = source.list_workloads().await.unwrap();
        assert_eq!(names(&pods), ["web"]);
    }
}
