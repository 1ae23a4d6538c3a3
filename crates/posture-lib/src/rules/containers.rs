//! Uniform access to the three container groups of a pod

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EphemeralContainer, PodSpec, SecurityContext,
};
use serde::Serialize;

/// Which group a container was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRole {
    Primary,
    Init,
    Ephemeral,
}

/// Fields shared by regular and ephemeral containers
pub trait ContainerLike {
    fn name(&self) -> &str;
    fn security_context(&self) -> Option<&SecurityContext>;
    fn ports(&self) -> &[ContainerPort];
}

impl ContainerLike for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn security_context(&self) -> Option<&SecurityContext> {
        self.security_context.as_ref()
    }

    fn ports(&self) -> &[ContainerPort] {
        self.ports.as_deref().unwrap_or_default()
    }
}

impl ContainerLike for EphemeralContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn security_context(&self) -> Option<&SecurityContext> {
        self.security_context.as_ref()
    }

    fn ports(&self) -> &[ContainerPort] {
        self.ports.as_deref().unwrap_or_default()
    }
}

/// Iterate every container of a pod spec, primary then init then ephemeral,
/// each group in declaration order.
pub fn all_containers(
    spec: &PodSpec,
) -> impl Iterator<Item = (ContainerRole, &dyn ContainerLike)> + '_ {
    let primary = spec
        .containers
        .iter()
        .map(|c| (ContainerRole::Primary, c as &dyn ContainerLike));
    let init = spec
        .init_containers
        .iter()
        .flatten()
        .map(|c| (ContainerRole::Init, c as &dyn ContainerLike));
    let ephemeral = spec
        .ephemeral_containers
        .iter()
        .flatten()
        .map(|c| (ContainerRole::Ephemeral, c as &dyn ContainerLike));

    primary.chain(init).chain(ephemeral)
}
