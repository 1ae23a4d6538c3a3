//! Analysis prompt construction

use super::{AnalysisError, ChatRequest};
use k8s_openapi::api::core::v1::Pod;

/// Token budget for one analysis reply
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Near-deterministic sampling
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

const WORKLOAD_PLACEHOLDER: &str = "{workload}";

const ANALYSIS_TEMPLATE: &str = r#"As a Kubernetes security expert, analyze the security configuration of the following Pod. Focus on these security concerns:

1. Privileged containers
2. Use of hostNetwork, hostPID and hostIPC
3. Unsafe volume mounts (hostPath volumes)
4. Privilege escalation (allowPrivilegeEscalation)
5. Added and dropped Linux capabilities
6. Security context configuration
7. Resource limits and requests
8. Image security (latest tags, unofficial images, etc.)
9. seccomp and AppArmor configuration
10. Network policy and port exposure

Pod configuration:
{workload}

Return the analysis as JSON with exactly these fields:
- security_level: one of "SAFE", "MODERATE", "HIGH_RISK", "CRITICAL"
- issues: list of security issues found
- recommendations: list of security improvement recommendations

Return only JSON, with no other text."#;

/// Builds the analysis request for a single workload
///
/// Pure: no I/O, and the same pod always yields the same request.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl PromptBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Pretty-printed JSON of the pod, without server-side field bookkeeping
    pub fn serialize_workload(pod: &Pod) -> Result<String, AnalysisError> {
        let mut pod = pod.clone();
        pod.metadata.managed_fields = None;
        Ok(serde_json::to_string_pretty(&pod)?)
    }

    /// Prompt text for the pod
    pub fn render(&self, pod: &Pod) -> Result<String, AnalysisError> {
        let workload = Self::serialize_workload(pod)?;
        Ok(ANALYSIS_TEMPLATE.replacen(WORKLOAD_PLACEHOLDER, &workload, 1))
    }

    /// Complete request for the pod
    pub fn build(&self, pod: &Pod) -> Result<ChatRequest, AnalysisError> {
        let prompt = self.render(pod)?;
        Ok(ChatRequest::single_user(&self.model, prompt, self.max_tokens)
            .with_temperature(self.temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_pod() -> Pod {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web",
                "namespace": "shop",
                "managedFields": [{ "manager": "kubectl", "operation": "Apply" }]
            },
            "spec": {
                "hostNetwork": true,
                "containers": [{ "name": "nginx", "image": "nginx:latest" }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_prompt_embeds_workload_and_schema() {
        let prompt = PromptBuilder::new("gpt-4o").render(&sample_pod()).unwrap();

        assert!(prompt.contains("\"name\": \"web\""));
        assert!(prompt.contains("\"hostNetwork\": true"));
        assert!(prompt.contains("security_level"));
        assert!(prompt.contains("recommendations"));
        assert!(prompt.contains("10. Network policy"));
        assert!(!prompt.contains(WORKLOAD_PLACEHOLDER));
        assert!(!prompt.contains("managedFields"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new("gpt-4o").with_max_tokens(1500);
        let first = builder.build(&sample_pod()).unwrap();
        let second = builder.build(&sample_pod()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.model, "gpt-4o");
        assert_eq!(first.max_tokens, 1500);
        assert_eq!(first.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(first.messages.len(), 1);
        assert_eq!(first.messages[0].role, "user");
    }
}
