//! Paced sequential analysis of a workload snapshot

use super::{interpret, AnalysisError, ChatClient, Interpretation, PromptBuilder};
use crate::models::{AnalysisResult, WorkloadRef};
use crate::observability::AuditLogger;
use k8s_openapi::api::core::v1::Pod;
use std::sync::Arc;
use std::time::Duration;

/// Delay between consecutive remote calls
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Sends workloads to the model one at a time
///
/// Calls are strictly sequential. A failed call drops that workload from the
/// batch; an unparseable reply is kept as an `UNKNOWN` result.
pub struct SecurityAnalyzer {
    client: Arc<dyn ChatClient>,
    prompts: PromptBuilder,
    pacing: Duration,
    logger: AuditLogger,
}

impl SecurityAnalyzer {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        let prompts = PromptBuilder::new(client.model());
        Self {
            client,
            prompts,
            pacing: DEFAULT_PACING,
            logger: AuditLogger::default(),
        }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_logger(mut self, logger: AuditLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Analyze a single workload
    ///
    /// Errors only when no usable reply was received. A reply that does not
    /// match the expected schema still yields an `Interpretation`.
    pub async fn analyze(&self, pod: &Pod) -> Result<Interpretation, AnalysisError> {
        let workload = WorkloadRef::of(pod);
        let request = self.prompts.build(pod)?;
        let completion = self.client.complete(&request).await?;
        let content = completion.first_content()?;

        let interpretation = interpret(&workload, content);
        if let Interpretation::Fallback { reason, .. } = &interpretation {
            self.logger.log_response_unparsed(&workload, reason, content);
        }

        let result = interpretation.result();
        self.logger
            .log_workload_analyzed(&workload, result.security_level, result.issues.len());

        Ok(interpretation)
    }

    /// Analyze every workload in snapshot order
    ///
    /// The output keeps input order and omits skipped workloads, so it may be
    /// shorter than `pods`.
    pub async fn analyze_all(&self, pods: &[Pod]) -> Vec<AnalysisResult> {
        let total = pods.len();
        self.logger.log_analysis_started(total, self.prompts.model());

        let mut results = Vec::with_capacity(total);
        for (index, pod) in pods.iter().enumerate() {
            let workload = WorkloadRef::of(pod);
            self.logger.log_workload_progress(index + 1, total, &workload);

            match self.analyze(pod).await {
                Ok(interpretation) => results.push(interpretation.into_result()),
                Err(e) => self.logger.log_workload_skipped(&workload, &e),
            }

            if index + 1 < total && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        self.logger.log_analysis_completed(results.len(), total);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatChoice, ChatCompletion, ChatMessage, ChatRequest};
    use crate::models::SecurityLevel;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Replays canned replies in order and records the prompts it saw
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<ChatCompletion, AnalysisError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<ChatCompletion, AnalysisError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AnalysisError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AnalysisError::EmptyResponse))
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn reply(content: &str) -> Result<ChatCompletion, AnalysisError> {
        Ok(ChatCompletion {
            model: Some("test-model".to_string()),
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: content.to_string(),
                },
            }],
            usage: None,
        })
    }

    fn pod(name: &str) -> Pod {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": "default" },
            "spec": { "containers": [{ "name": "app", "image": "nginx:1.25" }] }
        }))
        .unwrap()
    }

    const SAFE: &str = r#"{"security_level":"SAFE","issues":[],"recommendations":[]}"#;
    const CRITICAL: &str =
        r#"{"security_level":"CRITICAL","issues":["privileged"],"recommendations":["drop it"]}"#;

    #[tokio::test]
    async fn test_failed_call_is_skipped() {
        let client = Arc::new(ScriptedClient::new(vec![
            reply(SAFE),
            Err(AnalysisError::Api {
                status: 500,
                body: "boom".to_string(),
            }),
            reply(&format!("```json\n{}\n```", CRITICAL)),
        ]));
        let analyzer = SecurityAnalyzer::new(client.clone()).with_pacing(Duration::ZERO);

        let results = analyzer
            .analyze_all(&[pod("first"), pod("second"), pod("third")])
            .await;

        assert_eq!(client.calls(), 3);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].pod, "first");
        assert_eq!(results[0].security_level, SecurityLevel::Safe);
        assert_eq!(results[1].pod, "third");
        assert_eq!(results[1].security_level, SecurityLevel::Critical);
    }

    #[tokio::test]
    async fn test_unparsed_reply_is_kept() {
        let client = Arc::new(ScriptedClient::new(vec![
            reply("I think this pod is fine."),
            reply(SAFE),
        ]));
        let analyzer = SecurityAnalyzer::new(client).with_pacing(Duration::ZERO);

        let results = analyzer.analyze_all(&[pod("chatty"), pod("quiet")]).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].security_level, SecurityLevel::Unknown);
        assert!(results[0].issues[0].starts_with("AI analysis failed to parse response"));
        assert_eq!(results[1].security_level, SecurityLevel::Safe);
    }

    #[tokio::test]
    async fn test_empty_choices_is_skipped() {
        let empty = Ok(ChatCompletion {
            model: None,
            choices: Vec::new(),
            usage: None,
        });
        let client = Arc::new(ScriptedClient::new(vec![empty, reply(SAFE)]));
        let analyzer = SecurityAnalyzer::new(client).with_pacing(Duration::ZERO);

        let results = analyzer.analyze_all(&[pod("a"), pod("b")]).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pod, "b");
    }

    #[tokio::test]
    async fn test_requests_use_client_model() {
        let client = Arc::new(ScriptedClient::new(vec![reply(SAFE)]));
        let analyzer = SecurityAnalyzer::new(client.clone());

        analyzer.analyze(&pod("web")).await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].model, "test-model");
        assert!(requests[0].messages[0].content.contains("\"name\": \"web\""));
    }

    #[tokio::test]
    async fn test_pacing_between_calls() {
        let pacing = Duration::from_millis(40);
        let client = Arc::new(ScriptedClient::new(vec![
            reply(SAFE),
            Err(AnalysisError::EmptyResponse),
            reply(SAFE),
        ]));
        let analyzer = SecurityAnalyzer::new(client).with_pacing(pacing);

        let started = Instant::now();
        let results = analyzer.analyze_all(&[pod("a"), pod("b"), pod("c")]).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 2);
        assert!(elapsed >= pacing * 2, "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_empty_snapshot_makes_no_calls() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let analyzer = SecurityAnalyzer::new(client.clone());

        let results = analyzer.analyze_all(&[]).await;

        assert!(results.is_empty());
        assert_eq!(client.calls(), 0);
    }
}
