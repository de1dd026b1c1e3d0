//! Generation pipeline - the bounded retry loop.
//!
//! Drives Planner -> Synthesizer -> (Render -> [on failure] Correct ->
//! Render ...) for one request. Render failures are recoverable and consume
//! correction cycles; planner, synthesizer, and corrector failures abort the
//! request with an error and no partial result. The attempt counter counts
//! completed correction cycles, so at most max_attempts + 1 renders happen.

use std::sync::Arc;

use log::{info, warn};

use crate::config::PipelineConfig;
use crate::domain::{CancelToken, GenerationOutcome, OutcomeStatus, SourceArtifact};
use crate::error::{Result, ScenegenError};
use crate::llm::LlmClient;
use crate::pipeline::{CodeSynthesizer, Corrector, Planner};
use crate::render::Renderer;

/// Stand-in diagnostic for the corrector when a failed render captured
/// nothing on either stream.
const NO_DIAGNOSTIC: &str = "(render failed with no diagnostic output)";

/// End-to-end generator for one topic at a time.
pub struct Pipeline<L: LlmClient, R: Renderer> {
    planner: Planner<L>,
    synthesizer: CodeSynthesizer<L>,
    corrector: Corrector<L>,
    renderer: Arc<R>,
    max_attempts: u32,
    cancel: CancelToken,
}

impl<L: LlmClient, R: Renderer> Pipeline<L, R> {
    /// Wire up a pipeline from a shared LLM client and a renderer.
    pub fn new(llm: Arc<L>, renderer: Arc<R>, config: &PipelineConfig) -> Self {
        Self {
            planner: Planner::new(Arc::clone(&llm)),
            synthesizer: CodeSynthesizer::new(Arc::clone(&llm)),
            corrector: Corrector::new(llm),
            renderer,
            max_attempts: config.max_attempts,
            cancel: CancelToken::new(),
        }
    }

    /// Token callers can use to stop the request at the next stage boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn check_cancelled(&self, stage: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(ScenegenError::Cancelled(format!("before {}", stage)))
        } else {
            Ok(())
        }
    }

    /// Generate an animation for the topic.
    ///
    /// Ok carries both terminal shapes: `Success` and `ExhaustedRetries`, each
    /// holding the last execution result verbatim. Err means a fatal stage
    /// failure (plan, synthesis, or correction) with no partial result.
    pub async fn generate(&self, topic: &str) -> Result<GenerationOutcome> {
        self.check_cancelled("planning")?;
        let plan = self.planner.plan(topic).await?;

        self.check_cancelled("synthesis")?;
        let mut artifact = self.synthesizer.synthesize(&plan).await?;
        debug_assert_eq!(artifact.entry_point_id, plan.entry_point_id);

        let mut attempts: u32 = 0;
        loop {
            self.check_cancelled("rendering")?;
            let result = self.renderer.render(&artifact, attempts).await?;

            if result.is_success() {
                info!(
                    "Generation of {} succeeded after {} correction cycle(s)",
                    plan.entry_point_id, attempts
                );
                return Ok(self.outcome(OutcomeStatus::Success, &plan, artifact, result, attempts));
            }

            if attempts >= self.max_attempts {
                warn!(
                    "Generation of {} exhausted {} correction cycle(s); reporting last failure",
                    plan.entry_point_id, attempts
                );
                return Ok(self.outcome(
                    OutcomeStatus::ExhaustedRetries,
                    &plan,
                    artifact,
                    result,
                    attempts,
                ));
            }

            info!(
                "Render of {} failed; correction attempt {}/{}",
                plan.entry_point_id,
                attempts + 1,
                self.max_attempts
            );

            let diagnostic = match result.diagnostic() {
                d if d.trim().is_empty() => NO_DIAGNOSTIC,
                d => d,
            };

            self.check_cancelled("correction")?;
            let correction = self.corrector.correct(&artifact.code, diagnostic).await?;

            // Whole-artifact replacement; identifier continuity preserved
            artifact = artifact.with_code(correction.revised_code);
            attempts += 1;
        }
    }

    fn outcome(
        &self,
        status: OutcomeStatus,
        plan: &crate::domain::ScenePlan,
        artifact: SourceArtifact,
        result: crate::domain::ExecutionResult,
        attempts: u32,
    ) -> GenerationOutcome {
        GenerationOutcome {
            status,
            entry_point_id: artifact.entry_point_id,
            final_code: artifact.code,
            narrative: plan.narrative.clone(),
            last_execution: result,
            attempts_used: attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionResult, ExecutionStatus};
    use crate::llm::{CompletionResponse, FinishReason, MockLlmClient};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted renderer that records every artifact it is asked to render.
    struct MockRenderer {
        results: Mutex<VecDeque<ExecutionResult>>,
        seen: Mutex<Vec<SourceArtifact>>,
    }

    impl MockRenderer {
        fn new(results: Vec<ExecutionResult>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn render_count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn seen_artifacts(&self) -> Vec<SourceArtifact> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Renderer for MockRenderer {
        async fn render(&self, artifact: &SourceArtifact, _attempt: u32) -> Result<ExecutionResult> {
            self.seen.lock().unwrap().push(artifact.clone());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ScenegenError::Render("mock render queue exhausted".to_string()))
        }
    }

    fn success(video: &str) -> ExecutionResult {
        ExecutionResult {
            status: ExecutionStatus::Success,
            stdout: "Animation completed".to_string(),
            stderr: None,
            video_path: Some(PathBuf::from(video)),
            duration: Duration::from_secs(3),
        }
    }

    fn failure(stderr: &str) -> ExecutionResult {
        ExecutionResult {
            status: ExecutionStatus::Failure,
            stdout: String::new(),
            stderr: Some(stderr.to_string()),
            video_path: None,
            duration: Duration::from_secs(1),
        }
    }

    fn json_response(content: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            content: content.to_string(),
            finish_reason: FinishReason::Stop,
            usage: Default::default(),
        }
    }

    fn plan_response() -> CompletionResponse {
        json_response(json!({
            "narrative": "Scene 1: a pendulum swings with narration",
            "class_name": "PendulumScene"
        }))
    }

    fn synthesis_response(code: &str) -> CompletionResponse {
        json_response(json!({ "code": code }))
    }

    fn correction_response(code: &str) -> CompletionResponse {
        json_response(json!({
            "fixed_code": code,
            "explanation": "fixed",
            "changes_made": ["one change"]
        }))
    }

    fn pipeline(
        llm: Arc<MockLlmClient>,
        renderer: Arc<MockRenderer>,
        max_attempts: u32,
    ) -> Pipeline<MockLlmClient, MockRenderer> {
        Pipeline::new(llm, renderer, &PipelineConfig { max_attempts })
    }

    #[tokio::test]
    async fn test_first_render_success_skips_corrector() {
        // Only plan + synthesis responses queued: a corrector call would error
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("class PendulumScene(Scene): pass"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![success("media/PendulumScene.mp4")]));

        let outcome = pipeline(Arc::clone(&llm), Arc::clone(&renderer), 3)
            .generate("pendulum motion")
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.attempts_used, 0);
        assert_eq!(outcome.entry_point_id, "PendulumScene");
        assert_eq!(renderer.render_count(), 1);
        assert_eq!(llm.call_count(), 2);
        assert!(outcome.video_path().unwrap().ends_with("PendulumScene.mp4"));
    }

    #[tokio::test]
    async fn test_scenario_a_fail_once_then_succeed() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
            correction_response("v2"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![
            failure("AttributeError: 'Circle' object has no attribute 'shift_to'"),
            success("media/PendulumScene.mp4"),
        ]));

        let outcome = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("pendulum motion")
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.attempts_used, 1);
        assert!(outcome.video_path().is_some());
        assert_eq!(outcome.final_code, "v2");
        assert_eq!(renderer.render_count(), 2);
    }

    #[tokio::test]
    async fn test_scenario_b_planner_failure_writes_nothing() {
        let llm = Arc::new(MockLlmClient::failing("simulated network error"));
        let renderer = Arc::new(MockRenderer::new(vec![]));

        let err = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap_err();

        assert!(matches!(err, ScenegenError::Llm(_)));
        // no artifact ever reached the renderer
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_scenario_c_exhausted_retries() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
            correction_response("v2"),
            correction_response("v3"),
            correction_response("v4"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![
            failure("error one"),
            failure("error two"),
            failure("error three"),
            failure("final stderr: NameError on line 7"),
        ]));

        let outcome = pipeline(Arc::clone(&llm), Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::ExhaustedRetries);
        assert_eq!(outcome.attempts_used, 3);
        // exactly max_attempts + 1 renders, max_attempts corrections
        assert_eq!(renderer.render_count(), 4);
        assert_eq!(llm.call_count(), 5);
        // last diagnostic preserved verbatim
        assert_eq!(
            outcome.last_execution.stderr.as_deref(),
            Some("final stderr: NameError on line 7")
        );
        assert!(outcome.video_path().is_none());
        assert_eq!(outcome.final_code, "v4");
    }

    #[tokio::test]
    async fn test_corrector_failure_is_fatal_not_exhaustion() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
        ]));
        llm.push_error("corrector upstream 500");
        let renderer = Arc::new(MockRenderer::new(vec![failure("boom")]));

        let err = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap_err();

        // an Err, clearly distinct from Ok(ExhaustedRetries)
        assert!(matches!(err, ScenegenError::Llm(_)));
        assert_eq!(renderer.render_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesizer_failure_never_renders() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            CompletionResponse {
                content: "not json".to_string(),
                finish_reason: FinishReason::Stop,
                usage: Default::default(),
            },
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![]));

        let err = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap_err();

        assert!(matches!(err, ScenegenError::Generation(_)));
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_correction_replaces_code_byte_for_byte() {
        let revised = "from manim import *\n\n# exact\tbytes  with  spacing\n";
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("original"),
            correction_response(revised),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![failure("err"), success("out.mp4")]));

        pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap();

        let seen = renderer.seen_artifacts();
        assert_eq!(seen[0].code, "original");
        // the second render received exactly the corrector's text
        assert_eq!(seen[1].code, revised);
    }

    #[tokio::test]
    async fn test_identifier_continuity_across_attempts() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
            correction_response("v2"),
            correction_response("v3"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![
            failure("e1"),
            failure("e2"),
            success("out.mp4"),
        ]));

        let outcome = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap();

        for artifact in renderer.seen_artifacts() {
            assert_eq!(artifact.entry_point_id, "PendulumScene");
        }
        assert_eq!(outcome.entry_point_id, "PendulumScene");
        assert_eq!(outcome.attempts_used, 2);
    }

    #[tokio::test]
    async fn test_empty_diagnostic_gets_placeholder() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
            correction_response("v2"),
        ]));
        let empty_failure = ExecutionResult {
            status: ExecutionStatus::Failure,
            stdout: String::new(),
            stderr: None,
            video_path: None,
            duration: Duration::from_secs(1),
        };
        let renderer = Arc::new(MockRenderer::new(vec![empty_failure, success("out.mp4")]));

        // would be InvalidState("error message must not be empty") without the
        // placeholder substitution
        let outcome = pipeline(llm, Arc::clone(&renderer), 3)
            .generate("anything")
            .await
            .unwrap();
        assert_eq!(outcome.attempts_used, 1);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_renders_once() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![failure("err")]));

        let outcome = pipeline(llm, Arc::clone(&renderer), 0)
            .generate("anything")
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::ExhaustedRetries);
        assert_eq!(outcome.attempts_used, 0);
        assert_eq!(renderer.render_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let llm = Arc::new(MockLlmClient::new(vec![plan_response()]));
        let renderer = Arc::new(MockRenderer::new(vec![]));
        let pipeline = pipeline(Arc::clone(&llm), Arc::clone(&renderer), 3);

        pipeline.cancel_token().cancel();

        let err = pipeline.generate("anything").await.unwrap_err();
        assert!(matches!(err, ScenegenError::Cancelled(_)));
        assert_eq!(llm.call_count(), 0);
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_narrative_carried_into_outcome() {
        let llm = Arc::new(MockLlmClient::new(vec![
            plan_response(),
            synthesis_response("v1"),
        ]));
        let renderer = Arc::new(MockRenderer::new(vec![success("out.mp4")]));

        let outcome = pipeline(llm, renderer, 3).generate("pendulum").await.unwrap();
        assert_eq!(outcome.narrative, "Scene 1: a pendulum swings with narration");
    }
}
