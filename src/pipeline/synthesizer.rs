//! Code synthesis - turns a scene plan into a runnable Manim source artifact.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{ScenePlan, SourceArtifact};
use crate::error::{Result, ScenegenError};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptRenderer, templates};

/// Raw synthesizer response.
#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    code: String,
    explanation: Option<String>,
}

fn synthesis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "Complete valid Python code for the animation"
            },
            "explanation": {
                "type": "string",
                "description": "Explanation of the code"
            }
        },
        "required": ["code"]
    })
}

/// Synthesizes Manim source from a scene plan. Failures here are fatal; the
/// correction path only applies to execution failures, never synthesis ones.
pub struct CodeSynthesizer<L: LlmClient> {
    llm: Arc<L>,
    prompts: PromptRenderer,
}

impl<L: LlmClient> CodeSynthesizer<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            prompts: PromptRenderer::new(),
        }
    }

    /// Generate a source artifact implementing the plan.
    ///
    /// The returned artifact carries the plan's entry point identifier
    /// unchanged; the renderer depends on that continuity.
    pub async fn synthesize(&self, plan: &ScenePlan) -> Result<SourceArtifact> {
        let mut context = HashMap::new();
        context.insert("plan".to_string(), plan.narrative.clone());
        context.insert("class_name".to_string(), plan.entry_point_id.clone());
        let user_message = self.prompts.render(templates::SYNTHESIZER_USER, &context)?;

        let request = CompletionRequest::new(templates::SYNTHESIZER_SYSTEM)
            .with_user_message(user_message)
            .with_response_schema(synthesis_schema());

        debug!("Requesting code for scene {}", plan.entry_point_id);
        let response = self.llm.complete(request).await?;

        if !response.finish_reason.is_complete() {
            return Err(ScenegenError::Generation(format!(
                "synthesizer response incomplete: {:?}",
                response.finish_reason
            )));
        }

        let parsed: SynthesisResponse = serde_json::from_str(&response.content).map_err(|e| {
            ScenegenError::Generation(format!("synthesizer returned malformed JSON: {}", e))
        })?;

        if parsed.code.trim().is_empty() {
            return Err(ScenegenError::Generation(
                "synthesizer returned empty code".to_string(),
            ));
        }

        if !parsed.code.contains(&plan.entry_point_id) {
            warn!(
                "Generated code does not mention scene class {}; render will likely fail",
                plan.entry_point_id
            );
        }

        if let Some(explanation) = &parsed.explanation {
            debug!("Synthesizer explanation: {}", explanation);
        }

        info!("Initial code generation complete for {}", plan.entry_point_id);

        Ok(SourceArtifact {
            entry_point_id: plan.entry_point_id.clone(),
            code: parsed.code,
        })
    }
}
