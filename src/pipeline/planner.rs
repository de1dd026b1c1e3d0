//! Scene planning - turns a free-text topic into a structured scene plan.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{ScenePlan, is_valid_identifier};
use crate::error::{Result, ScenegenError};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptRenderer, templates};

/// Raw planner response, validated at the boundary before it becomes a plan.
#[derive(Debug, Deserialize)]
struct PlanResponse {
    narrative: String,
    class_name: String,
}

/// JSON schema the planner response must conform to.
fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "narrative": {
                "type": "string",
                "description": "Detailed scene-by-scene plan for the animation"
            },
            "class_name": {
                "type": "string",
                "description": "Python class name for the scene"
            }
        },
        "required": ["narrative", "class_name"]
    })
}

/// Plans animation scenes from a topic. Planner failures are fatal to the
/// request; the orchestrator never retries them.
pub struct Planner<L: LlmClient> {
    llm: Arc<L>,
    prompts: PromptRenderer,
}

impl<L: LlmClient> Planner<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            prompts: PromptRenderer::new(),
        }
    }

    /// Plan scenes for a topic.
    pub async fn plan(&self, topic: &str) -> Result<ScenePlan> {
        if topic.trim().is_empty() {
            return Err(ScenegenError::InvalidState(
                "topic must not be empty".to_string(),
            ));
        }

        let mut context = HashMap::new();
        context.insert("topic".to_string(), topic.to_string());
        let user_message = self.prompts.render(templates::PLANNER_USER, &context)?;

        let request = CompletionRequest::new(templates::PLANNER_SYSTEM)
            .with_user_message(user_message)
            .with_response_schema(plan_schema());

        debug!("Requesting scene plan for topic: {}", topic);
        let response = self.llm.complete(request).await?;

        if !response.finish_reason.is_complete() {
            return Err(ScenegenError::Generation(format!(
                "planner response incomplete: {:?}",
                response.finish_reason
            )));
        }

        let parsed: PlanResponse = serde_json::from_str(&response.content)
            .map_err(|e| ScenegenError::Generation(format!("planner returned malformed JSON: {}", e)))?;

        if parsed.narrative.trim().is_empty() {
            return Err(ScenegenError::Generation(
                "planner returned an empty narrative".to_string(),
            ));
        }

        if !is_valid_identifier(&parsed.class_name) {
            return Err(ScenegenError::Generation(format!(
                "planner returned an invalid class name: {:?}",
                parsed.class_name
            )));
        }

        info!("Scene planning complete: {}", parsed.class_name);

        Ok(ScenePlan {
            narrative: parsed.narrative,
            entry_point_id: parsed.class_name,
        })
    }
}
