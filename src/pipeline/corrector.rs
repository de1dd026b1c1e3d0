//! Error correction - produces a revised artifact from failed code and its
//! diagnostic output.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::CorrectionResult;
use crate::error::{Result, ScenegenError};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptRenderer, templates};

/// Raw corrector response.
#[derive(Debug, Deserialize)]
struct CorrectionResponse {
    fixed_code: String,
    explanation: Option<String>,
    changes_made: Option<Vec<String>>,
}

fn correction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fixed_code": {
                "type": "string",
                "description": "The corrected Manim code that should resolve the errors"
            },
            "explanation": {
                "type": "string",
                "description": "Explanation of what was fixed and why"
            },
            "changes_made": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of specific changes made to fix the code"
            }
        },
        "required": ["fixed_code"]
    })
}

/// Repairs failed Manim code from its render diagnostics. A corrector failure
/// aborts the whole request; there is nothing to render without a revision.
pub struct Corrector<L: LlmClient> {
    llm: Arc<L>,
    prompts: PromptRenderer,
}

impl<L: LlmClient> Corrector<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            prompts: PromptRenderer::new(),
        }
    }

    /// Produce a complete replacement for `code` that addresses
    /// `error_message`.
    pub async fn correct(&self, code: &str, error_message: &str) -> Result<CorrectionResult> {
        if error_message.trim().is_empty() {
            return Err(ScenegenError::InvalidState(
                "error message must not be empty".to_string(),
            ));
        }

        let mut context = HashMap::new();
        context.insert("code".to_string(), code.to_string());
        context.insert("error_message".to_string(), error_message.to_string());
        let user_message = self.prompts.render(templates::CORRECTOR_USER, &context)?;

        let request = CompletionRequest::new(templates::CORRECTOR_SYSTEM)
            .with_user_message(user_message)
            .with_response_schema(correction_schema());

        debug!("Requesting correction for {} bytes of code", code.len());
        let response = self.llm.complete(request).await?;

        if !response.finish_reason.is_complete() {
            return Err(ScenegenError::Generation(format!(
                "corrector response incomplete: {:?}",
                response.finish_reason
            )));
        }

        let parsed: CorrectionResponse = serde_json::from_str(&response.content).map_err(|e| {
            ScenegenError::Generation(format!("corrector returned malformed JSON: {}", e))
        })?;

        if parsed.fixed_code.trim().is_empty() {
            return Err(ScenegenError::Generation(
                "corrector returned empty code".to_string(),
            ));
        }

        let change_list = parsed.changes_made.unwrap_or_default();
        info!("Correction produced with {} listed changes", change_list.len());

        Ok(CorrectionResult {
            revised_code: parsed.fixed_code,
            rationale: parsed.explanation.unwrap_or_default(),
            change_list,
        })
    }
}
