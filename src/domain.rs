//! Domain types for the generation pipeline.
//!
//! A request flows through four shapes: a `ScenePlan` from the planner, a
//! `SourceArtifact` per attempt, an `ExecutionResult` per render call, and a
//! `CorrectionResult` per correction cycle. The orchestrator assembles a
//! `GenerationOutcome` from the survivors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Structured plan for the animation, produced once per request.
///
/// Immutable after planning; `entry_point_id` names the scene class that every
/// later stage (file naming, manim invocation, output scan) keys on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePlan {
    /// Scene-by-scene narrative: visual elements, layout, motion, narration
    pub narrative: String,
    /// Class name for the scene, a syntactically valid Python identifier
    pub entry_point_id: String,
}

/// A complete runnable source artifact for one render attempt.
///
/// Corrections replace the whole artifact with a new value; code is never
/// patched in place, so earlier attempts stay inspectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    /// Scene class name, identical across every version for a request
    pub entry_point_id: String,
    /// Full source text
    pub code: String,
}

impl SourceArtifact {
    /// Build the next version of this artifact from replacement code.
    pub fn with_code(&self, code: impl Into<String>) -> Self {
        Self {
            entry_point_id: self.entry_point_id.clone(),
            code: code.into(),
        }
    }

    /// Source file name the renderer writes this artifact to.
    pub fn file_name(&self) -> String {
        format!("{}.py", self.entry_point_id)
    }
}

/// Whether a render attempt succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure,
}

/// Result of one render invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr; None when the process wrote nothing to it
    pub stderr: Option<String>,
    /// Located output video; None on failure or degenerate success
    pub video_path: Option<PathBuf>,
    /// Wall-clock duration of the render call
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Diagnostic text for the corrector: stderr when populated, otherwise
    /// stdout (manim reports some tracebacks there).
    pub fn diagnostic(&self) -> &str {
        match self.stderr.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.stdout,
        }
    }
}

/// Revised artifact produced by the corrector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Complete replacement source, not a diff
    pub revised_code: String,
    /// What was wrong and how it was fixed
    pub rationale: String,
    /// Ordered list of specific changes
    pub change_list: Vec<String>,
}

/// Terminal status of a generation request that produced a result.
///
/// Fatal conditions (planner/synthesizer/corrector failures) are errors, not
/// outcomes; they carry no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The last render exited cleanly
    Success,
    /// max_attempts correction cycles completed without a clean render
    ExhaustedRetries,
}

/// Final result of a generation request.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub status: OutcomeStatus,
    /// Scene class name, identical to the plan's
    pub entry_point_id: String,
    /// Code that produced the last render attempt
    pub final_code: String,
    /// The planner's narrative, unchanged
    pub narrative: String,
    /// The last render's result, success or failure, diagnostics verbatim
    pub last_execution: ExecutionResult,
    /// Completed correction cycles (0 when the first render succeeded)
    pub attempts_used: u32,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Path of the rendered video, when one was located.
    pub fn video_path(&self) -> Option<&Path> {
        self.last_execution.video_path.as_deref()
    }
}

/// Check that a scene class name is a syntactically valid identifier:
/// ASCII letter or underscore first, ASCII alphanumerics or underscores after.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Cooperative cancellation flag for a generation request.
///
/// The pipeline checks it before starting each stage; an in-flight LLM call or
/// render is never interrupted, only the next stage is skipped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
