//! Render execution - runs the manim engine against a source artifact.
//!
//! The renderer writes the artifact to disk, spawns manim as a child process
//! with a per-attempt media directory, and reports the exit status, captured
//! output, and located video as an ExecutionResult. A nonzero exit is a
//! result, not an error; only failure to manage the process itself is an Err.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;

use crate::config::RenderConfig;
use crate::domain::{ExecutionResult, ExecutionStatus, SourceArtifact};
use crate::error::{Result, ScenegenError};
use crate::render::output;

/// Executes a source artifact and reports the outcome.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render one attempt of the artifact. `attempt` keys the output directory
    /// so repeated attempts never share one.
    async fn render(&self, artifact: &SourceArtifact, attempt: u32) -> Result<ExecutionResult>;
}

/// Renderer backed by the manim CLI.
pub struct ManimRenderer {
    config: RenderConfig,
}

impl ManimRenderer {
    /// Create a new renderer with the given config.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments for one render invocation.
    fn render_args(&self, file_name: &str, entry_point_id: &str, media_dir: &Path) -> Vec<String> {
        vec![
            self.config.quality_flag.clone(),
            "--media_dir".to_string(),
            media_dir.to_string_lossy().to_string(),
            file_name.to_string(),
            entry_point_id.to_string(),
        ]
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }
}

#[async_trait]
impl Renderer for ManimRenderer {
    async fn render(&self, artifact: &SourceArtifact, attempt: u32) -> Result<ExecutionResult> {
        let workdir = &self.config.workdir;
        tokio::fs::create_dir_all(workdir).await?;

        // One live source file per entry point id; later attempts overwrite it
        let file_name = artifact.file_name();
        let source_path = workdir.join(&file_name);
        tokio::fs::write(&source_path, &artifact.code).await?;
        debug!("Wrote artifact to {}", source_path.display());

        let media_dir = output::attempt_media_dir(workdir, &artifact.entry_point_id, attempt);
        let args = self.render_args(&file_name, &artifact.entry_point_id, &media_dir);

        info!(
            "Rendering {} (attempt {}) with {} {}",
            artifact.entry_point_id,
            attempt,
            self.config.program,
            args.join(" ")
        );

        let start = Instant::now();
        let result = tokio::time::timeout(
            self.timeout(),
            Command::new(&self.config.program)
                .args(&args)
                .current_dir(workdir)
                .output(),
        )
        .await;
        let duration = start.elapsed();

        match result {
            Ok(Ok(output)) => {
                // Lossy decoding: undecodable bytes become replacement
                // characters instead of failing the attempt
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    info!(
                        "Render of {} completed in {:.1}s",
                        artifact.entry_point_id,
                        duration.as_secs_f64()
                    );

                    let video_path = output::locate_video(
                        &media_dir,
                        &artifact.entry_point_id,
                        &self.config.quality_dir,
                    );
                    if video_path.is_none() {
                        warn!(
                            "Render of {} exited cleanly but no video file was found",
                            artifact.entry_point_id
                        );
                    }

                    Ok(ExecutionResult {
                        status: ExecutionStatus::Success,
                        stdout,
                        stderr: non_empty(stderr),
                        video_path,
                        duration,
                    })
                } else {
                    info!(
                        "Render of {} failed with exit code {:?}",
                        artifact.entry_point_id,
                        output.status.code()
                    );

                    Ok(ExecutionResult {
                        status: ExecutionStatus::Failure,
                        stdout,
                        stderr: non_empty(stderr),
                        video_path: None,
                        duration,
                    })
                }
            }
            Ok(Err(e)) => Err(ScenegenError::Render(format!(
                "Failed to start {}: {}",
                self.config.program, e
            ))),
            Err(_) => {
                warn!(
                    "Render of {} timed out after {:?}",
                    artifact.entry_point_id,
                    self.timeout()
                );

                Ok(ExecutionResult {
                    status: ExecutionStatus::Failure,
                    stdout: String::new(),
                    stderr: Some(format!("Render timed out after {:?}", self.timeout())),
                    video_path: None,
                    duration,
                })
            }
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
