//! Prompt System - Template rendering for the generative stages
//!
//! This module provides the Handlebars-backed PromptRenderer and the prompt
//! templates for the planner, synthesizer, and corrector.

mod render;
pub mod templates;

pub use render::PromptRenderer;
