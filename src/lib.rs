//! Scenegen - LLM-planned Manim animation generation
//!
//! Scenegen turns a text topic into a rendered animation through a bounded
//! generate/execute/diagnose/repair loop: an LLM plans the scenes and writes
//! Manim code, a subprocess renders it, and render failures are fed back to
//! the LLM for correction up to a configured number of attempts.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod render;

pub use error::{Result, ScenegenError};
