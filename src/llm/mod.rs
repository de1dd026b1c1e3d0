//! LLM Client Layer - Gemini API integration with structured outputs
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - GeminiClient implementation
//! - Scripted MockLlmClient for tests

pub mod client;
pub mod gemini;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, FinishReason, Message, Role, Usage};
