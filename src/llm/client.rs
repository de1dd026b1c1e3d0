//! Core LLM client trait and the scripted mock used by tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Result, ScenegenError};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call is an independent round-trip
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// The model this client targets
    fn model(&self) -> &str;

    /// Whether the client has credentials and can be used
    fn is_ready(&self) -> bool;
}

/// Scripted mock client: returns queued responses in order.
///
/// An empty queue or a scripted error surfaces as an `Llm` error, which is how
/// tests simulate transport failures.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse>>>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    /// Create a mock that replays the given responses in order
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            responses: Mutex::new(VecDeque::from([Err(ScenegenError::Llm(message))])),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a scripted error after any already-queued responses
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ScenegenError::Llm(message.into())));
    }

    /// Number of completion calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        match responses.pop_front() {
            Some(response) => response,
            None => Err(ScenegenError::Llm("mock response queue exhausted".to_string())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn is_ready(&self) -> bool {
        true
    }
}
