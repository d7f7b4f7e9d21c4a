//! Scripted provider for testing.

use super::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;

enum Outcome {
    Reply(String),
    Fail(ProviderError),
}

/// Mock provider that answers every call with the same reply or failure and
/// records what it was asked.
pub struct MockCompletionProvider {
    outcome: Outcome,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Reply(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Outcome::Fail(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        match &self.outcome {
            Outcome::Reply(text) => Ok(Completion::from_text(text.clone())),
            Outcome::Fail(error) => Err(error.clone()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
