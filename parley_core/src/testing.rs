//! Test doubles for code that talks to an `LLMProvider`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::{ChatCompletion, ChatRequest, LLMProvider};

/// Replays queued responses in order and records every request it sees.
///
/// Once the queue is drained, further calls fail.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ChatCompletion, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    #[must_use]
    pub fn then(self, completion: ChatCompletion) -> Self {
        self.push(Ok(completion));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, response: Result<ChatCompletion, String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copies of every request received, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatCompletion> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("scripted provider has no response queued"),
        }
    }

    fn get_default_model(&self) -> &'static str {
        "scripted-model"
    }
}
