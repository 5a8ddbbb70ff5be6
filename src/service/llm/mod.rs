//! Integration with Large Language Model services.
//!
//! The module defines the `GenericLlmClient` trait that can be implemented
//! for different completion providers, with a default implementation for the
//! OpenAI chat-completions API.

pub mod openai;

use crate::base::types::Res;
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// Implementing this trait allows different completion providers to be used with the relay.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Produce a reply for a single user prompt.
    ///
    /// An empty string is a deliberate no-op (for example, a repeated prompt)
    /// and must not be posted.
    async fn complete(&self, prompt: &str) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
