//! Type erasure for [`LlmProvider`].
//!
//! `LlmProvider::complete` returns `impl Future`, which rules out
//! `dyn LlmProvider`. The registry instead stores `BoxLlmProvider`, which
//! goes through a private object-safe mirror trait with a pinned future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use sdr_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::LlmProvider;

type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

trait ErasedProvider: Send + Sync {
    fn provider(&self) -> &str;
    fn default_model(&self) -> &str;
    fn caps(&self) -> &ProviderCapabilities;
    fn complete_erased<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<P: LlmProvider> ErasedProvider for P {
    fn provider(&self) -> &str {
        self.name()
    }

    fn default_model(&self) -> &str {
        self.model()
    }

    fn caps(&self) -> &ProviderCapabilities {
        self.capabilities()
    }

    fn complete_erased<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.complete(request))
    }
}

/// A provider chosen at runtime from configuration.
pub struct BoxLlmProvider(Box<dyn ErasedProvider>);

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self(Box::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.provider()
    }

    /// Model used when a request leaves `model` empty.
    pub fn model(&self) -> &str {
        self.0.default_model()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.0.caps()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.0.complete_erased(request).await
    }
}

impl fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxLlmProvider")
            .field("name", &self.name())
            .field("model", &self.model())
            .finish()
    }
}
