//! Mock collaborators shared by the unit tests in this crate.

use std::future::Future;
use std::sync::{Arc, Mutex};

use sdr_types::email::{DeliveryReceipt, OutgoingEmail};
use sdr_types::error::EmailError;
use sdr_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use crate::delivery::EmailSender;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::registry::ProviderRegistry;

type Responder = dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync;

/// Provider whose answer is computed from the request.
pub struct MockProvider {
    name: String,
    model: String,
    capabilities: ProviderCapabilities,
    responder: Arc<Responder>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new(
        name: &str,
        model: &str,
        responder: impl Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
            capabilities: ProviderCapabilities {
                tool_calling: false,
                max_context_tokens: 128_000,
                max_output_tokens: 4_096,
            },
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers with the same text.
    pub fn fixed(name: &str, model: &str, text: &str) -> Self {
        let text = text.to_string();
        Self::new(name, model, move |_| Ok(text.clone()))
    }

    /// Always fails with a provider error.
    pub fn failing(name: &str, model: &str) -> Self {
        Self::new(name, model, |_| {
            Err(LlmError::Provider {
                message: "boom".to_string(),
            })
        })
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let result = (self.responder)(request);
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };
        let name = self.name.clone();
        async move {
            let content = result?;
            Ok(CompletionResponse {
                id: format!("resp-{name}"),
                content,
                model,
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 20,
                    total_tokens: None,
                },
            })
        }
    }
}

pub fn registry_with(providers: Vec<MockProvider>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        let name = provider.name.clone();
        registry.register(name, BoxLlmProvider::new(provider));
    }
    registry
}

/// Sender that records every email it is handed.
#[derive(Clone, Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub reject: bool,
}

impl EmailSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(
        &self,
        email: &OutgoingEmail,
    ) -> impl Future<Output = Result<DeliveryReceipt, EmailError>> + Send {
        let reject = self.reject;
        if !reject {
            self.sent.lock().unwrap().push(email.clone());
        }
        async move {
            if reject {
                return Err(EmailError::Rejected {
                    status: 401,
                    body: "unauthorized".to_string(),
                });
            }
            Ok(DeliveryReceipt {
                provider: "recording".to_string(),
                status_code: Some(202),
                message_id: Some("msg-1".to_string()),
                dry_run: false,
            })
        }
    }
}
