//! Single LLM calls made on behalf of an agent.
//!
//! Every call is wrapped in a `gen_ai.complete` span carrying the request
//! parameters; token counts and the finish reason are recorded on the span
//! once the response arrives.

use tracing::{Instrument, field, info_span};

use sdr_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;
use crate::usage::UsageLedger;

/// Request parameters shared by every call of a run.
#[derive(Debug, Clone, Copy)]
pub struct CallSettings {
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: None,
        }
    }
}

/// Makes instrumented completion calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentRunner {
    settings: CallSettings,
}

impl AgentRunner {
    pub fn new(settings: CallSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CallSettings {
        &self.settings
    }

    /// Build the request for one call. An empty `model` leaves the choice
    /// to the provider's configured default.
    pub fn build_request(&self, model: &str, system: &str, user: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(user)],
            system: Some(system.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stop_sequences: None,
        }
    }

    /// Send one completion request as `role`.
    pub async fn complete(
        &self,
        provider: &BoxLlmProvider,
        role: &str,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(model, system, user);
        let request_model = if request.model.is_empty() {
            provider.model()
        } else {
            request.model.as_str()
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = provider.name(),
            gen_ai.agent.name = role,
            gen_ai.request.model = %request_model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.usage.input_tokens = field::Empty,
            gen_ai.usage.output_tokens = field::Empty,
            gen_ai.response.finish_reasons = field::Empty,
        );

        let response = provider
            .complete(&request)
            .instrument(span.clone())
            .await?;

        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
        span.record(
            "gen_ai.response.finish_reasons",
            field::display(&response.stop_reason),
        );
        Ok(response)
    }

    /// Send one call and account for it in `ledger`.
    pub async fn complete_recorded(
        &self,
        provider: &BoxLlmProvider,
        role: &str,
        model: &str,
        system: &str,
        user: &str,
        ledger: &mut UsageLedger,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self.complete(provider, role, model, system, user).await?;
        record_response(ledger, role, provider, model, &response);
        Ok(response)
    }
}

/// Add a response's usage to the ledger under the model that actually
/// served it, falling back to the requested one.
pub fn record_response(
    ledger: &mut UsageLedger,
    role: &str,
    provider: &BoxLlmProvider,
    requested_model: &str,
    response: &CompletionResponse,
) {
    let model = [response.model.as_str(), requested_model, provider.model()]
        .into_iter()
        .find(|m| !m.is_empty())
        .unwrap_or_default();
    ledger.record(role, provider.name(), model, &response.usage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockProvider;

    #[tokio::test]
    async fn request_carries_settings_and_prompts() {
        let mock = MockProvider::fixed("openai", "gpt-4o-mini", "Dear CEO");
        let requests = mock.requests.clone();
        let provider = BoxLlmProvider::new(mock);
        let runner = AgentRunner::new(CallSettings {
            max_tokens: 256,
            temperature: Some(0.7),
        });

        let response = runner
            .complete(&provider, "sales_agent1_gpt-4o-mini", "", "be brief", "write it")
            .await
            .unwrap();
        assert_eq!(response.content, "Dear CEO");
        assert_eq!(response.model, "gpt-4o-mini");

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].system.as_deref(), Some("be brief"));
        assert_eq!(sent[0].messages[0].content, "write it");
        assert_eq!(sent[0].max_tokens, 256);
        assert_eq!(sent[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn model_override_is_forwarded() {
        let mock = MockProvider::fixed("openai", "gpt-4o-mini", "ok");
        let requests = mock.requests.clone();
        let provider = BoxLlmProvider::new(mock);
        let runner = AgentRunner::default();
        let mut ledger = UsageLedger::new();

        runner
            .complete_recorded(&provider, "manager", "gpt-4o", "sys", "user", &mut ledger)
            .await
            .unwrap();

        assert_eq!(requests.lock().unwrap()[0].model, "gpt-4o");
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].model, "gpt-4o");
        assert_eq!(ledger.entries()[0].role, "manager");
        assert_eq!(ledger.entries()[0].provider, "openai");
    }

    #[tokio::test]
    async fn failed_call_records_nothing() {
        let provider = BoxLlmProvider::new(MockProvider::failing("groq", "llama"));
        let mut ledger = UsageLedger::new();
        let result = AgentRunner::default()
            .complete_recorded(&provider, "sales_agent1_llama", "", "sys", "user", &mut ledger)
            .await;
        assert!(matches!(result, Err(LlmError::Provider { .. })));
        assert!(ledger.is_empty());
    }
}
