//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, DeepSeek, Google
//! Gemini and Groq through configurable base URLs and factory functions.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
    StopConfiguration,
};
use secrecy::{ExposeSecret, SecretString};

use sdr_core::llm::provider::LlmProvider;
use sdr_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Unified provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            base_url: config.base_url,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    /// OpenAI at `https://api.openai.com/v1`.
    pub fn openai(api_key: SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// DeepSeek at `https://api.deepseek.com/v1`.
    pub fn deepseek(api_key: SecretString, model: &str) -> Self {
        Self::new(config::deepseek_defaults(api_key, model))
    }

    /// Google Gemini at `https://generativelanguage.googleapis.com/v1beta/openai`.
    pub fn gemini(api_key: SecretString, model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model))
    }

    /// Groq at `https://api.groq.com/openai/v1`.
    pub fn groq(api_key: SecretString, model: &str) -> Self {
        Self::new(config::groq_defaults(api_key, model))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat request for `request`. The system prompt goes first; an empty
    /// model falls back to the configured one.
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .system
            .as_deref()
            .map(system_message)
            .into_iter()
            .chain(request.messages.iter().map(chat_message))
            .collect();

        let model = match request.model.as_str() {
            "" => self.model.clone(),
            explicit => explicit.to_string(),
        };
        let stop = request
            .stop_sequences
            .as_ref()
            .filter(|stops| !stops.is_empty())
            .map(|stops| StopConfiguration::StringArray(stops.clone()));

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            stop,
            ..Default::default()
        }
    }
}

fn system_message(content: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(content.to_string()),
        name: None,
    })
}

fn chat_message(message: &Message) -> ChatCompletionRequestMessage {
    let text = message.content.clone();
    match message.role {
        MessageRole::System => system_message(&text),
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        }),
        #[allow(deprecated)]
        MessageRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.build_request(request))
            .await
            .map_err(map_openai_error)?;

        let (content, stop_reason) = match response.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice
                    .finish_reason
                    .as_ref()
                    .map_or(StopReason::EndTurn, map_finish_reason),
            ),
            None => (String::new(), StopReason::EndTurn),
        };
        let usage = response.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: Some(u.total_tokens),
        });

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::ToolUse,
        FinishReason::ContentFilter => StopReason::ContentFilter,
    }
}

/// What an API error body says went wrong. Providers disagree on whether
/// the hint lives in `code`, `type` or only in the message text.
#[derive(Debug, PartialEq, Eq)]
enum ApiFailure {
    Auth,
    RateLimit,
    ContextLength,
    Overloaded,
    Other,
}

fn classify_api_error(code: &str, kind: &str, message: &str) -> ApiFailure {
    let message = message.to_ascii_lowercase();
    if matches!(code, "invalid_api_key" | "authentication_error")
        || kind == "authentication_error"
        || message.contains("incorrect api key")
        || message.contains("invalid api key")
        || message.contains("api key not valid")
    {
        ApiFailure::Auth
    } else if code == "rate_limit_exceeded" || matches!(kind, "rate_limit_error" | "tokens") {
        ApiFailure::RateLimit
    } else if code == "context_length_exceeded" || message.contains("maximum context length") {
        ApiFailure::ContextLength
    } else if code == "server_error" || kind == "overloaded_error" {
        ApiFailure::Overloaded
    } else {
        ApiFailure::Other
    }
}

fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    let provider_error = |err: &OpenAIError| LlmError::Provider {
        message: err.to_string(),
    };
    match &err {
        OpenAIError::ApiError(api) => match classify_api_error(
            api.code.as_deref().unwrap_or(""),
            api.r#type.as_deref().unwrap_or(""),
            &api.message,
        ) {
            ApiFailure::Auth => LlmError::AuthenticationFailed,
            ApiFailure::RateLimit => LlmError::RateLimited {
                retry_after_ms: None,
            },
            ApiFailure::ContextLength => LlmError::ContextLengthExceeded {
                max: 0,
                requested: 0,
            },
            ApiFailure::Overloaded => LlmError::Overloaded(api.message.clone()),
            ApiFailure::Other => provider_error(&err),
        },
        OpenAIError::Reqwest(http) => match http.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            Some(503 | 529) => LlmError::Overloaded(err.to_string()),
            _ => provider_error(&err),
        },
        OpenAIError::JSONDeserialize(_, body) => {
            LlmError::Deserialization(format!("failed to parse response: {body}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => provider_error(&err),
    }
}
