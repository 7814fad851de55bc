//! services/api/src/adapters/generation_llm.rs
//!
//! This module contains the adapter for the content-generating LLM.
//! It implements the `ContentGenerationService` port from the `core` crate against any
//! OpenAI-compatible chat completion endpoint (Gemini's, by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_studio_core::{
    domain::Creativity,
    ports::{ContentGenerationService, PortError, PortResult},
};
use tracing::{debug, error};

/// Output-token budget for one generation.
pub const MAX_OUTPUT_TOKENS: u32 = 1500;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiGenerationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerationAdapter {
    /// Creates a new `OpenAiGenerationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client pointed at `api_base` and authenticated with `api_key`.
    pub fn client_for(api_base: &str, api_key: &str) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_base(api_base.trim_end_matches('/'))
            .with_api_key(api_key);
        Client::with_config(config)
    }
}

//=========================================================================================
// `ContentGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerationService for OpenAiGenerationAdapter {
    /// Sends the prompt as a single user message, sampling at `creativity`.
    async fn generate(&self, prompt: &str, creativity: Creativity) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .temperature(creativity.value())
            .max_tokens(MAX_OUTPUT_TOKENS)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(
            model = %self.model,
            temperature = creativity.value(),
            prompt_chars = prompt.chars().count(),
            "Sending generation request"
        );

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Generation request failed: {}", e);
                PortError::Generation(e.to_string())
            })?;

        // Extract the text content from the first choice in the response.
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(PortError::Generation(
                "Generation LLM returned no choices in its response.".to_string(),
            ));
        };

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(PortError::Generation(
                "Generation LLM response contained no text content.".to_string(),
            )),
        }
    }
}
