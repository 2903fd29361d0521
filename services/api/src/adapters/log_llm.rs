//! services/api/src/adapters/log_llm.rs
//!
//! This module contains the adapter for the audit-log summarization LLM.
//! It implements the `LogSummaryService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use cotbe_portal_core::ports::{LogSummaryService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You summarize the audit trail of a university \
portal for the registrar's staff. You receive recent audit entries, one per \
line, newest first, each with a timestamp, the acting user, the action, and a \
detail string. Report what happened in plain language: overall activity, who \
was most active, notable registration or grading activity, and anything that \
looks unusual (bursts of failed actions, repeated deletions). Stick to the \
entries given; do not speculate beyond them.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LogSummaryService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiLogSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiLogSummaryAdapter {
    /// Creates a new `OpenAiLogSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `LogSummaryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LogSummaryService for OpenAiLogSummaryAdapter {
    async fn summarize_logs(&self, log_lines: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("AUDIT ENTRIES:\n{}", log_lines))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Log summary LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Log summary LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
