//! services/api/src/adapters/feedback_llm.rs
//!
//! This module contains the adapter for the feedback-drafting LLM.
//! It implements the `FeedbackDraftService` port from the `core` crate.

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
use cotbe_portal_core::ports::{FeedbackDraftService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You draft feedback messages from a university \
teacher to one of their students about the student's performance in a course. \
You receive the student's name, the course, their registration status, and any \
grade recorded so far. Draft a message the teacher could send with little or \
no editing: specific to the facts given, respectful, and two short paragraphs \
at most. Never mention other students and never invent scores or incidents \
that are not in the context.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `FeedbackDraftService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiFeedbackAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiFeedbackAdapter {
    /// Creates a new `OpenAiFeedbackAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `FeedbackDraftService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FeedbackDraftService for OpenAiFeedbackAdapter {
    /// Drafts a feedback message in the requested tone.
    async fn draft_feedback(&self, performance_context: &str, tone: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "PERFORMANCE CONTEXT:\n{}\n\nRequested tone: {}",
                    performance_context, tone
                ))
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
                    "Feedback LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Feedback LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
