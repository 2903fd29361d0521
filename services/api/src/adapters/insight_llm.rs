//! services/api/src/adapters/insight_llm.rs
//!
//! This module contains the adapter for the academic-insight LLM.
//! It implements the `AcademicInsightService` port from the `core` crate.

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
use cotbe_portal_core::ports::{AcademicInsightService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You are an academic advisor at a university college \
of technology. You receive one student's academic record: the courses they have \
taken, statuses, letter grades, credits, and GPA. Write a short advisory \
summary with three parts: what is going well, what needs attention, and two or \
three concrete next steps. Base every statement on the record you were given. \
Write in plain prose addressed to the advising staff, not to the student.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AcademicInsightService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsightAdapter {
    /// Creates a new `OpenAiInsightAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `AcademicInsightService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AcademicInsightService for OpenAiInsightAdapter {
    async fn summarize_record(&self, record_context: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("ACADEMIC RECORD:\n{}", record_context))
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
                    "Insight LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Insight LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
