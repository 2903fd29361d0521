//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the course question-answering LLM.
//! It implements the `CourseQaService` port from the `core` crate.

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
use cotbe_portal_core::ports::{CourseQaService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You are a course assistant for a university portal. \
You answer student questions using ONLY the course material provided in the \
MATERIAL section. If the material does not cover the question, say so plainly \
and suggest the student ask their teacher; never invent facts. Answer in a \
clear, friendly register suitable for undergraduates, and keep answers short \
unless the question genuinely needs a longer explanation.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CourseQaService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCourseQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCourseQaAdapter {
    /// Creates a new `OpenAiCourseQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `CourseQaService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseQaService for OpenAiCourseQaAdapter {
    /// Answers a student question against the section's uploaded material.
    async fn answer_question(&self, question: &str, material_context: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "MATERIAL:\n---\n{}\n---\n\nQUESTION: {}",
                    material_context, question
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
                    "Course QA LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Course QA LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
