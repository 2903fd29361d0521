//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the portal help chat LLM.
//! It implements the `HelpChatService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use cotbe_portal_core::domain::{ChatRole, ChatTurn};
use cotbe_portal_core::ports::{HelpChatService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You are the help assistant of a university portal \
used by students, teachers, and registrar staff. You answer questions about \
using the portal: registering for and dropping courses, the waitlist, viewing \
grades and the academic record, announcements, and where the dashboards are. \
Answer concisely and step by step where steps help. For questions about \
institutional policy (tuition, appeals, documents), direct the user to the \
registrar's office instead of guessing. Stay on portal topics.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `HelpChatService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiHelpChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiHelpChatAdapter {
    /// Creates a new `OpenAiHelpChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `HelpChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl HelpChatService for OpenAiHelpChatAdapter {
    /// Replies to the latest message, replaying the prior turns so the model
    /// keeps the conversation thread.
    async fn reply(&self, history: &[ChatTurn], message: &str) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into()];

        for turn in history {
            let prior = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            messages.push(prior);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.to_string())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

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
                    "Help chat LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Help chat LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
