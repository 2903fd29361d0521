//! services/api/src/adapters/announcement_llm.rs
//!
//! This module contains the adapter for the announcement-drafting LLM.
//! It implements the `AnnouncementDraftService` port from the `core` crate.

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
use cotbe_portal_core::ports::{AnnouncementDraftService, PortError, PortResult};

const SYSTEM_PROMPT: &str = "You draft announcements for a university portal. \
You receive a topic, the audience the announcement is addressed to, and the key \
points it must cover. Produce a ready-to-post announcement: a one-line title on \
the first line, then the body. Cover every key point, keep the body under 150 \
words, and use a formal but warm institutional voice. Do not add contact \
details, dates, or policies that were not in the key points.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnnouncementDraftService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnnouncementAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnnouncementAdapter {
    /// Creates a new `OpenAiAnnouncementAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `AnnouncementDraftService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnnouncementDraftService for OpenAiAnnouncementAdapter {
    async fn draft_announcement(
        &self,
        topic: &str,
        audience: &str,
        key_points: &str,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "TOPIC: {}\nAUDIENCE: {}\nKEY POINTS:\n{}",
                    topic, audience, key_points
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
                    "Announcement LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Announcement LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
