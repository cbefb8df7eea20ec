//! services/api/src/adapters/extract_llm.rs
//!
//! Adapter for PDF text extraction via an OpenAI vision-capable model.
//! It implements the `TextExtractionService` port from the `core` crate.

const EXTRACTION_PROMPT: &str = "Extraia todo o texto deste PDF de edital de concurso público. \
Mantenha a formatação e estrutura original. Foque especialmente em seções sobre matérias, \
conteúdo programático, e requisitos da prova.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::time::Duration;
use study_planner_core::ports::{PortError, PortResult, TextExtractionService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextExtractionService` by handing the PDF to
/// an OpenAI-compatible vision model as a base64 data URL.
#[derive(Clone)]
pub struct OpenAiExtractionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiExtractionAdapter {
    /// Creates a new `OpenAiExtractionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

//=========================================================================================
// `TextExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextExtractionService for OpenAiExtractionAdapter {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> PortResult<String> {
        let data_url = format!("data:application/pdf;base64,{}", BASE64.encode(pdf_bytes));

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(EXTRACTION_PROMPT)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let pdf_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            )
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(vec![text_part.into(), pdf_part.into()])
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .max_tokens(4000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // One attempt with an explicit budget; callers fall back on failure,
        // they never retry.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "text extraction timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let extracted = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if extracted.trim().is_empty() {
            return Err(PortError::Unexpected(
                "extraction returned no text".to_string(),
            ));
        }

        Ok(extracted)
    }
}
