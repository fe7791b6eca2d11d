//! Chat pipeline: validate, classify, generate, compose.

use super::prompts::PromptLibrary;
use super::visualization::get_visualization;
use crate::intent::{Intent, classify_detailed};
use crate::llm::{GenerationProfiles, TextGenerator};
use crate::models::{ChatResponse, VisualizationPayload};
use crate::{Error, Result};

/// Answers chat queries.
///
/// Holds everything a request needs and nothing a request changes: the
/// generator handle, the prompt library and the two generation settings.
pub struct ChatService<G: TextGenerator> {
    generator: G,
    prompts: PromptLibrary,
    profiles: GenerationProfiles,
}

impl<G: TextGenerator> ChatService<G> {
    /// Creates a new chat service.
    #[must_use]
    pub const fn new(generator: G, prompts: PromptLibrary, profiles: GenerationProfiles) -> Self {
        Self {
            generator,
            prompts,
            profiles,
        }
    }

    /// Returns the generator.
    #[must_use]
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Produces the reply envelope for a raw user query.
    ///
    /// The visualization call (visualization intent only) and the
    /// conversational call run concurrently. A failed visualization call
    /// leaves `visualization_data` empty; a failed conversational call fails
    /// the whole request.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the query is blank; no remote call is made.
    /// - [`Error::Service`] or [`Error::Timeout`] if the conversational call fails.
    pub async fn respond(&self, raw_query: &str) -> Result<ChatResponse> {
        let query = raw_query.trim();
        if query.is_empty() {
            metrics::counter!("chat_request_failures_total", "reason" => "invalid_input")
                .increment(1);
            return Err(Error::InvalidInput("Input cannot be empty.".to_string()));
        }
        tracing::info!(user_input = %query, "User input");

        let classification = classify_detailed(query);
        let intent = classification.intent;
        tracing::Span::current().record("intent", intent.as_str());
        tracing::debug!(
            intent = %intent,
            keywords = ?classification.matched_keywords,
            "Classified query"
        );

        let (visualization_data, bot_response) =
            tokio::join!(self.visualization(intent, query), self.conversation(intent, query));

        let bot_response = bot_response.inspect_err(|err| {
            tracing::error!(error = %err, "Error during conversational generation");
            metrics::counter!("chat_request_failures_total", "reason" => "service_error")
                .increment(1);
        })?;

        let response = ChatResponse::compose(bot_response, visualization_data);
        tracing::info!(
            response_type = %response.response_type,
            response_len = response.bot_response.len(),
            "Bot response"
        );
        metrics::counter!(
            "chat_requests_total",
            "intent" => intent.as_str(),
            "response_type" => response.response_type.as_str()
        )
        .increment(1);

        Ok(response)
    }

    async fn visualization(&self, intent: Intent, query: &str) -> Option<VisualizationPayload> {
        if !intent.wants_visualization() {
            return None;
        }
        get_visualization(
            &self.generator,
            &self.prompts,
            &self.profiles.visualization,
            query,
        )
        .await
    }

    async fn conversation(&self, intent: Intent, query: &str) -> Result<String> {
        let prompt = self.prompts.conversation_prompt(intent, query);
        self.generator
            .generate(&prompt, &self.profiles.conversation)
            .await
    }
}
