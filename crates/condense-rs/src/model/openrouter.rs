//! Abstractive summarization through an OpenRouter-hosted LLM.

use super::{ModelFuture, OutputLimits, SummaryModel};
use crate::api::client::{ChatRequest, Message, OpenRouterClient};
use crate::api::retry::classify_error;
use crate::error::ModelError;

/// Default model for summarization calls.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

const SUMMARIZATION_PROMPT: &str = "\
You are a summarization engine. Summarize the text the user sends.

Rules:
- Only include facts stated in the text. Do not infer or extrapolate.
- Preserve names, numbers, and dates verbatim.
- Write plain prose: no headings, no bullet points, no preamble.
- The text may start or end mid-sentence; summarize what is there.";

/// [`SummaryModel`] that sends each window to a chat completions endpoint.
///
/// `max_tokens` on the request is set to the output limit, so the provider
/// enforces the upper bound even if the model ignores the prompt.
pub struct OpenRouterModel {
    client: OpenRouterClient,
    model: String,
    temperature: f32,
}

impl OpenRouterModel {
    pub fn new(client: OpenRouterClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Create a model from the `OPENROUTER_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self, String> {
        let api_key = std::env::var("OPENROUTER_KEY")
            .map_err(|_| "OPENROUTER_KEY environment variable is not set".to_string())?;
        Ok(Self::new(OpenRouterClient::new(api_key)?, model))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn request(&self, text: &str, limits: OutputLimits) -> ChatRequest {
        let system = format!(
            "{SUMMARIZATION_PROMPT}\n- Use between {} and {} tokens.",
            limits.min_tokens, limits.max_tokens
        );
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(text)],
            max_tokens: u32::try_from(limits.max_tokens).unwrap_or(u32::MAX),
            temperature: self.temperature,
            seed: None,
        }
    }
}

impl SummaryModel for OpenRouterModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn summarize<'a>(&'a self, text: &'a str, limits: OutputLimits) -> ModelFuture<'a> {
        Box::pin(async move {
            let body = self.request(text, limits);
            let completion = self.client.chat(&body).await.map_err(classify_error)?;
            match completion.content.map(|c| c.trim().to_string()) {
                Some(content) if !content.is_empty() => Ok(content),
                _ => Err(ModelError::Transient(format!(
                    "empty completion (finish_reason={})",
                    completion.finish_reason.as_deref().unwrap_or("none")
                ))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenRouterModel {
        OpenRouterModel::new(OpenRouterClient::new("test-key").unwrap(), "test/model")
    }

    #[test]
    fn request_carries_limits() {
        let limits = OutputLimits {
            max_tokens: 150,
            min_tokens: 40,
        };
        let req = model().request("some window", limits);
        assert_eq!(req.model, "test/model");
        assert_eq!(req.max_tokens, 150);
        assert_eq!(req.messages.len(), 2);
        assert!(req.messages[0].content.contains("between 40 and 150 tokens"));
        assert_eq!(req.messages[1].content, "some window");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transient() {
        let client = OpenRouterClient::with_url("k", "http://127.0.0.1:1/v1/chat").unwrap();
        let model = OpenRouterModel::new(client, "m");
        let err = model
            .summarize("text", OutputLimits::default())
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err}");
    }
}
