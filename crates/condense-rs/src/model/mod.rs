//! Summarization backends.
//!
//! The pipeline treats summarization of one window as an opaque capability:
//! text in, shorter text out, with output size bounded by [`OutputLimits`].
//! Implement [`SummaryModel`] to plug in a new backend.
//!
//! | Backend | Use case |
//! |---------|----------|
//! | [`OpenRouterModel`] | Abstractive summaries from a hosted LLM |
//! | [`LeadModel`] | Offline, deterministic extractive summaries |
//! | [`FnModel`] | Closures, test doubles |

pub mod lead;
pub mod openrouter;

pub use lead::LeadModel;
pub use openrouter::OpenRouterModel;

use std::future::Future;
use std::pin::Pin;

use crate::error::ModelError;

/// Boxed future returned by [`SummaryModel::summarize`].
pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ModelError>> + Send + 'a>>;

/// Length constraints for one summarization call, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    pub max_tokens: usize,
    pub min_tokens: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            min_tokens: 40,
        }
    }
}

/// A single-window summarization capability.
///
/// Implementations are shared by every concurrent worker of a batch and must
/// be safe to call concurrently. Output must stay within
/// `limits.max_tokens`; the recursive merge only converges when it does.
///
/// Return [`ModelError::Transient`] for failures worth retrying and
/// [`ModelError::Permanent`] for the rest.
pub trait SummaryModel: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Summarize `text`.
    fn summarize<'a>(&'a self, text: &'a str, limits: OutputLimits) -> ModelFuture<'a>;
}

/// A [`SummaryModel`] backed by a synchronous closure.
///
/// # Example
///
/// ```
/// use condense_rs::model::{FnModel, OutputLimits, SummaryModel};
///
/// let first_word = FnModel::new("first-word", |text: &str, _limits: OutputLimits| {
///     Ok(text.split_whitespace().next().unwrap_or_default().to_string())
/// });
/// assert_eq!(first_word.name(), "first-word");
/// ```
pub struct FnModel<F>
where
    F: Fn(&str, OutputLimits) -> Result<String, ModelError> + Send + Sync,
{
    name: String,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&str, OutputLimits) -> Result<String, ModelError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SummaryModel for FnModel<F>
where
    F: Fn(&str, OutputLimits) -> Result<String, ModelError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn summarize<'a>(&'a self, text: &'a str, limits: OutputLimits) -> ModelFuture<'a> {
        let result = (self.f)(text, limits);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_model_calls_closure() {
        let model = FnModel::new("upper", |text: &str, _| Ok(text.to_uppercase()));
        let out = model.summarize("abc", OutputLimits::default()).await;
        assert_eq!(out, Ok("ABC".to_string()));
    }

    #[tokio::test]
    async fn fn_model_passes_limits() {
        let model = FnModel::new("limits", |_: &str, limits: OutputLimits| {
            Ok(format!("{}-{}", limits.min_tokens, limits.max_tokens))
        });
        let limits = OutputLimits {
            max_tokens: 9,
            min_tokens: 3,
        };
        assert_eq!(model.summarize("x", limits).await, Ok("3-9".to_string()));
    }
}
