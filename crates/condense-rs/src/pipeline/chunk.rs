//! Summarize a single window, with retries.

use std::sync::Arc;

use crate::api::retry::{RetryConfig, retry_with_backoff};
use crate::error::ChunkError;
use crate::model::{OutputLimits, SummaryModel};
use crate::text::{Tokenizer, clean_text};

/// Wraps a [`SummaryModel`] with the input-size check, retry policy, and
/// output cleanup applied to every window.
///
/// Shared across worker tasks through an `Arc`.
pub struct ChunkSummarizer {
    model: Arc<dyn SummaryModel>,
    tokenizer: Arc<dyn Tokenizer>,
    limits: OutputLimits,
    max_input_tokens: usize,
    retry: RetryConfig,
}

impl ChunkSummarizer {
    pub fn new(
        model: Arc<dyn SummaryModel>,
        tokenizer: Arc<dyn Tokenizer>,
        limits: OutputLimits,
        max_input_tokens: usize,
        retry: RetryConfig,
    ) -> Self {
        Self {
            model,
            tokenizer,
            limits,
            max_input_tokens,
            retry,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Summarize one window of text.
    ///
    /// Oversized input fails immediately without calling the model.
    /// Transient model failures are retried per the [`RetryConfig`]; the
    /// returned summary is whitespace-normalized.
    pub async fn summarize_one(&self, text: &str) -> Result<String, ChunkError> {
        let tokens = self.tokenizer.count(text);
        if tokens > self.max_input_tokens {
            return Err(ChunkError::Oversized {
                tokens,
                limit: self.max_input_tokens,
            });
        }

        let label = format!("{} ({tokens} tokens)", self.model.name());
        let summary = retry_with_backoff(&self.retry, &label, || {
            self.model.summarize(text, self.limits)
        })
        .await
        .map_err(|e| ChunkError::CapabilityUnavailable {
            attempts: e.attempts,
            source: e.last,
        })?;

        Ok(clean_text(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::FnModel;
    use crate::text::WordTokenizer;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn summarizer(model: Arc<dyn SummaryModel>, max_input: usize) -> ChunkSummarizer {
        ChunkSummarizer::new(
            model,
            Arc::new(WordTokenizer::new()),
            OutputLimits::default(),
            max_input,
            RetryConfig::immediate(3),
        )
    }

    #[tokio::test]
    async fn output_is_whitespace_normalized() {
        let model = Arc::new(FnModel::new("pad", |_: &str, _| {
            Ok("  a   summary\n\n here ".to_string())
        }));
        let out = summarizer(model, 100).summarize_one("some text").await;
        assert_eq!(out, Ok("a summary here".to_string()));
    }

    #[tokio::test]
    async fn oversized_window_is_not_sent() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let model = Arc::new(FnModel::new("count", move |_: &str, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("x".to_string())
        }));
        let err = summarizer(model, 3)
            .summarize_one("one two three four")
            .await
            .unwrap_err();
        assert_eq!(err, ChunkError::Oversized { tokens: 4, limit: 3 });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_failures_exhaust_into_capability_unavailable() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let model = Arc::new(FnModel::new("busy", move |_: &str, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ModelError::Transient("out of memory".into()))
        }));
        let err = summarizer(model, 100).summarize_one("text").await.unwrap_err();
        assert!(matches!(
            err,
            ChunkError::CapabilityUnavailable { attempts: 3, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_a_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let model = Arc::new(FnModel::new("flaky", move |_: &str, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ModelError::Transient("busy".into()))
            } else {
                Ok("fine".to_string())
            }
        }));
        let out = summarizer(model, 100).summarize_one("text").await;
        assert_eq!(out, Ok("fine".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
