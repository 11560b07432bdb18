//! Error taxonomy for the summarization pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`TokenizerError`]: the tokenizer could not load or decode.
//! - [`ModelError`]: one call to a [`SummaryModel`](crate::model::SummaryModel)
//!   failed. `Transient` failures are retried, `Permanent` ones are not.
//! - [`ChunkError`]: one window could not be summarized after retries.
//!   Absorbed by the scheduler and recorded, never fatal on its own.
//! - [`SummarizeError`]: what a caller of
//!   [`Summarizer`](crate::pipeline::Summarizer) sees.

use serde::Serialize;
use thiserror::Error;

/// Tokenizer failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("failed to load tokenizer: {0}")]
    Load(String),
    #[error("unknown token id {0}")]
    UnknownToken(u32),
}

/// Failure of a single call to the underlying summarization model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Resource contention, rate limiting, timeouts. Worth retrying.
    #[error("transient model failure: {0}")]
    Transient(String),
    /// Bad request, auth failure, malformed output. Retrying won't help.
    #[error("permanent model failure: {0}")]
    Permanent(String),
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

/// Terminal failure of one window.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// The model kept failing (or failed permanently) for this window.
    #[error("model unavailable after {attempts} attempt(s): {source}")]
    CapabilityUnavailable {
        attempts: u32,
        #[source]
        source: ModelError,
    },
    /// The window is larger than the model's input limit.
    #[error("window has {tokens} tokens, model accepts at most {limit}")]
    Oversized { tokens: usize, limit: usize },
    /// The worker task died before producing a result.
    #[error("summarization task aborted: {0}")]
    Aborted(String),
}

/// A window that failed, recorded for observability.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WindowFailure {
    /// Recursion level the window belonged to (0 = original input).
    pub level: usize,
    /// Window sequence index within its level.
    pub index: usize,
    /// Rendered [`ChunkError`].
    pub error: String,
}

/// Errors returned by [`Summarizer`](crate::pipeline::Summarizer).
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Empty input or invalid configuration. Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every window of a level failed; there is nothing to merge.
    #[error("all {windows} window(s) failed at level {level}")]
    BatchExhausted {
        level: usize,
        windows: usize,
        failures: Vec<WindowFailure>,
    },
    /// The merged text did not shrink below the budget in time.
    #[error(
        "summary not converging: {tokens} tokens after level {level} (budget {budget}, ceiling {ceiling} levels)"
    )]
    RecursionNotConverging {
        level: usize,
        tokens: usize,
        budget: usize,
        ceiling: usize,
    },
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    /// The caller's cancellation token fired.
    #[error("summarization cancelled")]
    Cancelled,
    /// The configured deadline elapsed.
    #[error("summarization deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),
}

impl SummarizeError {
    /// Whether the error was caused by the caller's input rather than the
    /// pipeline itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SummarizeError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_error_renders_source() {
        let err = ChunkError::CapabilityUnavailable {
            attempts: 3,
            source: ModelError::Transient("HTTP 503".into()),
        };
        let text = err.to_string();
        assert!(text.contains("3 attempt"));
        assert!(text.contains("HTTP 503"));
    }

    #[test]
    fn only_invalid_input_is_client_error() {
        assert!(SummarizeError::InvalidInput("empty".into()).is_client_error());
        assert!(!SummarizeError::Cancelled.is_client_error());
        assert!(
            !SummarizeError::BatchExhausted {
                level: 0,
                windows: 2,
                failures: vec![],
            }
            .is_client_error()
        );
    }
}
