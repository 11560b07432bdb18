//! Configuration for the [`Summarizer`](super::Summarizer).
//!
//! Defaults are sized for an encoder with a 1024-token input window:
//! 900-token windows with 50 tokens of overlap leave headroom for special
//! tokens, and 40–150 token partial summaries shrink each level roughly
//! six-fold.
//!
//! ```ignore
//! let config = SummarizerConfig::default()
//!     .with_chunk_size(3000)
//!     .with_overlap(200)
//!     .with_max_input_tokens(4096)
//!     .with_concurrency(8)
//!     .with_deadline(Duration::from_secs(120));
//! ```

use std::time::Duration;

use crate::api::retry::RetryConfig;
use crate::error::SummarizeError;
use crate::model::OutputLimits;

/// Tuning knobs for windowing, output size, concurrency, and retries.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Maximum tokens per window. Default: `900`.
    pub chunk_size: usize,
    /// Tokens shared by consecutive windows. Default: `50`.
    pub overlap: usize,
    /// The model's hard input limit, and the budget the final summary must
    /// fit in. Default: `1024`.
    pub max_input_tokens: usize,
    /// Length bounds passed to the model for every window. Default: `40..=150`.
    pub output: OutputLimits,
    /// Maximum windows summarized at once. Default: `4`.
    pub max_concurrency: usize,
    /// Retry policy around each window's model call.
    pub retry: RetryConfig,
    /// Override for the recursion-depth ceiling. `None` derives it from the
    /// input size (see [`depth_ceiling`](super::summarizer::depth_ceiling)).
    pub max_depth: Option<usize>,
    /// Overall time limit for one summarization. Default: none.
    pub deadline: Option<Duration>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 900,
            overlap: 50,
            max_input_tokens: 1024,
            output: OutputLimits::default(),
            max_concurrency: 4,
            retry: RetryConfig::default(),
            max_depth: None,
            deadline: None,
        }
    }
}

impl SummarizerConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_max_input_tokens(mut self, tokens: usize) -> Self {
        self.max_input_tokens = tokens;
        self
    }

    pub fn with_output_limits(mut self, min_tokens: usize, max_tokens: usize) -> Self {
        self.output = OutputLimits {
            max_tokens,
            min_tokens,
        };
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// Windows must fit the model input, overlap must leave a positive
    /// stride, and partial summaries must be shorter than the windows they
    /// come from or merging can never shrink the text.
    pub fn validate(&self) -> Result<(), SummarizeError> {
        let invalid = |msg: String| Err(SummarizeError::InvalidInput(msg));

        if self.chunk_size == 0 {
            return invalid("chunk_size must be greater than zero".into());
        }
        if self.overlap >= self.chunk_size {
            return invalid(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            ));
        }
        if self.chunk_size > self.max_input_tokens {
            return invalid(format!(
                "chunk_size ({}) exceeds the model input limit ({})",
                self.chunk_size, self.max_input_tokens
            ));
        }
        if self.output.max_tokens == 0 || self.output.min_tokens > self.output.max_tokens {
            return invalid(format!(
                "output limits {}..={} are not a valid range",
                self.output.min_tokens, self.output.max_tokens
            ));
        }
        if self.output.max_tokens >= self.chunk_size {
            return invalid(format!(
                "max output tokens ({}) must be smaller than chunk_size ({})",
                self.output.max_tokens, self.chunk_size
            ));
        }
        if self.max_concurrency == 0 {
            return invalid("max_concurrency must be at least 1".into());
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1".into());
        }
        Ok(())
    }
}
