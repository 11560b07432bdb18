//! The recursive summarization controller.
//!
//! Each level splits its input into overlapping windows, summarizes them in
//! parallel, and joins the partial summaries with single spaces. The joined
//! text is the next level's input. Recursion stops when:
//!
//! - the level had a single window (its summary is the answer), or
//! - the joined summaries fit in `max_input_tokens`.
//!
//! Every level must shrink its input, and the number of levels is capped by
//! [`depth_ceiling`], so a model that does not compress fails with
//! [`SummarizeError::RecursionNotConverging`] instead of looping.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::chunk::ChunkSummarizer;
use super::config::SummarizerConfig;
use super::events::{EventHandler, LoggingHandler, PipelineEvent};
use super::scatter::ScatterGather;
use crate::error::{SummarizeError, WindowFailure};
use crate::model::SummaryModel;
use crate::text::{Corpus, Document, Tokenizer, WindowSplitter, clean_text};

/// Levels allowed beyond the ideal halving depth.
pub const DEPTH_SLACK: usize = 2;

/// Maximum number of levels for an input of `initial_tokens`.
///
/// Each level should shrink its input by at least half, so
/// `ceil(log2(initial_tokens / budget))` levels suffice; [`DEPTH_SLACK`]
/// extra levels absorb windows whose summaries run long.
pub fn depth_ceiling(initial_tokens: usize, budget: usize) -> usize {
    let ratio = initial_tokens.div_ceil(budget.max(1)).max(1);
    let halvings = (usize::BITS - (ratio - 1).leading_zeros()) as usize;
    halvings + DEPTH_SLACK
}

/// Statistics for one level of the recursion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    pub level: usize,
    pub input_tokens: usize,
    pub windows: usize,
    pub output_tokens: usize,
}

/// The final summary plus what it took to get there.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub text: String,
    pub levels: Vec<LevelReport>,
    /// Windows sent to the model across all levels.
    pub calls: usize,
    /// Windows that contributed nothing.
    pub failures: Vec<WindowFailure>,
}

impl Summary {
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Hierarchical summarizer for text of any length.
///
/// # Example
///
/// ```ignore
/// use condense_rs::prelude::*;
/// use std::sync::Arc;
///
/// let tokenizer = Arc::new(TiktokenTokenizer::cl100k()?);
/// let model = Arc::new(LeadModel::new(tokenizer.clone()));
/// let summarizer = Summarizer::new(model, tokenizer, SummarizerConfig::default())?;
///
/// let summary = summarizer.summarize(&long_text).await?;
/// ```
pub struct Summarizer {
    chunk: Arc<ChunkSummarizer>,
    tokenizer: Arc<dyn Tokenizer>,
    splitter: WindowSplitter,
    config: SummarizerConfig,
    events: Arc<dyn EventHandler>,
}

impl Summarizer {
    /// Validates `config` and wires the pipeline together.
    pub fn new(
        model: Arc<dyn SummaryModel>,
        tokenizer: Arc<dyn Tokenizer>,
        config: SummarizerConfig,
    ) -> Result<Self, SummarizeError> {
        config.validate()?;
        let splitter = WindowSplitter::new(config.chunk_size, config.overlap)?;
        let chunk = ChunkSummarizer::new(
            model,
            tokenizer.clone(),
            config.output,
            config.max_input_tokens,
            config.retry.clone(),
        );
        Ok(Self {
            chunk: Arc::new(chunk),
            tokenizer,
            splitter,
            config,
            events: Arc::new(LoggingHandler),
        })
    }

    /// Replace the default [`LoggingHandler`].
    pub fn with_event_handler(mut self, events: Arc<dyn EventHandler>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.chunk.model_name()
    }

    pub fn tokenizer_name(&self) -> &str {
        self.tokenizer.name()
    }

    /// Summarize `text` and return only the summary.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let summary = self.run(text, &CancellationToken::new()).await?;
        Ok(summary.text)
    }

    /// Combine `documents` into one stream and summarize it.
    ///
    /// Empty documents are dropped; if none remain the call fails with
    /// [`SummarizeError::InvalidInput`].
    pub async fn summarize_documents(
        &self,
        documents: &[Document],
    ) -> Result<Summary, SummarizeError> {
        self.summarize_documents_with(documents, &CancellationToken::new())
            .await
    }

    /// [`summarize_documents`](Self::summarize_documents) with a caller-held
    /// cancellation token.
    pub async fn summarize_documents_with(
        &self,
        documents: &[Document],
        cancel: &CancellationToken,
    ) -> Result<Summary, SummarizeError> {
        let corpus = Corpus::from_documents(documents)?;
        self.run(corpus.text(), cancel).await
    }

    /// Summarize `text`, honoring `cancel` and the configured deadline.
    pub async fn run(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Summary, SummarizeError> {
        let work = self.run_levels(text, cancel);
        match self.config.deadline {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| SummarizeError::DeadlineExceeded(limit))?,
            None => work.await,
        }
    }

    async fn run_levels(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Summary, SummarizeError> {
        let mut current = clean_text(text);
        if current.is_empty() {
            return Err(SummarizeError::InvalidInput("no text to summarize".into()));
        }

        let budget = self.config.max_input_tokens;
        let mut input_tokens = self.tokenizer.count(&current);
        let ceiling = self
            .config
            .max_depth
            .unwrap_or_else(|| depth_ceiling(input_tokens, budget));
        info!(
            "Summarizing {input_tokens} tokens with {} (budget {budget}, at most {ceiling} level(s))",
            self.chunk.model_name()
        );

        let scatter = ScatterGather::new(self.chunk.clone(), self.config.max_concurrency);
        let mut levels = Vec::new();
        let mut failures = Vec::new();
        let mut calls = 0;

        let mut level = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(SummarizeError::Cancelled);
            }

            let windows = self.splitter.split(self.tokenizer.as_ref(), &current)?;
            let window_count = windows.len();
            calls += window_count;
            self.events.on_event(&PipelineEvent::LevelStarted {
                level,
                input_tokens,
                windows: window_count,
            });

            let outcome = scatter
                .run(level, windows, cancel, self.events.as_ref())
                .await?;
            failures.extend(outcome.failures);

            // A single window is summarized directly; its output is final.
            let merged = if window_count == 1 {
                outcome.partials.into_iter().next().unwrap_or_default()
            } else {
                outcome.partials.join(" ")
            };
            let merged_tokens = self.tokenizer.count(&merged);
            levels.push(LevelReport {
                level,
                input_tokens,
                windows: window_count,
                output_tokens: merged_tokens,
            });

            if window_count == 1 || merged_tokens <= budget {
                if window_count > 1 {
                    self.events.on_event(&PipelineEvent::LevelMerged {
                        level,
                        merged_tokens,
                        budget,
                    });
                }
                self.events.on_event(&PipelineEvent::Finished {
                    levels: levels.len(),
                    output_tokens: merged_tokens,
                });
                return Ok(Summary {
                    text: merged,
                    levels,
                    calls,
                    failures,
                });
            }

            self.events.on_event(&PipelineEvent::LevelMerged {
                level,
                merged_tokens,
                budget,
            });

            if merged_tokens >= input_tokens || level + 1 >= ceiling {
                return Err(SummarizeError::RecursionNotConverging {
                    level,
                    tokens: merged_tokens,
                    budget,
                    ceiling,
                });
            }

            debug!("[level {level}] {input_tokens} → {merged_tokens} tokens");
            current = merged;
            input_tokens = merged_tokens;
            level += 1;
        }
    }
}
