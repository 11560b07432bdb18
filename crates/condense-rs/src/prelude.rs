//! Convenience re-exports for common `condense-rs` types.
//!
//! ```ignore
//! use condense_rs::prelude::*;
//! ```
//!
//! Covers building a [`Summarizer`], choosing a model and tokenizer, and
//! observing progress. Lower-level pieces (the HTTP client, retry helpers,
//! the scatter/gather scheduler) are imported from their modules directly.

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{ChunkError, ModelError, SummarizeError, TokenizerError, WindowFailure};

// ── Text ────────────────────────────────────────────────────────────
pub use crate::text::{
    Corpus, Document, TiktokenTokenizer, Tokenizer, Window, WindowSplitter, WordTokenizer,
    clean_text,
};

// ── Models ──────────────────────────────────────────────────────────
pub use crate::model::{FnModel, LeadModel, OpenRouterModel, OutputLimits, SummaryModel};

// ── Pipeline ────────────────────────────────────────────────────────
pub use crate::api::retry::RetryConfig;
pub use crate::pipeline::{
    CompositeEventHandler, EventHandler, FnEventHandler, LevelReport, LoggingHandler,
    NoopHandler, PipelineEvent, Summarizer, SummarizerConfig, Summary,
};
pub use tokio_util::sync::CancellationToken;
