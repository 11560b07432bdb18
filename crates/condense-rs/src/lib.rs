//! Hierarchical summarization of arbitrarily long text.
//!
//! `condense-rs` turns text of any length into a summary that fits a fixed
//! token budget, using a summarization model whose input is much smaller
//! than the text. The core abstraction is the
//! [`Summarizer`](pipeline::Summarizer): it splits the input into
//! overlapping token windows, summarizes the windows in parallel with
//! bounded concurrency, joins the partial summaries in order, and repeats on
//! the joined text until it fits.
//!
//! # Getting started
//!
//! ```ignore
//! use condense_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SummarizeError> {
//!     let tokenizer: Arc<dyn Tokenizer> = Arc::new(TiktokenTokenizer::cl100k()?);
//!     let model = Arc::new(OpenRouterModel::from_env("google/gemini-2.5-flash").unwrap());
//!
//!     let summarizer = Summarizer::new(model, tokenizer, SummarizerConfig::default())?;
//!     let docs = vec![Document::new(std::fs::read_to_string("report.txt").unwrap())];
//!     let summary = summarizer.summarize_documents(&docs).await?;
//!
//!     println!("{}", summary.text);
//!     println!("{} level(s), {} call(s)", summary.depth(), summary.calls);
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Plug in a model:** implement [`SummaryModel`](model::SummaryModel), or
//!   use [`OpenRouterModel`](model::OpenRouterModel) for a hosted LLM,
//!   [`LeadModel`](model::LeadModel) for offline extractive summaries, or
//!   [`FnModel`](model::FnModel) for closures.
//!
//! - **Count tokens:** see the [`Tokenizer`](text::Tokenizer) trait,
//!   [`TiktokenTokenizer`](text::TiktokenTokenizer) for BPE counts, and
//!   [`WordTokenizer`](text::WordTokenizer) for whitespace words.
//!
//! - **Tune the pipeline:** see [`SummarizerConfig`](pipeline::SummarizerConfig)
//!   for window size, overlap, output limits, concurrency, retries, depth and
//!   deadline.
//!
//! - **Observe progress:** implement
//!   [`EventHandler`](pipeline::events::EventHandler), or use
//!   [`LoggingHandler`](pipeline::events::LoggingHandler) (the default),
//!   [`FnEventHandler`](pipeline::events::FnEventHandler) and
//!   [`CompositeEventHandler`](pipeline::events::CompositeEventHandler).
//!
//! - **Stop early:** pass a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   to [`Summarizer::run`](pipeline::Summarizer::run), or set a deadline.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | [`Summarizer`](pipeline::Summarizer), config, scatter/gather scheduler, events |
//! | [`text`] | Cleaning, document ingestion, tokenizers, window splitting |
//! | [`model`] | [`SummaryModel`](model::SummaryModel) trait and backends |
//! | [`api`] | OpenRouter client and retry with backoff |
//! | [`cli`] | Shared command-line arguments for the binaries |
//! | [`error`] | Error types |

pub mod api;
pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod text;

use schemars::JsonSchema;

// Re-export schemars for downstream crates.
pub use schemars;

pub use error::SummarizeError;
pub use pipeline::{Summarizer, SummarizerConfig, Summary};

// ── Schema helpers ─────────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` for a type that implements
/// `schemars::JsonSchema`.
///
/// # Example
///
/// ```
/// use condense_rs::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Request {
///     documents: Vec<String>,
/// }
///
/// let schema = json_schema_for::<Request>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"documents".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

/// Validate `instance` against a JSON Schema.
///
/// Returns one line per violation, each prefixed with the JSON pointer of
/// the offending value. An invalid schema is reported as a single error.
pub fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Result<(), Vec<String>> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| vec![format!("invalid schema: {e}")])?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| {
            let path = e.instance_path().to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{path}: {e}")
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Request {
        #[schemars(length(min = 1))]
        documents: Vec<text::DocumentInput>,
    }

    #[test]
    fn accepts_both_document_shapes() {
        let schema = json_schema_for::<Request>();
        let body = json!({"documents": ["plain", {"text": "object"}]});
        assert!(validate_against_schema(&schema, &body).is_ok());
    }

    #[test]
    fn reports_each_violation_with_its_path() {
        let schema = json_schema_for::<Request>();
        let errors = validate_against_schema(&schema, &json!({"documents": [42]})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/documents/0"), "{errors:?}");

        assert!(validate_against_schema(&schema, &json!({"documents": []})).is_err());
        assert!(validate_against_schema(&schema, &json!({})).is_err());
    }
}
