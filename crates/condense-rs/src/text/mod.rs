//! Text handling: normalization, document ingestion, tokenization, and
//! window splitting.
//!
//! - [`tokenizer`]: the [`Tokenizer`] trait plus a BPE and a whitespace
//!   implementation.
//! - [`window`]: [`WindowSplitter`], which cuts text into overlapping,
//!   token-bounded [`Window`]s.

pub mod tokenizer;
pub mod window;

pub use tokenizer::{TiktokenTokenizer, Tokenizer, WordTokenizer};
pub use window::{Window, WindowSplitter};

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::SummarizeError;

/// Collapse every run of whitespace (newlines and tabs included) into a
/// single space and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One unit of input text.
///
/// Deserializes from either a bare JSON string or an object carrying a
/// `text` field, so both `["a", "b"]` and `[{"text": "a"}]` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "DocumentInput")]
pub struct Document {
    pub text: String,
}

/// Wire shape of a [`Document`]: a bare string or `{"text": ...}`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DocumentInput {
    Bare(String),
    Object { text: String },
}

impl From<DocumentInput> for Document {
    fn from(input: DocumentInput) -> Self {
        match input {
            DocumentInput::Bare(text) | DocumentInput::Object { text } => Self { text },
        }
    }
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// All non-empty documents, cleaned and joined with single spaces.
///
/// A `Corpus` is never empty: [`Corpus::from_documents`] rejects input whose
/// documents all clean down to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    documents: usize,
}

impl Corpus {
    /// Clean each document, drop the empty ones, and join the rest.
    pub fn from_documents(documents: &[Document]) -> Result<Self, SummarizeError> {
        let mut kept = Vec::with_capacity(documents.len());
        for (i, doc) in documents.iter().enumerate() {
            let cleaned = clean_text(&doc.text);
            if cleaned.is_empty() {
                debug!("Document at index {i} was empty after cleaning");
            } else {
                kept.push(cleaned);
            }
        }

        if kept.is_empty() {
            return Err(SummarizeError::InvalidInput(
                "no text found in documents".into(),
            ));
        }

        info!("Combined {} document(s) into one stream", kept.len());
        Ok(Self {
            documents: kept.len(),
            text: kept.join(" "),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of documents that survived cleaning.
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
