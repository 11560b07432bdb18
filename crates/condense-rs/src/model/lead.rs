//! Extractive "lead" summarization: keep the opening sentences.
//!
//! No network, no model weights. Useful offline and as a baseline; its
//! output never exceeds the token limit, so recursive merging always
//! converges with it.

use std::sync::Arc;

use super::{ModelFuture, OutputLimits, SummaryModel};
use crate::error::ModelError;
use crate::text::Tokenizer;

/// Keeps whole leading sentences while they fit in `limits.max_tokens`.
///
/// If the very first sentence is already too long it is cut at the token
/// limit.
pub struct LeadModel {
    tokenizer: Arc<dyn Tokenizer>,
}

impl LeadModel {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    fn lead(&self, text: &str, max_tokens: usize) -> Result<String, ModelError> {
        let mut kept = String::new();
        let mut used = 0;

        for sentence in sentences(text) {
            let cost = self.tokenizer.count(sentence);
            if used + cost > max_tokens {
                break;
            }
            if !kept.is_empty() {
                kept.push(' ');
            }
            kept.push_str(sentence);
            used += cost;
        }

        if kept.is_empty() {
            kept = self.truncate(text, max_tokens)?;
        }
        Ok(kept)
    }

    /// Longest token prefix of `text` that ends on a whole character and
    /// re-encodes within `max_tokens`.
    fn truncate(&self, text: &str, max_tokens: usize) -> Result<String, ModelError> {
        let tokens = self.tokenizer.encode(text);
        let mut cut = tokens.len().min(max_tokens);
        while cut > 0 {
            let prefix = self
                .tokenizer
                .decode(&tokens[..cut])
                .map_err(|e| ModelError::Permanent(e.to_string()))?;
            let prefix = prefix.trim_end_matches('\u{FFFD}').trim_end();
            if !prefix.is_empty() && self.tokenizer.count(prefix) <= max_tokens {
                return Ok(prefix.to_string());
            }
            cut -= 1;
        }
        Ok(String::new())
    }
}

/// Split on sentence-ending punctuation followed by whitespace.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text.trim();
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut prev_terminal = false;
        let mut cut = rest.len();
        for (i, c) in rest.char_indices() {
            if prev_terminal && c.is_whitespace() {
                cut = i;
                break;
            }
            prev_terminal = matches!(c, '.' | '!' | '?');
        }
        let (sentence, tail) = rest.split_at(cut);
        rest = tail.trim_start();
        Some(sentence.trim_end())
    })
}

impl SummaryModel for LeadModel {
    fn name(&self) -> &str {
        "lead"
    }

    fn summarize<'a>(&'a self, text: &'a str, limits: OutputLimits) -> ModelFuture<'a> {
        let result = self.lead(text, limits.max_tokens);
        Box::pin(async move { result })
    }
}
