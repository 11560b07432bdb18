//! Pluggable tokenization for window sizing and budget checks.
//!
//! The pipeline never looks inside tokens: it only counts them and slices
//! token sequences back into text at window boundaries. Implementations are
//! shared across concurrent workers and must be `Send + Sync`.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::TokenizerError;

/// Text ⇄ token conversion.
pub trait Tokenizer: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Convert text into a token sequence.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Convert a token slice back into text.
    fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError>;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

// ── BPE ─────────────────────────────────────────────────────────────

/// Ordinary (non-special) ranks of `cl100k_base` are dense in `0..100_256`.
const CL100K_ORDINARY_TOKENS: u32 = 100_256;

/// `cl100k_base` byte-pair encoding via `tiktoken-rs`.
pub struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenTokenizer {
    pub fn cl100k() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError::Load(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn name(&self) -> &str {
        "cl100k"
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    /// Byte-level BPE slices can cut a multi-byte character in half. The
    /// bytes of every token are kept and a cut character decodes to
    /// U+FFFD, so a slice always decodes and never loses its neighbours.
    fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        if let Some(&unknown) = tokens.iter().find(|&&t| t >= CL100K_ORDINARY_TOKENS) {
            return Err(TokenizerError::UnknownToken(unknown));
        }
        let bytes: Vec<u8> = self
            .bpe
            ._decode_native_and_split(tokens.to_vec())
            .flatten()
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ── Whitespace ──────────────────────────────────────────────────────

#[derive(Default)]
struct Vocab {
    ids: HashMap<String, u32>,
    words: Vec<String>,
}

/// One token per whitespace-separated word, with an interning vocabulary
/// that grows on demand.
///
/// Deterministic and dependency-free, which makes it the tokenizer of choice
/// for tests and for offline runs where counts only need to be consistent,
/// not model-exact. Decoding joins words with single spaces, which is
/// lossless for text that went through [`clean_text`](super::clean_text).
#[derive(Default)]
pub struct WordTokenizer {
    vocab: RwLock<Vocab>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&self, word: &str) -> u32 {
        if let Some(&id) = self
            .vocab
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .get(word)
        {
            return id;
        }
        let mut vocab = self.vocab.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&id) = vocab.ids.get(word) {
            return id;
        }
        let id = vocab.words.len() as u32;
        vocab.words.push(word.to_string());
        vocab.ids.insert(word.to_string(), id);
        id
    }
}

impl Tokenizer for WordTokenizer {
    fn name(&self) -> &str {
        "words"
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace().map(|w| self.intern(w)).collect()
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        let vocab = self.vocab.read().unwrap_or_else(|e| e.into_inner());
        let words = tokens
            .iter()
            .map(|&id| {
                vocab
                    .words
                    .get(id as usize)
                    .map(String::as_str)
                    .ok_or(TokenizerError::UnknownToken(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words.join(" "))
    }

    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_tokenizer_round_trips_cleaned_text() {
        let tok = WordTokenizer::new();
        let ids = tok.encode("the cat saw the dog");
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], ids[3], "repeated words share an id");
        assert_eq!(tok.decode(&ids).unwrap(), "the cat saw the dog");
        assert_eq!(tok.decode(&ids[1..3]).unwrap(), "cat saw");
    }

    #[test]
    fn word_tokenizer_count_matches_encode() {
        let tok = WordTokenizer::new();
        let text = "  one two\nthree\t four ";
        assert_eq!(tok.count(text), tok.encode(text).len());
        assert_eq!(tok.count(""), 0);
    }

    #[test]
    fn word_tokenizer_rejects_unknown_ids() {
        let tok = WordTokenizer::new();
        assert_eq!(tok.decode(&[7]), Err(TokenizerError::UnknownToken(7)));
    }

    #[test]
    fn tiktoken_round_trips_ascii() {
        let tok = TiktokenTokenizer::cl100k().unwrap();
        let text = "Summaries of summaries are still summaries.";
        let ids = tok.encode(text);
        assert!(!ids.is_empty());
        assert!(ids.len() < text.len());
        assert_eq!(tok.decode(&ids).unwrap(), text);
    }

    #[test]
    fn tiktoken_counts_non_ascii_text() {
        let tok = TiktokenTokenizer::cl100k().unwrap();
        let text = "naïve café déjà vu";
        let ids = tok.encode(text);
        assert_eq!(tok.count(text), ids.len());
        assert_eq!(tok.decode(&ids).unwrap(), text);
    }

    #[test]
    fn tiktoken_decodes_slices_that_cut_a_character() {
        let tok = TiktokenTokenizer::cl100k().unwrap();
        let text = "crab 🦀 and 漢字";
        let ids = tok.encode(text);

        let mut cuts_a_character = false;
        for cut in 0..=ids.len() {
            let head = tok.decode(&ids[..cut]).unwrap();
            let tail = tok.decode(&ids[cut..]).unwrap();
            if head.ends_with('\u{FFFD}') {
                cuts_a_character = true;
                assert!(tail.starts_with('\u{FFFD}'), "cut {cut}: {tail:?}");
            } else {
                assert_eq!(format!("{head}{tail}"), text);
            }
        }
        assert!(cuts_a_character, "emoji and CJK span several tokens");
    }

    #[test]
    fn tiktoken_rejects_ids_outside_the_vocabulary() {
        let tok = TiktokenTokenizer::cl100k().unwrap();
        assert_eq!(
            tok.decode(&[CL100K_ORDINARY_TOKENS]),
            Err(TokenizerError::UnknownToken(CL100K_ORDINARY_TOKENS))
        );
    }
}
