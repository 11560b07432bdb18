//! Overlapping, token-bounded windows over a text.
//!
//! A [`WindowSplitter`] walks the token sequence of a text with a fixed
//! width (`chunk_size`) and stride (`chunk_size - overlap`):
//!
//! ```text
//! tokens   0 ─────────────────────────────────────────────── N
//! window 0 [0 ............ chunk)
//! window 1            [stride ............ stride + chunk)
//! window 2                         [2·stride ........ N)
//!                     └ overlap ┘
//! ```
//!
//! Text that already fits in one window is returned verbatim, without a
//! decode round-trip.

use serde::Serialize;

use super::tokenizer::Tokenizer;
use crate::error::{SummarizeError, TokenizerError};

/// A contiguous slice of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Position in the sequence of windows for one split.
    pub index: usize,
    /// First token offset (inclusive).
    pub start: usize,
    /// Last token offset (exclusive).
    pub end: usize,
    /// The materialized text of `[start, end)`.
    pub text: String,
}

impl Window {
    pub fn token_len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits text into overlapping windows of at most `chunk_size` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl WindowSplitter {
    /// Requires `chunk_size > 0` and `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, SummarizeError> {
        if chunk_size == 0 {
            return Err(SummarizeError::InvalidInput(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if overlap >= chunk_size {
            return Err(SummarizeError::InvalidInput(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` into windows, in ascending start order.
    ///
    /// Returns an empty vector for text with no tokens.
    pub fn split(
        &self,
        tokenizer: &dyn Tokenizer,
        text: &str,
    ) -> Result<Vec<Window>, TokenizerError> {
        let tokens = tokenizer.encode(text);
        let total = tokens.len();

        if total == 0 {
            return Ok(Vec::new());
        }
        if total <= self.chunk_size {
            return Ok(vec![Window {
                index: 0,
                start: 0,
                end: total,
                text: text.to_string(),
            }]);
        }

        (0..total)
            .step_by(self.stride())
            .enumerate()
            .map(|(index, start)| {
                let end = (start + self.chunk_size).min(total);
                Ok(Window {
                    index,
                    start,
                    end,
                    text: tokenizer.decode(&tokens[start..end])?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::WordTokenizer;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(WindowSplitter::new(0, 0).is_err());
        assert!(WindowSplitter::new(10, 10).is_err());
        assert!(WindowSplitter::new(10, 11).is_err());
        assert!(WindowSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn empty_text_yields_no_windows() {
        let splitter = WindowSplitter::new(10, 2).unwrap();
        let tok = WordTokenizer::new();
        assert!(splitter.split(&tok, "").unwrap().is_empty());
        assert!(splitter.split(&tok, "   ").unwrap().is_empty());
    }

    #[test]
    fn short_text_is_returned_verbatim() {
        let splitter = WindowSplitter::new(10, 2).unwrap();
        let tok = WordTokenizer::new();
        let text = "fits  in\none window";
        let windows = splitter.split(&tok, text).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text, text);
        assert_eq!((windows[0].start, windows[0].end), (0, 4));
    }

    #[test]
    fn two_thousand_tokens_make_three_windows() {
        let splitter = WindowSplitter::new(900, 50).unwrap();
        let tok = WordTokenizer::new();
        let windows = splitter.split(&tok, &numbered_words(2000)).unwrap();

        let starts: Vec<usize> = windows.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![0, 850, 1700]);
        let ends: Vec<usize> = windows.iter().map(|w| w.end).collect();
        assert_eq!(ends, vec![900, 1750, 2000]);
        let indexes: Vec<usize> = windows.iter().map(|w| w.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn window_text_matches_token_range() {
        let splitter = WindowSplitter::new(4, 1).unwrap();
        let tok = WordTokenizer::new();
        let windows = splitter.split(&tok, &numbered_words(10)).unwrap();

        assert_eq!(windows[0].text, "w0 w1 w2 w3");
        assert_eq!(windows[1].text, "w3 w4 w5 w6");
        assert_eq!(windows[2].text, "w6 w7 w8 w9");
        assert_eq!(windows[3].text, "w9");
        assert!(windows.iter().all(|w| w.token_len() <= 4));
    }

    #[test]
    fn zero_overlap_tiles_exactly() {
        let splitter = WindowSplitter::new(5, 0).unwrap();
        let tok = WordTokenizer::new();
        let windows = splitter.split(&tok, &numbered_words(12)).unwrap();
        let ranges: Vec<(usize, usize)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(ranges, vec![(0, 5), (5, 10), (10, 12)]);
    }
}
