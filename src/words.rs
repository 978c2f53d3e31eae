//! Base word loading
//!
//! Reads the word source, detects its encoding and transcodes it to UTF-8.
//! Word sources are small, so the whole file is decoded at once.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;

use crate::error::{GenError, Result};

/// Ordered, immutable set of base words.
///
/// Duplicates are kept. Lengths are measured in chars so they agree with
/// the length filter applied to generated strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSet {
    words: Vec<String>,
    lengths: Vec<usize>,
}

impl WordSet {
    /// Build a word set from memory. Fails if no word is left after trimming.
    pub fn new(words: Vec<String>) -> Result<Self> {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(GenError::config(
                "The source file is empty or contains no valid words",
            ));
        }

        let lengths = words.iter().map(|w| char_len(w)).collect();
        Ok(Self { words, lengths })
    }

    /// Load one word per line from `path`, skipping blank lines.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| GenError::WordSource {
            path: path.to_path_buf(),
            source,
        })?;

        let encoding = detect_encoding(&bytes);
        // `decode` strips a BOM matching the detected encoding
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            log::warn!("Encoding errors in {:?}, using lossy conversion", path);
        }
        log::debug!("Word source {:?} decoded as {}", path, encoding.name());

        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Char length of each word, index-aligned with `words()`.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn min_len(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0)
    }

    pub fn max_len(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    /// Total UTF-8 bytes of all words, used for size estimates.
    pub fn total_bytes(&self) -> u128 {
        self.words.iter().map(|w| w.len() as u128).sum()
    }
}

/// Length in chars, with a fast path for ASCII.
#[inline]
pub fn char_len(s: &str) -> usize {
    if s.is_ascii() {
        s.len()
    } else {
        s.chars().count()
    }
}

/// Detect the encoding of a buffer: BOM first, then statistical guess.
fn detect_encoding(content: &[u8]) -> &'static Encoding {
    if content.is_empty() {
        return encoding_rs::UTF_8;
    }

    if let Some((encoding, _)) = Encoding::for_bom(content) {
        return encoding;
    }

    if std::str::from_utf8(content).is_ok() {
        return encoding_rs::UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(content, true);
    detector.guess(None, true)
}
