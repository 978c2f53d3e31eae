//! Exact-length filtering of generated candidates
//!
//! Lengths are counted in chars. Because a candidate is a concatenation of
//! base words, its length is also the sum of its parts' lengths, which lets
//! the generator reject a tuple before building the string.

/// Keeps only candidates of one exact length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthFilter {
    length: usize,
}

impl LengthFilter {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Check a tuple by the char lengths of its parts.
    #[inline]
    pub fn matches_parts<I>(&self, part_lengths: I) -> bool
    where
        I: IntoIterator<Item = usize>,
    {
        let mut total = 0usize;
        for len in part_lengths {
            total += len;
            if total > self.length {
                return false;
            }
        }
        total == self.length
    }
}
