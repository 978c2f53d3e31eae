//! Combination generation
//!
//! Produces the Cartesian power of the word set for one repetition level.
//! The position inside a level is a mixed-radix number with `level` digits
//! in base `|words|`, rightmost digit varying fastest, so the output order
//! matches nested loops over the word indices and the only state kept is
//! the digit vector.

use crate::filter::LengthFilter;
use crate::words::WordSet;

/// A bounded group of generated strings moved through the pipeline as one unit
pub type Batch = Vec<String>;

/// Lazy iterator over every concatenation of `level` words.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    words: &'a WordSet,
    digits: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    /// A level of 0 yields nothing.
    pub fn new(words: &'a WordSet, level: usize) -> Self {
        Self {
            words,
            digits: vec![0; level],
            exhausted: level == 0 || words.is_empty(),
        }
    }

    /// Next candidate accepted by `filter`. Rejected tuples are skipped
    /// without building their string.
    pub fn next_matching(&mut self, filter: Option<&LengthFilter>) -> Option<String> {
        while !self.exhausted {
            let accepted = match filter {
                Some(filter) => {
                    let lengths = self.words.lengths();
                    filter.matches_parts(self.digits.iter().map(|&i| lengths[i]))
                }
                None => true,
            };

            let candidate = accepted.then(|| self.build());
            self.advance();

            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }

    fn build(&self) -> String {
        let words = self.words.words();
        let capacity = self.digits.iter().map(|&i| words[i].len()).sum();
        let mut out = String::with_capacity(capacity);
        for &i in &self.digits {
            out.push_str(&words[i]);
        }
        out
    }

    /// Increment the counter by one.
    fn advance(&mut self) {
        let base = self.words.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
        // Every digit wrapped: the level is complete
        self.exhausted = true;
    }
}

impl Iterator for Combinations<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_matching(None)
    }
}

/// Groups a level's candidates into batches of at most `chunk_size`.
///
/// Never yields an empty batch: exhaustion is signalled by `None`.
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    combinations: Combinations<'a>,
    chunk_size: usize,
    filter: Option<LengthFilter>,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let mut batch = Vec::with_capacity(self.chunk_size);
        while batch.len() < self.chunk_size {
            match self.combinations.next_matching(self.filter.as_ref()) {
                Some(candidate) => batch.push(candidate),
                None => break,
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

/// Start generating one level. Restartable only by calling again.
pub fn generate(
    words: &WordSet,
    level: usize,
    chunk_size: usize,
    filter: Option<LengthFilter>,
) -> Batches<'_> {
    Batches {
        combinations: Combinations::new(words, level),
        chunk_size: chunk_size.max(1),
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn words(list: &[&str]) -> WordSet {
        WordSet::new(list.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_lexicographic_order() {
        let set = words(&["a", "b", "c"]);
        let all: Vec<String> = Combinations::new(&set, 2).collect();
        assert_eq!(
            all,
            vec!["aa", "ab", "ac", "ba", "bb", "bc", "ca", "cb", "cc"]
        );
    }

    #[test]
    fn test_full_cartesian_power() {
        let set = words(&["x", "yy", "zzz", "w"]);
        for level in 1..=4 {
            let all: Vec<String> = generate(&set, level, 7, None).flatten().collect();
            assert_eq!(all.len(), 4usize.pow(level as u32));

            let unique: HashSet<&String> = all.iter().collect();
            assert_eq!(unique.len(), all.len());
        }
    }

    #[test]
    fn test_batching_is_lossless() {
        let set = words(&["a", "b", "c"]);
        let flat: Vec<String> = Combinations::new(&set, 3).collect();

        for chunk_size in [1, 2, 5, 27, 100] {
            let batches: Vec<Batch> = generate(&set, 3, chunk_size, None).collect();
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= chunk_size));
            assert_eq!(batches.len(), 27usize.div_ceil(chunk_size));
            assert_eq!(batches.concat(), flat);
        }
    }

    #[test]
    fn test_duplicate_words_are_not_collapsed() {
        let set = words(&["a", "a"]);
        let all: Vec<String> = Combinations::new(&set, 2).collect();
        assert_eq!(all, vec!["aa", "aa", "aa", "aa"]);
    }

    #[test]
    fn test_level_zero_is_empty() {
        let set = words(&["a"]);
        assert_eq!(generate(&set, 0, 10, None).count(), 0);
    }

    #[test]
    fn test_length_filter_applied_per_tuple() {
        let set = words(&["a", "bb"]);
        let filter = Some(LengthFilter::new(2));

        let level1: Vec<String> = generate(&set, 1, 10, filter).flatten().collect();
        let level2: Vec<String> = generate(&set, 2, 10, filter).flatten().collect();
        assert_eq!(level1, vec!["bb"]);
        assert_eq!(level2, vec!["aa"]);
    }

    #[test]
    fn test_filtered_level_without_matches_yields_no_batch() {
        let set = words(&["aaa"]);
        assert!(generate(&set, 1, 10, Some(LengthFilter::new(2)))
            .next()
            .is_none());
    }

    #[test]
    fn test_concatenation_lengths() {
        let set = words(&["ab", "c"]);
        for s in Combinations::new(&set, 3) {
            assert!((3..=6).contains(&s.len()));
        }
    }
}
