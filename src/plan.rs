//! Feasibility planning
//!
//! Decides which repetition levels are worth generating and how much output
//! the run will produce. In target-length mode the expected counts are exact:
//! the number of word tuples whose lengths add up to the target is counted
//! per level with a small length-distribution table.

use std::ops::Range;

use crate::error::{GenError, Result};
use crate::words::WordSet;

/// Default number of strings per batch
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default ceiling on the total number of strings in unrestricted mode (1 billion)
pub const DEFAULT_FEASIBILITY_LIMIT: u64 = 1_000_000_000;

/// Inclusive range of repetition levels. `max_rep < min_rep` means nothing to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRange {
    pub min_rep: usize,
    pub max_rep: usize,
}

impl PlanRange {
    pub fn new(min_rep: usize, max_rep: usize) -> Self {
        Self { min_rep, max_rep }
    }

    pub fn is_empty(&self) -> bool {
        self.max_rep == 0 || self.min_rep > self.max_rep
    }

    /// Levels as a half-open range; rayon can split it into indexed tasks.
    pub fn levels(&self) -> Range<usize> {
        if self.is_empty() {
            1..1
        } else {
            self.min_rep..self.max_rep.saturating_add(1)
        }
    }

    /// Number of levels in the range
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.max_rep - self.min_rep + 1
        }
    }
}

/// Everything the orchestrator needs to know before starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub range: PlanRange,
    pub target_length: Option<usize>,
    pub chunk_size: usize,
    /// Batches the writer will report, one progress tick each
    pub total_batches: u64,
    /// Lines that will be written
    pub total_items: u128,
    /// Output size in bytes, newlines included
    pub estimated_bytes: u128,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() || self.total_items == 0
    }
}

/// Compute the plan for a run. Pure function of its inputs.
pub fn plan(
    words: &WordSet,
    target_length: Option<usize>,
    ceiling: u64,
    chunk_size: usize,
) -> Result<Plan> {
    if chunk_size == 0 {
        return Err(GenError::config("Chunk size must be at least 1"));
    }

    match target_length {
        Some(target) => plan_targeted(words, target, chunk_size),
        None => Ok(plan_unrestricted(words, ceiling, chunk_size)),
    }
}

/// Levels that can possibly produce a string of exactly `target` chars.
pub fn target_range(words: &WordSet, target: usize) -> Result<PlanRange> {
    if target == 0 {
        return Err(GenError::config("Target length must be at least 1"));
    }

    let min_len = words.min_len().max(1);
    let max_len = words.max_len().max(1);

    let max_rep = target.div_ceil(min_len);
    let min_rep = (target / max_len).max(1);

    if min_rep > max_rep {
        return Err(GenError::config(format!(
            "No repetition count can reach length {} (levels {}..={})",
            target, min_rep, max_rep
        )));
    }

    Ok(PlanRange::new(min_rep, max_rep))
}

/// Largest `r` such that `Σ_{i=1..r} word_count^i <= ceiling`.
///
/// A single word contributes exactly one string per level, so the sum at
/// level `r` is `r` and the answer is the ceiling itself.
pub fn max_repetition(word_count: usize, ceiling: u64) -> usize {
    match word_count {
        0 => 0,
        1 => usize::try_from(ceiling).unwrap_or(usize::MAX),
        n => {
            let n = n as u128;
            let ceiling = ceiling as u128;
            let mut total: u128 = 0;
            let mut level_size: u128 = 1;
            let mut repetition = 0usize;

            loop {
                level_size = level_size.saturating_mul(n);
                if total.saturating_add(level_size) > ceiling {
                    return repetition;
                }
                total += level_size;
                repetition += 1;
            }
        }
    }
}

fn plan_unrestricted(words: &WordSet, ceiling: u64, chunk_size: usize) -> Plan {
    let n = words.len();
    let range = PlanRange::new(1, max_repetition(n, ceiling));
    let word_bytes = words.total_bytes();
    let chunk = chunk_size as u128;

    let (total_items, total_batches, estimated_bytes) = if range.is_empty() {
        (0, 0, 0)
    } else if n == 1 {
        // One string per level; closed forms keep huge ranges cheap
        let levels = range.len() as u128;
        let rep_sum = (range.min_rep as u128 + range.max_rep as u128).saturating_mul(levels) / 2;
        (
            levels,
            levels,
            rep_sum.saturating_mul(word_bytes).saturating_add(levels),
        )
    } else {
        let mut items: u128 = 0;
        let mut batches: u128 = 0;
        let mut bytes: u128 = 0;
        for level in range.levels() {
            let count = pow_saturating(n as u128, level);
            // Every word appears `level * n^(level-1)` times across the level
            let level_bytes = (level as u128)
                .saturating_mul(pow_saturating(n as u128, level - 1))
                .saturating_mul(word_bytes)
                .saturating_add(count);

            items = items.saturating_add(count);
            batches = batches.saturating_add(count.div_ceil(chunk));
            bytes = bytes.saturating_add(level_bytes);
        }
        (items, batches, bytes)
    };

    Plan {
        range,
        target_length: None,
        chunk_size,
        total_batches: u64::try_from(total_batches).unwrap_or(u64::MAX),
        total_items,
        estimated_bytes,
    }
}

fn plan_targeted(words: &WordSet, target: usize, chunk_size: usize) -> Result<Plan> {
    let range = target_range(words, target)?;
    let chunk = chunk_size as u128;

    let mut total_items: u128 = 0;
    let mut total_batches: u128 = 0;
    let mut estimated_bytes: u128 = 0;

    for (level, (count, bytes)) in matches_per_level(words, target, range.max_rep)
        .into_iter()
        .enumerate()
    {
        if level + 1 < range.min_rep {
            continue;
        }
        total_items = total_items.saturating_add(count);
        total_batches = total_batches.saturating_add(count.div_ceil(chunk));
        estimated_bytes = estimated_bytes.saturating_add(bytes).saturating_add(count);
    }

    if total_items == 0 {
        return Err(GenError::config(format!(
            "No combination of the base words has length {} (levels {}..={})",
            target, range.min_rep, range.max_rep
        )));
    }

    Ok(Plan {
        range,
        target_length: Some(target),
        chunk_size,
        total_batches: u64::try_from(total_batches).unwrap_or(u64::MAX),
        total_items,
        estimated_bytes,
    })
}

/// For levels `1..=max_rep`: how many tuples have char length exactly
/// `target`, and their total UTF-8 byte size.
fn matches_per_level(words: &WordSet, target: usize, max_rep: usize) -> Vec<(u128, u128)> {
    let entries: Vec<(usize, u128)> = words
        .words()
        .iter()
        .zip(words.lengths())
        .map(|(w, &len)| (len, w.len() as u128))
        .collect();

    // counts[len] / bytes[len]: tuples of the current level with char length `len`
    let mut counts = vec![0u128; target + 1];
    let mut bytes = vec![0u128; target + 1];
    counts[0] = 1;

    let mut result = Vec::with_capacity(max_rep);
    for _ in 0..max_rep {
        let mut next_counts = vec![0u128; target + 1];
        let mut next_bytes = vec![0u128; target + 1];

        for len in 0..=target {
            if counts[len] == 0 {
                continue;
            }
            for &(word_len, word_bytes) in &entries {
                let new_len = len + word_len;
                if new_len > target {
                    continue;
                }
                next_counts[new_len] = next_counts[new_len].saturating_add(counts[len]);
                next_bytes[new_len] = next_bytes[new_len]
                    .saturating_add(bytes[len])
                    .saturating_add(counts[len].saturating_mul(word_bytes));
            }
        }

        counts = next_counts;
        bytes = next_bytes;
        result.push((counts[target], bytes[target]));
    }

    result
}

fn pow_saturating(base: u128, exp: usize) -> u128 {
    let exp = u32::try_from(exp).unwrap_or(u32::MAX);
    base.saturating_pow(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> WordSet {
        WordSet::new(list.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_max_repetition_accumulates_levels() {
        // 2 + 4 + 8 = 14 <= 14, adding 16 would exceed
        assert_eq!(max_repetition(2, 14), 3);
        assert_eq!(max_repetition(2, 29), 3);
        assert_eq!(max_repetition(2, 30), 4);
        assert_eq!(max_repetition(10, 1_000_000_000), 8);
    }

    #[test]
    fn test_max_repetition_first_level_too_large() {
        assert_eq!(max_repetition(5, 4), 0);
        assert_eq!(max_repetition(0, 100), 0);
    }

    #[test]
    fn test_single_word_terminates() {
        assert_eq!(max_repetition(1, 1_000), 1_000);

        let plan = plan(&words(&["x"]), None, 1_000, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(plan.range, PlanRange::new(1, 1_000));
        assert_eq!(plan.total_items, 1_000);
        assert_eq!(plan.total_batches, 1_000);
        // "x" * r plus newline for r in 1..=1000
        assert_eq!(plan.estimated_bytes, 500_500 + 1_000);
    }

    #[test]
    fn test_single_word_default_ceiling_is_cheap() {
        let plan = plan(&words(&["x"]), None, DEFAULT_FEASIBILITY_LIMIT, 10).unwrap();
        assert_eq!(plan.range.max_rep, 1_000_000_000);
        assert_eq!(plan.total_batches, 1_000_000_000);
    }

    #[test]
    fn test_unrestricted_totals() {
        let plan = plan(&words(&["a", "b"]), None, 6, 4).unwrap();
        assert_eq!(plan.range, PlanRange::new(1, 2));
        assert_eq!(plan.total_items, 6);
        // level 1: 2 items -> 1 batch, level 2: 4 items -> 1 batch
        assert_eq!(plan.total_batches, 2);
        // a b aa ab ba bb, each with a newline
        assert_eq!(plan.estimated_bytes, 2 * 2 + 4 * 3);
    }

    #[test]
    fn test_empty_range_is_not_an_error() {
        let plan = plan(&words(&["a", "b", "c"]), None, 2, 10).unwrap();
        assert!(plan.range.is_empty());
        assert!(plan.is_empty());
        assert_eq!(plan.range.levels().count(), 0);
        assert_eq!(plan.total_batches, 0);
    }

    #[test]
    fn test_target_range() {
        let set = words(&["a", "bb"]);
        assert_eq!(target_range(&set, 2).unwrap(), PlanRange::new(1, 2));

        let set = words(&["abc", "defgh"]);
        // floor(10/5) = 2, ceil(10/3) = 4
        assert_eq!(target_range(&set, 10).unwrap(), PlanRange::new(2, 4));
    }

    #[test]
    fn test_target_min_rep_clamped() {
        let set = words(&["aaaa"]);
        assert_eq!(target_range(&set, 2).unwrap(), PlanRange::new(1, 1));
    }

    #[test]
    fn test_zero_target_rejected() {
        let err = target_range(&words(&["a"]), 0).unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));
    }

    #[test]
    fn test_targeted_counts_are_exact() {
        let plan = plan(&words(&["a", "bb"]), Some(2), 0, 10).unwrap();
        // "bb" at level 1, "aa" at level 2
        assert_eq!(plan.total_items, 2);
        assert_eq!(plan.total_batches, 2);
        assert_eq!(plan.estimated_bytes, 6);
    }

    #[test]
    fn test_unreachable_target_is_configuration_error() {
        // The only level in range yields "aaaa", never length 2
        let err = plan(&words(&["aaaa"]), Some(2), 0, 10).unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));

        // Odd target from even-length words
        let err = plan(&words(&["ab", "cdef"]), Some(5), 0, 10).unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));
    }

    #[test]
    fn test_levels_cover_max_rep() {
        assert_eq!(PlanRange::new(2, 4).levels().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(PlanRange::new(3, 3).levels().collect::<Vec<_>>(), vec![3]);
        assert_eq!(PlanRange::new(1, 0).levels().count(), 0);
        assert_eq!(PlanRange::new(5, usize::MAX).levels().len(), usize::MAX - 5);
    }

    #[test]
    fn test_targeted_multibyte_bytes() {
        // "é" is one char, two bytes
        let plan = plan(&words(&["é", "ab"]), Some(2), 0, 10).unwrap();
        // level 1: "ab"; level 2: "éé"
        assert_eq!(plan.total_items, 2);
        assert_eq!(plan.estimated_bytes, (2 + 1) + (4 + 1));
    }

    #[test]
    fn test_plan_is_pure() {
        let set = words(&["pass", "word", "123", "!"]);
        let a = plan(&set, Some(8), 1000, 7).unwrap();
        let b = plan(&set, Some(8), 1000, 7).unwrap();
        assert_eq!(a, b);

        let c = plan(&set, None, 1000, 7).unwrap();
        let d = plan(&set, None, 1000, 7).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(plan(&words(&["a"]), None, 10, 0).is_err());
    }
}
