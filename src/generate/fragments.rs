//! Fragment permutation generator

use std::collections::BTreeSet;

use super::{length_range, wants_empty, CandidateGenerator, MAX_CANDIDATES};
use crate::types::Strategy;

/// Builds labels by concatenating ordered selections of fragments.
///
/// The fragment list is treated as a sequence of slots: a fragment value that
/// appears twice occupies two slots, and no slot is used twice within one label.
pub struct FragmentGenerator {
    fragments: Vec<String>,
}

impl FragmentGenerator {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    fn permute(
        &self,
        depth: usize,
        used: &mut [bool],
        current: &mut String,
        out: &mut BTreeSet<String>,
    ) {
        if depth == 0 {
            // Empty fragments may concatenate to ""; that label is reserved
            // for the include-empty flag.
            if !current.is_empty() {
                out.insert(current.clone());
            }
            return;
        }

        for (slot, fragment) in self.fragments.iter().enumerate() {
            if used[slot] {
                continue;
            }
            used[slot] = true;
            let mark = current.len();
            current.push_str(fragment);

            self.permute(depth - 1, used, current, out);

            current.truncate(mark);
            used[slot] = false;
        }
    }
}

/// Number of ordered selections of `r` slots out of `n`
fn permutation_count(n: usize, r: usize) -> Option<u64> {
    if r > n {
        return Some(0);
    }
    ((n - r + 1)..=n).try_fold(1u64, |acc, k| acc.checked_mul(k as u64))
}

impl CandidateGenerator for FragmentGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Fragments
    }

    fn generate(&self, min_len: usize, max_len: usize, include_empty: bool) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if wants_empty(include_empty, min_len) {
            out.insert(String::new());
        }

        let mut used = vec![false; self.fragments.len()];
        let mut current = String::new();
        for r in length_range(min_len, max_len) {
            if r > self.fragments.len() {
                break;
            }
            self.permute(r, &mut used, &mut current, &mut out);
        }

        tracing::debug!(
            fragments = self.fragments.len(),
            labels = out.len(),
            "Generated labels from fragments"
        );
        out
    }

    fn estimate(&self, min_len: usize, max_len: usize, include_empty: bool) -> Option<u64> {
        let n = self.fragments.len();
        let mut count = u64::from(wants_empty(include_empty, min_len));
        // Every r above n contributes zero.
        for r in length_range(min_len, max_len.min(n)) {
            count = count.checked_add(permutation_count(n, r)?)?;
            if count > MAX_CANDIDATES {
                break;
            }
        }
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(fragments: &[&str]) -> FragmentGenerator {
        FragmentGenerator::new(fragments.iter().map(|s| s.to_string()).collect())
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_fragments_up_to_two() {
        let labels = gen(&["a", "b"]).generate(1, 2, false);
        assert_eq!(labels, set(&["a", "b", "ab", "ba"]));
    }

    #[test]
    fn test_no_slot_reused() {
        let labels = gen(&["a", "b"]).generate(2, 2, false);
        assert!(!labels.contains("aa"));
        assert!(!labels.contains("bb"));
    }

    #[test]
    fn test_duplicate_fragments_are_distinct_slots() {
        // "a" twice: "aa" is reachable through two different slots.
        let labels = gen(&["a", "a", "b"]).generate(2, 2, false);
        assert_eq!(labels, set(&["aa", "ab", "ba"]));
    }

    #[test]
    fn test_count_matches_npr_for_distinct_fragments() {
        let g = gen(&["api", "dev", "www", "mail"]);
        for r in 1..=4 {
            let labels = g.generate(r, r, false);
            assert_eq!(labels.len() as u64, permutation_count(4, r).unwrap());
        }
    }

    #[test]
    fn test_collisions_reduce_distinct_count() {
        // "a"+"bc" and "ab"+"c" collide on "abc".
        let g = gen(&["a", "bc", "ab", "c"]);
        let labels = g.generate(2, 2, false);
        assert!(labels.len() < permutation_count(4, 2).unwrap() as usize);
        assert!(labels.contains("abc"));
    }

    #[test]
    fn test_length_beyond_population_is_empty() {
        let labels = gen(&["a", "b"]).generate(3, 5, false);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_inverted_bounds_only_empty_label() {
        let g = gen(&["a", "b"]);
        assert_eq!(g.generate(0, 0, true), set(&[""]));
        assert!(g.generate(2, 1, true).is_empty());
    }

    #[test]
    fn test_empty_fragment_never_yields_empty_label() {
        let labels = gen(&["", "x"]).generate(1, 2, false);
        assert_eq!(labels, set(&["x"]));
    }

    #[test]
    fn test_estimate() {
        let g = gen(&["a", "b", "c"]);
        // 3 + 6 + 6
        assert_eq!(g.estimate(1, 3, false), Some(15));
        assert_eq!(g.estimate(0, 3, true), Some(16));
        assert_eq!(g.estimate(1, 10, false), Some(15));
        assert_eq!(g.estimate(4, 2, true), Some(0));
    }

    #[test]
    fn test_estimate_stops_past_cap() {
        let words: Vec<String> = (0..30).map(|i| format!("w{}", i)).collect();
        let g = FragmentGenerator::new(words);
        // 30P5 alone is past the cap; larger r would overflow u64
        let count = g.estimate(1, 30, false).unwrap();
        assert!(count > MAX_CANDIDATES);
    }

    #[test]
    fn test_permutation_count() {
        assert_eq!(permutation_count(5, 0), Some(1));
        assert_eq!(permutation_count(5, 2), Some(20));
        assert_eq!(permutation_count(2, 3), Some(0));
        assert_eq!(permutation_count(100, 100), None);
    }
}
