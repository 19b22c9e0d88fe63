//! Fixed-alphabet combination generator

use std::collections::BTreeSet;

use super::{length_range, wants_empty, CandidateGenerator, MAX_CANDIDATES};
use crate::types::Strategy;

/// Builds every string of a given length over an alphabet, with repetition
pub struct CharsetGenerator {
    chars: Vec<char>,
}

impl CharsetGenerator {
    pub fn new(alphabet: &str) -> Self {
        Self {
            chars: alphabet.chars().collect(),
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of strings of `length` over the alphabet
    pub fn total_combinations(&self, length: usize) -> Option<u64> {
        let length = u32::try_from(length).ok()?;
        (self.chars.len() as u64).checked_pow(length)
    }

    /// Insert the full product of the alphabet taken `length` at a time
    fn product_into(&self, length: usize, out: &mut BTreeSet<String>) {
        if self.chars.is_empty() {
            return;
        }

        let base = self.chars.len();
        let mut digits = vec![0usize; length];
        loop {
            out.insert(digits.iter().map(|&d| self.chars[d]).collect());

            // Odometer increment, rightmost position fastest
            let mut pos = length;
            loop {
                if pos == 0 {
                    return;
                }
                pos -= 1;
                digits[pos] += 1;
                if digits[pos] < base {
                    break;
                }
                digits[pos] = 0;
            }
        }
    }
}

impl CandidateGenerator for CharsetGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Charset
    }

    fn generate(&self, min_len: usize, max_len: usize, include_empty: bool) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if wants_empty(include_empty, min_len) {
            out.insert(String::new());
        }

        for length in length_range(min_len, max_len) {
            self.product_into(length, &mut out);
        }

        tracing::debug!(
            alphabet = self.chars.len(),
            labels = out.len(),
            "Generated labels from character set"
        );
        out
    }

    fn estimate(&self, min_len: usize, max_len: usize, include_empty: bool) -> Option<u64> {
        let mut count = u64::from(wants_empty(include_empty, min_len));
        if self.chars.is_empty() {
            return Some(count);
        }
        for length in length_range(min_len, max_len) {
            count = count.checked_add(self.total_combinations(length)?)?;
            if count > MAX_CANDIDATES {
                break;
            }
        }
        Some(count)
    }
}
