//! Candidate label generation
//!
//! Two strategies produce the set of subdomain labels to probe:
//! permutations of a fragment list, and fixed-alphabet character products.
//! Both return a `BTreeSet`, so the result is de-duplicated and iterates in
//! lexicographic order.

mod charset;
mod fragments;

pub use charset::CharsetGenerator;
pub use fragments::FragmentGenerator;

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::types::{RunConfig, Strategy};

/// Upper bound on candidates a single run may generate
pub const MAX_CANDIDATES: u64 = 10_000_000;

/// Longest DNS label, in characters
pub const MAX_LABEL_LEN: usize = 63;

/// Common contract of the generation strategies
pub trait CandidateGenerator: Send + Sync {
    /// Strategy implemented by this generator
    fn strategy(&self) -> Strategy;

    /// Enumerate every label with length (or fragment count) in `min_len..=max_len`.
    ///
    /// The empty label is included only when `include_empty` is set and
    /// `min_len` is zero.
    fn generate(&self, min_len: usize, max_len: usize, include_empty: bool) -> BTreeSet<String>;

    /// Upper bound on the number of labels `generate` would produce.
    ///
    /// Counting stops as soon as the total passes `MAX_CANDIDATES`, so any
    /// value above the cap only means "too many". Returns `None` if the
    /// count does not fit in a `u64`.
    fn estimate(&self, min_len: usize, max_len: usize, include_empty: bool) -> Option<u64>;
}

/// Pick the generator configured for this run
pub fn generator_for(config: &RunConfig) -> Box<dyn CandidateGenerator> {
    match config.strategy {
        Strategy::Fragments => Box::new(FragmentGenerator::new(config.fragments.clone())),
        Strategy::Charset => Box::new(CharsetGenerator::new(&config.charset)),
    }
}

/// Generate the candidate set for a run configuration
pub fn generate_candidates(config: &RunConfig) -> BTreeSet<String> {
    let generator = generator_for(config);
    let candidates = generator.generate(config.min_len, config.max_len, config.include_empty);

    tracing::info!(
        strategy = %generator.strategy(),
        min_len = config.min_len,
        max_len = config.max_len,
        candidates = candidates.len(),
        "Candidate generation completed"
    );

    candidates
}

/// Lengths the generation loop visits; the lower bound is clamped to 1
pub(crate) fn length_range(min_len: usize, max_len: usize) -> RangeInclusive<usize> {
    min_len.max(1)..=max_len
}

pub(crate) fn wants_empty(include_empty: bool, min_len: usize) -> bool {
    include_empty && min_len == 0
}
