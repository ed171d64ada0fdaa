//! Benchmark utilities.

use newsidx_core::{AnyIndex, BackendKind, Index};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate `count` random lowercase tokens of 3 to 12 letters.
pub fn random_tokens(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(3..=12);
            (0..len).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect()
        })
        .collect()
}

/// Generate `(token, document)` postings spread over `docs` documents.
pub fn generate_postings(tokens: &[String], docs: u64, seed: u64) -> Vec<(String, u64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    tokens
        .iter()
        .map(|token| (token.clone(), rng.gen_range(0..docs.max(1))))
        .collect()
}

/// Build an index of `kind` from postings.
pub fn build_index(kind: BackendKind, postings: &[(String, u64)]) -> AnyIndex<u64> {
    let mut index = AnyIndex::with_kind(kind);
    index.extend_pairs(postings.iter().map(|(token, doc)| (token.as_str(), *doc)));
    index
}
