//! Search-set generation and replay.
//!
//! A search set mixes four components so that both hits and misses, and
//! both single- and multi-word queries, are measured:
//!
//! - A: `n` keys sampled from the index (guaranteed hits)
//! - B: `n / 4` phrases of two or three words drawn from A
//! - C: `n` random ten-letter words (almost surely misses)
//! - D: `n / 4` phrases of two or three words drawn from C
//!
//! The four parts are concatenated and shuffled.

use crate::error::{CorpusError, CorpusResult};
use newsidx_core::{execute, DocumentId, Index, Query};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Seed of the first search set in an experiment.
pub const DEFAULT_BASE_SEED: u64 = 42;

/// Number of search sets generated per experiment.
pub const DEFAULT_RUNS: usize = 10;

/// Length of the random words in components C and D.
const RANDOM_WORD_LEN: usize = 10;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One generated search set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSet {
    /// Seed the set was generated from.
    pub seed: u64,
    /// Requested base size `n`.
    pub base_size: usize,
    /// Queries in replay order.
    pub queries: Vec<String>,
}

/// Result of replaying a search set against an index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRun {
    /// Lowercased query -> documents matching every word of it.
    pub hits: BTreeMap<String, Vec<DocumentId>>,
    /// Total lookup time of each query, in replay order.
    pub times: Vec<Duration>,
}

impl SearchRun {
    /// Sum of all query times.
    pub fn total_time(&self) -> Duration {
        self.times.iter().sum()
    }
}

/// Base size for a search set: a seeded draw from `1000..=10000`, times four.
pub fn sample_size(seed: u64) -> usize {
    StdRng::seed_from_u64(seed).gen_range(1000..=10000) * 4
}

/// Builds one search set of base size `n` from `keys`.
///
/// Component A samples without replacement, so it holds at most
/// `keys.len()` entries when the index is smaller than `n`.
pub fn generate_search_set<R: Rng + ?Sized>(
    keys: &[&str],
    n: usize,
    rng: &mut R,
) -> CorpusResult<Vec<String>> {
    if keys.is_empty() {
        return Err(CorpusError::EmptyIndex);
    }

    let component_a: Vec<String> = keys
        .choose_multiple(rng, n.min(keys.len()))
        .map(|key| (*key).to_owned())
        .collect();
    let component_b = phrases(&component_a, n / 4, rng);
    let component_c: Vec<String> = (0..n).map(|_| random_word(rng)).collect();
    let component_d = phrases(&component_c, n / 4, rng);

    let mut queries = component_a;
    queries.extend(component_b);
    queries.extend(component_c);
    queries.extend(component_d);
    queries.shuffle(rng);
    Ok(queries)
}

/// Generates `runs` search sets with seeds `base_seed`, `base_seed + 1`, ...
///
/// Seeds wrap around at `u64::MAX`.
pub fn generate_experiment_sets(
    keys: &[&str],
    runs: usize,
    base_seed: u64,
) -> CorpusResult<Vec<SearchSet>> {
    (0..runs as u64)
        .map(|i| {
            let seed = base_seed.wrapping_add(i);
            let base_size = sample_size(seed);
            let mut rng = StdRng::seed_from_u64(seed);
            let queries = generate_search_set(keys, base_size, &mut rng)?;
            debug!("search set seed={} n={} queries={}", seed, base_size, queries.len());
            Ok(SearchSet {
                seed,
                base_size,
                queries,
            })
        })
        .collect()
}

/// Runs every query of `set` against `index`.
///
/// Multi-word queries are answered with the intersection of each word's
/// documents; the recorded time is the sum of the per-word lookups.
/// Only queries with at least one matching document appear in `hits`.
pub fn run_search_set<I>(index: &I, set: &[String]) -> SearchRun
where
    I: Index<DocumentId> + ?Sized,
{
    let mut run = SearchRun {
        hits: BTreeMap::new(),
        times: Vec::with_capacity(set.len()),
    };
    for text in set {
        let query = Query::parse(text);
        let outcome = execute(index, &query);
        run.times.push(outcome.elapsed);
        if outcome.is_hit() {
            run.hits.insert(query.to_string(), outcome.documents);
        }
    }
    run
}

fn phrases<R: Rng + ?Sized>(words: &[String], count: usize, rng: &mut R) -> Vec<String> {
    if words.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| {
            let len = rng.gen_range(2..=3).min(words.len());
            words
                .choose_multiple(rng, len)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn random_word<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_WORD_LEN)
        .map(|_| char::from(LETTERS[rng.gen_range(0..LETTERS.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsidx_core::{AnyIndex, BackendKind};

    fn keys() -> Vec<String> {
        (0..50).map(|i| format!("key{i:02}")).collect()
    }

    #[test]
    fn sample_size_is_seeded_multiple_of_four() {
        for seed in 0..20 {
            let n = sample_size(seed);
            assert_eq!(n % 4, 0);
            assert!((4000..=40000).contains(&n));
            assert_eq!(n, sample_size(seed));
        }
    }

    #[test]
    fn search_set_has_four_components() {
        let keys = keys();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let set = generate_search_set(&keys, 40, &mut rng).unwrap();

        // A: 40, B: 10, C: 40, D: 10
        assert_eq!(set.len(), 100);
        let single_hits = set.iter().filter(|q| keys.contains(&q.as_str())).count();
        assert_eq!(single_hits, 40);
        let phrases = set.iter().filter(|q| q.contains(' ')).count();
        assert_eq!(phrases, 20);
        for phrase in set.iter().filter(|q| q.contains(' ')) {
            let words = phrase.split(' ').count();
            assert!((2..=3).contains(&words), "{phrase}");
        }
    }

    #[test]
    fn small_index_caps_component_a() {
        let keys = ["only", "two"];
        let mut rng = StdRng::seed_from_u64(1);
        let set = generate_search_set(&keys, 8, &mut rng).unwrap();
        // A: 2, B: 2, C: 8, D: 2
        assert_eq!(set.len(), 14);
    }

    #[test]
    fn empty_index_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_search_set(&[], 8, &mut rng).unwrap_err();
        assert!(matches!(err, CorpusError::EmptyIndex));
    }

    #[test]
    fn experiment_sets_are_reproducible() {
        let keys = keys();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let first = generate_experiment_sets(&keys, 2, DEFAULT_BASE_SEED).unwrap();
        let second = generate_experiment_sets(&keys, 2, DEFAULT_BASE_SEED).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].seed, 42);
        assert_eq!(first[1].seed, 43);
        assert_eq!(first[0].base_size, sample_size(42));
    }

    #[test]
    fn seeds_wrap_at_u64_max() {
        let keys = ["a", "b"];
        let sets = generate_experiment_sets(&keys, 2, u64::MAX).unwrap();

        assert_eq!(sets[0].seed, u64::MAX);
        assert_eq!(sets[1].seed, 0);
        assert_eq!(sets[1].base_size, sample_size(0));
    }

    #[test]
    fn replay_records_hits_and_times() {
        let mut index: AnyIndex<DocumentId> = AnyIndex::with_kind(BackendKind::Avl);
        for (token, doc) in [
            ("northeastern", "1.json"),
            ("beanpot", "1.json"),
            ("husky", "1.json"),
            ("northeastern", "2.json"),
            ("husky", "2.json"),
        ] {
            index.insert(token, DocumentId::from(doc));
        }

        let set: Vec<String> = [
            "Northeastern Beanpot Husky",
            "husky",
            "QwErTyUiOp",
            "northeastern husky",
        ]
        .iter()
        .map(|q| (*q).to_owned())
        .collect();
        let run = run_search_set(&index, &set);

        assert_eq!(run.times.len(), 4);
        assert_eq!(run.hits.len(), 3);
        assert_eq!(
            run.hits["northeastern beanpot husky"],
            vec![DocumentId::from("1.json")]
        );
        assert_eq!(run.hits["northeastern husky"].len(), 2);
        assert!(!run.hits.contains_key("qwertyuiop"));
        assert_eq!(run.total_time(), run.times.iter().sum::<Duration>());
    }
}
