//! Conjunctive multi-token queries with per-lookup timing.
//!
//! A query is split into lowercase terms. Each term is looked up once,
//! with the wall-clock time of every lookup recorded, and the result is
//! the set of values present under every term.

use crate::index::{Index, IndexValue};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    /// Lowercases `text` and splits it on whitespace.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            terms: text.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// The query terms, in order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if the query has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms.join(" "))
    }
}

/// Runs `f` once and returns its result with the elapsed wall-clock time.
pub fn timed<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Result of executing a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome<V> {
    /// The terms that were searched.
    pub terms: Vec<String>,
    /// Values found under every term, in the first term's order.
    pub documents: Vec<V>,
    /// Time spent in each term's lookup, in term order.
    pub token_times: Vec<Duration>,
    /// Sum of `token_times`.
    pub elapsed: Duration,
}

impl<V> QueryOutcome<V> {
    /// Returns true if any document matched.
    pub fn is_hit(&self) -> bool {
        !self.documents.is_empty()
    }
}

/// Looks up every term of `query` and intersects the results.
///
/// Every term is searched (and timed) even when an earlier term already
/// matched nothing, so latency figures are comparable across queries.
/// An empty query matches nothing.
pub fn execute<V, I>(index: &I, query: &Query) -> QueryOutcome<V>
where
    V: IndexValue,
    I: Index<V> + ?Sized,
{
    let mut lists: Vec<&[V]> = Vec::with_capacity(query.len());
    let mut token_times = Vec::with_capacity(query.len());
    for term in query.terms() {
        let (values, elapsed) = timed(|| index.search(term));
        lists.push(values);
        token_times.push(elapsed);
    }

    QueryOutcome {
        terms: query.terms().to_vec(),
        documents: intersect(&lists),
        elapsed: token_times.iter().sum(),
        token_times,
    }
}

/// Values of the first list present in every other list, first occurrence only.
fn intersect<V: IndexValue>(lists: &[&[V]]) -> Vec<V> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&V>> = rest.iter().map(|list| list.iter().collect()).collect();

    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|value| others.iter().all(|set| set.contains(value)))
        .filter(|value| seen.insert(*value))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{AnyIndex, SortedArrayIndex};
    use crate::types::{BackendKind, DocumentId};

    fn corpus(kind: BackendKind) -> AnyIndex<DocumentId> {
        let mut index = match kind {
            BackendKind::Hash => AnyIndex::Hash(crate::index::HashMapIndex::with_capacity(32)),
            other => AnyIndex::with_kind(other),
        };
        let docs = [
            ("1.json", "northeastern beanpot husky hockey"),
            ("2.json", "northeastern husky"),
            ("3.json", "beanpot boston husky northeastern"),
            ("4.json", "boston college beanpot"),
        ];
        for (doc, text) in docs {
            for token in text.split_whitespace() {
                index.insert(token, DocumentId::from(doc));
            }
        }
        index
    }

    #[test]
    fn parse_lowercases_and_splits() {
        let query = Query::parse("  Northeastern   BEANPOT husky ");
        assert_eq!(query.terms(), &["northeastern", "beanpot", "husky"]);
        assert_eq!(query.to_string(), "northeastern beanpot husky");
        assert!(Query::parse("   ").is_empty());
    }

    #[test]
    fn three_term_query_intersects() {
        for kind in BackendKind::ALL {
            let index = corpus(kind);
            let outcome = execute(&index, &Query::parse("Northeastern Beanpot Husky"));

            let mut docs: Vec<_> = outcome.documents.iter().map(DocumentId::as_str).collect();
            docs.sort_unstable();
            assert_eq!(docs, vec!["1.json", "3.json"], "{kind}");
            assert_eq!(outcome.token_times.len(), 3);
        }
    }

    #[test]
    fn single_term_returns_full_list() {
        let index = corpus(BackendKind::Array);
        let outcome = execute(&index, &Query::parse("boston"));
        assert_eq!(outcome.documents.len(), 2);
        assert!(outcome.is_hit());
    }

    #[test]
    fn unknown_term_empties_result_but_is_timed() {
        let index = corpus(BackendKind::Avl);
        let outcome = execute(&index, &Query::parse("qwertyuiop husky"));
        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.token_times.len(), 2);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let index = corpus(BackendKind::Bst);
        let outcome = execute(&index, &Query::default());
        assert!(!outcome.is_hit());
        assert_eq!(outcome.elapsed, Duration::ZERO);
        assert!(outcome.terms.is_empty());
    }

    #[test]
    fn duplicates_in_tree_lists_collapse() {
        let mut index: AnyIndex<u64> = AnyIndex::with_kind(BackendKind::Bst);
        index.insert("a", 1);
        index.insert("a", 1);
        index.insert("a", 2);
        index.insert("b", 1);

        assert_eq!(execute(&index, &Query::parse("a")).documents, vec![1, 2]);
        assert_eq!(execute(&index, &Query::parse("a b")).documents, vec![1]);
    }

    #[test]
    fn works_through_trait_objects() {
        let mut array: SortedArrayIndex<u64> = SortedArrayIndex::new();
        array.insert("x", 9);
        let dynamic: &dyn Index<u64> = &array;
        assert_eq!(execute(dynamic, &Query::parse("x")).documents, vec![9]);
    }

    #[test]
    fn timed_returns_result() {
        let (value, elapsed) = timed(|| 21 * 2);
        assert_eq!(value, 42);
        assert!(elapsed < Duration::from_secs(1));
    }
}
