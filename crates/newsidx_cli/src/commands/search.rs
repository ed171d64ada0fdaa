//! Search command implementation.

use newsidx_core::{execute, load_from_file, AnyIndex, DocumentId, Index, Query};
use std::path::Path;
use tracing::info;

/// Runs the search command.
pub fn run(index_path: &Path, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading index from {:?}", index_path);
    let index: AnyIndex<DocumentId> = load_from_file(index_path)?;

    let query = Query::parse(text);
    if query.is_empty() {
        return Err("Query has no words".into());
    }
    let outcome = execute(&index, &query);

    println!("Query: {} ({} backend)", query, index.kind());
    for (term, time) in outcome.terms.iter().zip(&outcome.token_times) {
        println!(
            "  {:<20} {:>6} docs  {:>10} ns",
            term,
            index.search(term).len(),
            time.as_nanos()
        );
    }
    println!("Total lookup time: {} ns", outcome.elapsed.as_nanos());
    println!();

    if outcome.documents.is_empty() {
        println!("No documents match every word");
    } else {
        println!("{} matching documents:", outcome.documents.len());
        for doc in &outcome.documents {
            println!("  {doc}");
        }
    }

    Ok(())
}
