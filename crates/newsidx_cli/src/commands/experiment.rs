//! Experiment command implementation.

use newsidx_core::{load_from_file, AnyIndex, DocumentId, Index};
use newsidx_corpus::{generate_experiment_sets, run_search_set, TimingLog, TimingRecord};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Settings for one experiment.
#[derive(Debug, Clone)]
pub struct ExperimentOptions {
    /// Number of search sets.
    pub runs: usize,
    /// Seed of the first search set.
    pub seed: u64,
    /// CSV log path.
    pub csv: PathBuf,
    /// Corpus size override.
    pub num_docs: Option<usize>,
    /// CPU description.
    pub proc_type: String,
    /// Main memory in GB.
    pub memory_gb: u64,
}

/// Runs the experiment command.
pub fn run(
    index_path: &Path,
    options: &ExperimentOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading index from {:?}", index_path);
    let index: AnyIndex<DocumentId> = load_from_file(index_path)?;
    let keys = index.keys_in_order();
    let num_docs = options.num_docs.unwrap_or_else(|| distinct_documents(&index));

    let sets = generate_experiment_sets(&keys, options.runs, options.seed)?;
    let log = TimingLog::new(&options.csv);
    info!(
        "Replaying {} search sets against {} index ({} keys, {} documents)",
        sets.len(),
        index.kind(),
        keys.len(),
        num_docs
    );

    for set in &sets {
        let run = run_search_set(&index, &set.queries);
        let record = TimingRecord {
            run_id: Uuid::new_v4(),
            compute_proc_type: options.proc_type.clone(),
            primary_memory_size: options.memory_gb,
            index_type: index.kind(),
            num_docs_indexed: num_docs,
            num_tokens_indexed: keys.len(),
            search_set_base_size: set.base_size,
            search_time: run.total_time(),
        };
        log.append(&record)?;

        println!(
            "seed {:>4}  n={:<6} queries={:<6} hits={:<6} total={} ns",
            set.seed,
            set.base_size,
            set.queries.len(),
            run.hits.len(),
            record.search_time.as_nanos()
        );
    }

    println!("✓ Appended {} rows to {:?}", sets.len(), log.path());
    Ok(())
}

fn distinct_documents(index: &AnyIndex<DocumentId>) -> usize {
    index
        .entries()
        .flat_map(|(_, docs)| docs)
        .collect::<HashSet<_>>()
        .len()
}
