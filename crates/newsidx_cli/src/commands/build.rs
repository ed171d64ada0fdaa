//! Build command implementation.

use newsidx_core::{save_to_file, AnyIndex, BackendKind, DocumentId, Index, IndexConfig};
use newsidx_corpus::index_directory;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Runs the build command.
pub fn run(
    dataset: &Path,
    backend: BackendKind,
    capacity: Option<usize>,
    output: Option<&Path>,
    print_keys: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = IndexConfig::new().backend(backend);
    if let Some(capacity) = capacity {
        config = config.hash_capacity(capacity);
    }
    let mut index: AnyIndex<DocumentId> = AnyIndex::new(&config)?;

    info!("Building {} index from {:?}", backend, dataset);
    let start = Instant::now();
    let report = index_directory(dataset, &mut index)?;
    let elapsed = start.elapsed();

    println!("✓ Index built");
    println!("  Documents: {}", report.documents);
    println!("  Skipped:   {}", report.skipped);
    println!("  Postings:  {}", report.postings);
    println!("  Elapsed:   {:.3}s", elapsed.as_secs_f64());
    println!();
    println!("{}", index.stats());

    if let Some(output) = output {
        save_to_file(&index, output)?;
        println!();
        println!("✓ Saved to {:?}", output);
    }

    if print_keys {
        for key in index.keys_in_order() {
            println!("{key}");
        }
    }

    Ok(())
}
