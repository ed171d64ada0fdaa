//! Inspect command implementation.

use newsidx_core::{AnyIndex, DocumentId, Index, IndexStats};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Index inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Index file path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Structural statistics.
    pub stats: IndexStats,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting index {:?}", path);
    let data = fs::read(path)?;
    let index: AnyIndex<DocumentId> = AnyIndex::from_bytes(&data)?;

    let result = InspectResult {
        path: path.display().to_string(),
        file_size: data.len() as u64,
        stats: index.stats(),
    };

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Index: {}", result.path);
    println!("File size:      {} bytes", result.file_size);
    println!("{}", result.stats);
}
