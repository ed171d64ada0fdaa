//! CSV log of experiment timings.

use crate::error::{CorpusError, CorpusResult};
use newsidx_core::BackendKind;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Default log file name.
pub const DEFAULT_CSV_FILENAME: &str = "timing_data.csv";

/// Column names, in order.
pub const CSV_HEADER: [&str; 8] = [
    "run_id",
    "compute_proc_type",
    "primary_memory_size",
    "index_type",
    "num_docs_indexed",
    "num_tokens_indexed",
    "search_set_base_size",
    "search_time",
];

/// One row of the timing log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    /// Identifies the experiment the row belongs to.
    pub run_id: Uuid,
    /// CPU description, e.g. "Apple M1".
    pub compute_proc_type: String,
    /// Main memory in GB.
    pub primary_memory_size: u64,
    /// Backend that was searched.
    pub index_type: BackendKind,
    /// Documents in the indexed corpus.
    pub num_docs_indexed: usize,
    /// Distinct keys in the index.
    pub num_tokens_indexed: usize,
    /// Base size `n` of the search set.
    pub search_set_base_size: usize,
    /// Total search time; written in nanoseconds.
    pub search_time: Duration,
}

impl TimingRecord {
    fn fields(&self) -> [String; 8] {
        [
            self.run_id.to_string(),
            self.compute_proc_type.clone(),
            self.primary_memory_size.to_string(),
            self.index_type.to_string(),
            self.num_docs_indexed.to_string(),
            self.num_tokens_indexed.to_string(),
            self.search_set_base_size.to_string(),
            self.search_time.as_nanos().to_string(),
        ]
    }
}

/// Append-only CSV timing log.
#[derive(Debug, Clone)]
pub struct TimingLog {
    path: PathBuf,
}

impl TimingLog {
    /// A log at `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first if the file is new.
    pub fn append(&self, record: &TimingRecord) -> CorpusResult<()> {
        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CorpusError::io(&self.path, e))?;

        let mut out = String::new();
        if is_new {
            out.push_str(&CSV_HEADER.join(","));
            out.push('\n');
        }
        let row: Vec<String> = record.fields().iter().map(|f| escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');

        file.write_all(out.as_bytes())
            .map_err(|e| CorpusError::io(&self.path, e))
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
