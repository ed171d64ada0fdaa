//! Walking a dataset directory into an index.

use crate::article::Article;
use crate::error::{CorpusError, CorpusResult};
use newsidx_core::{DocumentId, Index};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Summary of one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Articles parsed and indexed.
    pub documents: usize,
    /// `.json` files skipped because they did not parse.
    pub skipped: usize,
    /// `(token, document)` pairs handed to the index.
    pub postings: usize,
}

/// Indexes every `.json` article under `root`, recursively.
///
/// Files are visited in sorted path order so repeated builds insert in
/// the same sequence. Each article's distinct tokens are inserted once
/// with the file name as the document ID. Files that fail to parse are
/// logged and skipped.
pub fn index_directory<I>(root: &Path, index: &mut I) -> CorpusResult<IngestReport>
where
    I: Index<DocumentId> + ?Sized,
{
    if !root.is_dir() {
        return Err(CorpusError::DatasetNotFound(root.to_path_buf()));
    }
    info!("Indexing articles under {:?}", root);

    let mut report = IngestReport::default();
    for path in json_files(root)? {
        let data = fs::read(&path).map_err(|e| CorpusError::io(&path, e))?;
        let article = match Article::from_json(&data) {
            Ok(article) => article,
            Err(e) => {
                warn!("Error decoding JSON in file {:?}: {}", path, e);
                report.skipped += 1;
                continue;
            }
        };

        let doc = document_id(&path);
        let tokens = article.tokens();
        debug!("{}: {} tokens", doc, tokens.len());
        for token in &tokens {
            index.insert(token, doc.clone());
        }
        report.documents += 1;
        report.postings += tokens.len();
    }

    info!(
        "Indexed {} documents ({} skipped, {} postings, {} keys)",
        report.documents,
        report.skipped,
        report.postings,
        index.len()
    );
    Ok(report)
}

/// All `.json` files below `root`, sorted.
pub fn json_files(root: &Path) -> CorpusResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| CorpusError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CorpusError::io(&dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| CorpusError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn document_id(path: &Path) -> DocumentId {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
        .into()
}
