//! # newsidx corpus
//!
//! Everything around the index backends that touches the outside world:
//!
//! - [`tokenize`] and [`Article`] for the news-article JSON format
//! - [`index_directory`] to build any backend from a dataset directory
//! - search-set generation and replay for latency experiments
//! - [`TimingLog`] for appending experiment results to CSV

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod article;
mod error;
pub mod experiment;
mod ingest;
mod timing_log;
mod tokenize;

pub use article::Article;
pub use error::{CorpusError, CorpusResult};
pub use experiment::{
    generate_experiment_sets, generate_search_set, run_search_set, sample_size, SearchRun,
    SearchSet,
};
pub use ingest::{index_directory, json_files, IngestReport};
pub use timing_log::{TimingLog, TimingRecord, CSV_HEADER, DEFAULT_CSV_FILENAME};
pub use tokenize::tokenize;
