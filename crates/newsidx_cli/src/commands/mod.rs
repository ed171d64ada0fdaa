//! CLI command implementations.

pub mod build;
pub mod experiment;
pub mod inspect;
pub mod search;
