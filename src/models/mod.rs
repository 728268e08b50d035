//! Data models for AdStream Finder.

mod analysis;

pub use analysis::{AnalysisResult, DEFAULT_DOMAINS};
