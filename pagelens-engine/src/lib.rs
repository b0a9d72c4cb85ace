pub mod analyze;
pub mod analyzers;
pub mod context;
pub mod document;
pub mod error;
pub mod fetch;
pub mod llms;
pub mod probes;
pub mod tables;
pub mod verdict;

pub use analyze::{analyze, AnalysisReport, AnalyzerConfig};
pub use error::EngineError;
pub use fetch::{FetchResult, Fetcher};
pub use probes::{AncillaryData, Gatherer};
pub use verdict::{Severity, Verdict};
