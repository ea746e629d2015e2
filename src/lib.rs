// depscope - Import dependency analysis for a selected set of project files
// Root library module

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod dependency_extractor;
pub mod dependency_graph;
pub mod error;
pub mod metrics;
pub mod observability;
pub mod parsing;
pub mod path_utils;
pub mod resolver;
pub mod suggester;
pub mod types;

// Re-export the analysis entry points
pub use analyzer::{CompletionOutcome, DependencyAnalyzer};
pub use catalog::{CatalogDocument, FileCatalog, FileId, FileRecord};
pub use config::AnalyzerConfig;

// Re-export result types
pub use types::{
    AnalysisResult, DependencyNode, GraphEdge, GraphNode, GraphView, Metrics,
    MissingDependency, MostDependentFile, RunStats,
};

pub use error::{AnalysisError, AnalysisIssue, IssueStage};
pub use observability::{init_logging, init_logging_with_level, PerfTimer};
pub use parsing::{ExtractionMethod, LanguageFamily};
pub use suggester::SuggestionTier;
