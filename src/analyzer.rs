//! Analysis pipeline over one selection
//!
//! Extraction fans out over rayon; everything after it (edge insertion,
//! missing-dependency inference, cycles, metrics) runs on the calling thread
//! in selection order.

use chrono::Utc;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::{FileCatalog, FileId, FileRecord};
use crate::config::AnalyzerConfig;
use crate::dependency_extractor::{DependencyExtractor, FileExtraction};
use crate::dependency_graph::GraphBuilder;
use crate::error::{AnalysisError, AnalysisIssue, IssueStage};
use crate::metrics::{calculate_metrics, completeness_score, graph_view};
use crate::observability::PerfTimer;
use crate::parsing::ExtractionMethod;
use crate::resolver::PathResolver;
use crate::suggester::MissingDependencySuggester;
use crate::types::{AnalysisResult, DependencyNode, RunStats};

/// Result of iteratively pulling suggested files into a selection
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    /// Original selection followed by every added id
    pub selection: Vec<FileId>,
    /// Ids added, in the order they were added
    pub added: Vec<FileId>,
    /// Rounds that added at least one file
    pub rounds: usize,
    /// Analysis of the final selection
    pub result: AnalysisResult,
}

/// Dependency analysis over a fixed file catalog
pub struct DependencyAnalyzer {
    catalog: FileCatalog,
    config: AnalyzerConfig,
    extractor: DependencyExtractor,
}

impl DependencyAnalyzer {
    pub fn new(catalog: FileCatalog, config: AnalyzerConfig) -> Self {
        let extractor = DependencyExtractor::new(config.extraction.max_file_size);
        Self {
            catalog,
            config,
            extractor,
        }
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the selected file ids
    ///
    /// Unknown and repeated ids are skipped. Per-file and cycle-search failures
    /// end up in `issues`; this never fails as a whole.
    #[instrument(skip(self, selected), fields(requested = selected.len()))]
    pub fn analyze(&self, selected: &[FileId]) -> AnalysisResult {
        let run_id = Uuid::new_v4();
        let timer = PerfTimer::new("dependency_analysis", run_id);
        let mut stats = RunStats {
            files_requested: selected.len(),
            ..RunStats::default()
        };
        let mut issues = Vec::new();

        let records = self.selected_records(selected, &mut stats);
        let extractions = self.extract_all(&records, &mut issues);

        let mut nodes: IndexMap<FileId, DependencyNode> = IndexMap::with_capacity(records.len());
        for (record, extraction) in records.iter().zip(extractions) {
            match extraction.symbols.method {
                ExtractionMethod::Structural => stats.structural_parses += 1,
                ExtractionMethod::PatternFallback => stats.pattern_fallbacks += 1,
                ExtractionMethod::Pattern | ExtractionMethod::None => {}
            }
            if let Some(error) = &extraction.error {
                stats.read_failures += 1;
                issues.push(AnalysisIssue::for_file(
                    &record.id,
                    &record.relative_path,
                    IssueStage::Read,
                    error,
                ));
            }

            let mut node = DependencyNode::new(
                record.id.clone(),
                record.relative_path.clone(),
                record.extension.clone(),
            );
            node.imports = extraction.symbols.imports;
            node.exports = extraction.symbols.exports;
            nodes.insert(record.id.clone(), node);
        }

        let graph = GraphBuilder::new(PathResolver::new(&self.catalog)).build(&mut nodes);

        let missing_dependencies =
            MissingDependencySuggester::new(&self.catalog, self.config.missing.include_non_relative)
                .find_missing(&nodes);

        let search = graph.elementary_cycles(self.config.graph.max_cycles);
        if search.truncated {
            let error = AnalysisError::CycleLimitExceeded {
                limit: self.config.graph.max_cycles,
            };
            warn!("{}; reporting the cycles found so far", error);
            issues.push(AnalysisIssue::global(IssueStage::Cycles, &error));
        }

        let metrics = calculate_metrics(&nodes);
        let completeness = completeness_score(nodes.len(), missing_dependencies.len());

        stats.files_analyzed = nodes.len();
        stats.duration_ms = timer.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            files = stats.files_analyzed,
            edges = graph.dependency_count(),
            missing = missing_dependencies.len(),
            cycles = search.cycles.len(),
            completeness,
            "Dependency analysis complete"
        );

        AnalysisResult {
            run_id,
            analyzed_at: Utc::now(),
            graph: graph_view(&nodes),
            nodes,
            missing_dependencies,
            circular_dependencies: search.cycles,
            metrics,
            completeness_score: completeness,
            issues,
            stats,
        }
    }

    /// Re-analyze with suggested files added until nothing new is suggested
    ///
    /// Only suggestions with confidence at or above `min_confidence` are
    /// taken. Stops after `max_rounds` rounds that added files.
    #[instrument(skip(self, selected), fields(initial = selected.len()))]
    pub fn complete_selection(
        &self,
        selected: &[FileId],
        min_confidence: f64,
        max_rounds: usize,
    ) -> CompletionOutcome {
        let mut seen: HashSet<FileId> = HashSet::new();
        let mut selection: Vec<FileId> = selected
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        let mut added = Vec::new();
        let mut rounds = 0;

        let mut result = self.analyze(&selection);
        while rounds < max_rounds {
            let additions: Vec<FileId> = result
                .suggested_additions(min_confidence)
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect();
            if additions.is_empty() {
                break;
            }

            rounds += 1;
            info!(round = rounds, added = additions.len(), "Adding suggested files");
            selection.extend(additions.iter().cloned());
            added.extend(additions);
            result = self.analyze(&selection);
        }

        CompletionOutcome {
            selection,
            added,
            rounds,
            result,
        }
    }

    fn selected_records(&self, selected: &[FileId], stats: &mut RunStats) -> Vec<&FileRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(selected.len());

        for id in selected {
            match self.catalog.get(id) {
                None => {
                    warn!("Unknown file id {}, skipping", id);
                    stats.files_skipped += 1;
                }
                Some(_) if !seen.insert(id.as_str()) => {
                    debug!("Duplicate file id {}, skipping", id);
                    stats.files_skipped += 1;
                }
                Some(record) => records.push(record),
            }
        }

        records
    }

    fn extract_all(
        &self,
        records: &[&FileRecord],
        issues: &mut Vec<AnalysisIssue>,
    ) -> Vec<FileExtraction> {
        if !self.config.extraction.parallel || records.len() < 2 {
            return records
                .iter()
                .map(|record| self.extract_one(record))
                .collect();
        }

        let Some(threads) = self.config.extraction.max_threads else {
            return self.extract_parallel(records);
        };

        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| self.extract_parallel(records)),
            Err(e) => {
                let error = AnalysisError::WorkerPool(e.to_string());
                warn!("{}; using the global rayon pool", error);
                issues.push(AnalysisIssue::global(IssueStage::Extract, &error));
                self.extract_parallel(records)
            }
        }
    }

    fn extract_parallel(&self, records: &[&FileRecord]) -> Vec<FileExtraction> {
        records
            .par_iter()
            .map(|record| self.extract_one(record))
            .collect()
    }

    fn extract_one(&self, record: &FileRecord) -> FileExtraction {
        self.extractor
            .extract_file(record, &self.catalog.source_path(record))
    }
}
