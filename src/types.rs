// Analysis result types
// Everything the analyzer hands back to its caller. Field names follow the
// JSON payload the surrounding application already persists.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::catalog::FileId;
use crate::dependency_graph::DependencyGraph;
use crate::error::AnalysisIssue;

/// One analyzed file and its edges within the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub file_id: FileId,
    /// Project-relative path
    pub file_path: String,
    /// Extension, e.g. ".py"
    pub file_type: String,
    /// Raw import specifiers as written in source
    pub imports: BTreeSet<String>,
    /// Top-level exported symbol names
    pub exports: BTreeSet<String>,
    /// Selected files this file imports
    pub dependencies: BTreeSet<FileId>,
    /// Selected files importing this file
    pub dependents: BTreeSet<FileId>,
    pub is_entry_point: bool,
    pub is_leaf: bool,
}

impl DependencyNode {
    /// A node with no imports and no edges yet
    pub fn new(
        file_id: impl Into<FileId>,
        file_path: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_path: file_path.into(),
            file_type: file_type.into(),
            imports: BTreeSet::new(),
            exports: BTreeSet::new(),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            is_entry_point: false,
            is_leaf: false,
        }
    }

    /// Derive the entry-point and leaf flags from the final edge sets
    pub(crate) fn finalize(&mut self) {
        self.is_entry_point = self.dependents.is_empty();
        self.is_leaf = self.dependencies.is_empty();
    }
}

/// An import that is not satisfied by the selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingDependency {
    /// Id of the importing file
    pub required_by: FileId,
    /// Relative path of the importing file
    pub required_by_path: String,
    /// Raw specifier as written
    pub missing_import: String,
    pub suggested_file: Option<FileId>,
    /// In [0, 1]
    pub confidence: f64,
    pub reason: String,
}

/// The file most other selected files depend on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostDependentFile {
    pub file_id: FileId,
    pub file_path: String,
    pub dependent_count: usize,
}

/// Aggregate statistics over the finished graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_files: usize,
    pub entry_points: usize,
    pub leaf_nodes: usize,
    pub average_dependencies: f64,
    pub max_dependencies: usize,
    pub most_dependent_file: Option<MostDependentFile>,
    /// Percentage of possible directed edges present
    pub coupling_score: f64,
}

/// Node as drawn in a visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: FileId,
    /// File name without directory
    pub label: String,
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub is_entry_point: bool,
    pub is_leaf: bool,
    pub dependency_count: usize,
    pub dependent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: FileId,
    pub target: FileId,
}

/// Visualization-ready node/edge lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Graphviz DOT document with nodes labeled by relative path
    pub fn to_dot(&self) -> String {
        let mut graph = DependencyGraph::new();
        let mut labels = HashMap::new();
        for node in &self.nodes {
            graph.add_file(&node.id);
            labels.insert(node.id.as_str(), node.path.as_str());
        }
        for edge in &self.edges {
            graph.add_dependency(&edge.source, &edge.target);
        }

        graph.to_dot_with(|id| labels.get(id).copied().unwrap_or(id).to_string())
    }
}

/// Counters for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Ids passed in, before filtering
    pub files_requested: usize,
    pub files_analyzed: usize,
    /// Unknown or duplicate ids
    pub files_skipped: usize,
    pub structural_parses: usize,
    pub pattern_fallbacks: usize,
    pub read_failures: usize,
    pub duration_ms: u64,
}

/// Complete output of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub run_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    /// Nodes in selection order
    pub nodes: IndexMap<FileId, DependencyNode>,
    pub missing_dependencies: Vec<MissingDependency>,
    /// Each cycle is a sequence of file ids; rotation and order are unspecified
    pub circular_dependencies: Vec<Vec<FileId>>,
    pub metrics: Metrics,
    pub graph: GraphView,
    pub completeness_score: f64,
    /// Failures recovered during the run
    pub issues: Vec<AnalysisIssue>,
    pub stats: RunStats,
}

impl AnalysisResult {
    /// Distinct suggested files, in the order first suggested, at or above a confidence
    pub fn suggested_additions(&self, min_confidence: f64) -> Vec<FileId> {
        let mut seen = BTreeSet::new();
        self.missing_dependencies
            .iter()
            .filter(|missing| missing.confidence >= min_confidence)
            .filter_map(|missing| missing.suggested_file.as_ref())
            .filter(|id| !self.nodes.contains_key(*id))
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Cycles as sets of ids, for order-insensitive comparison
    pub fn cycle_sets(&self) -> Vec<BTreeSet<FileId>> {
        self.circular_dependencies
            .iter()
            .map(|cycle| cycle.iter().cloned().collect())
            .collect()
    }
}
