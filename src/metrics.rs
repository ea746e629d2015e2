// Graph metrics and selection completeness

use indexmap::IndexMap;

use crate::catalog::FileId;
use crate::path_utils::file_name;
use crate::types::{DependencyNode, GraphEdge, GraphNode, GraphView, Metrics, MostDependentFile};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate statistics over finalized nodes
pub fn calculate_metrics(nodes: &IndexMap<FileId, DependencyNode>) -> Metrics {
    let total_files = nodes.len();
    if total_files == 0 {
        return Metrics::default();
    }

    let entry_points = nodes.values().filter(|n| n.is_entry_point).count();
    let leaf_nodes = nodes.values().filter(|n| n.is_leaf).count();

    let total_dependencies: usize = nodes.values().map(|n| n.dependencies.len()).sum();
    let max_dependencies = nodes
        .values()
        .map(|n| n.dependencies.len())
        .max()
        .unwrap_or(0);

    // First maximum in selection order
    let most_dependent_file = nodes
        .values()
        .fold(None::<&DependencyNode>, |best, node| match best {
            Some(b) if b.dependents.len() >= node.dependents.len() => Some(b),
            _ => Some(node),
        })
        .map(|node| MostDependentFile {
            file_id: node.file_id.clone(),
            file_path: node.file_path.clone(),
            dependent_count: node.dependents.len(),
        });

    let possible_edges = total_files * (total_files - 1);
    let coupling_score = if possible_edges == 0 {
        0.0
    } else {
        round2(total_dependencies as f64 / possible_edges as f64 * 100.0)
    };

    Metrics {
        total_files,
        entry_points,
        leaf_nodes,
        average_dependencies: round2(total_dependencies as f64 / total_files as f64),
        max_dependencies,
        most_dependent_file,
        coupling_score,
    }
}

/// Percentage of referenced files present in the selection
pub fn completeness_score(selected_count: usize, missing_count: usize) -> f64 {
    if selected_count == 0 {
        return 0.0;
    }
    round2(selected_count as f64 / (selected_count + missing_count) as f64 * 100.0)
}

/// Visualization node and edge lists in selection order
pub fn graph_view(nodes: &IndexMap<FileId, DependencyNode>) -> GraphView {
    let mut view = GraphView::default();

    for node in nodes.values() {
        view.nodes.push(GraphNode {
            id: node.file_id.clone(),
            label: file_name(&node.file_path).to_string(),
            path: node.file_path.clone(),
            file_type: node.file_type.clone(),
            is_entry_point: node.is_entry_point,
            is_leaf: node.is_leaf,
            dependency_count: node.dependencies.len(),
            dependent_count: node.dependents.len(),
        });

        view.edges.extend(node.dependencies.iter().map(|target| GraphEdge {
            source: node.file_id.clone(),
            target: target.clone(),
        }));
    }

    view
}
