// Property-based tests for graph invariants
// Random selections over random import graphs, written to a temporary project and analyzed

use anyhow::Result;
use depscope::dependency_graph::DependencyGraph;
use depscope::metrics::completeness_score;
use depscope::{AnalysisResult, AnalyzerConfig, DependencyAnalyzer, FileCatalog, FileId, FileRecord};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

mod strategies {
    use super::*;

    /// Up to `n` files, each importing a subset of the others (self-imports included)
    pub fn import_graph(max_files: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1..=max_files).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(0..n, 0..=n), n)
        })
    }

    /// Import graph plus which files are selected
    pub fn selected_graph(max_files: usize) -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<bool>)> {
        import_graph(max_files).prop_flat_map(|imports| {
            let n = imports.len();
            (Just(imports), prop::collection::vec(any::<bool>(), n))
        })
    }
}

fn analyze_generated(imports: &[Vec<usize>], selected: &[bool]) -> Result<AnalysisResult> {
    let dir = TempDir::new()?;
    let mut catalog = FileCatalog::new(dir.path());

    for (i, targets) in imports.iter().enumerate() {
        let mut source = String::new();
        for target in targets {
            source.push_str(&format!("import {{ f{} }} from './f{}';\n", target, target));
        }
        source.push_str(&format!("export const f{} = {};\n", i, i));

        let rel = format!("f{}.js", i);
        fs::write(dir.path().join(&rel), &source)?;
        catalog.insert(FileRecord::from_relative_path(dir.path(), &rel, source.len() as u64));
    }

    let selection: Vec<FileId> = selected
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(i, _)| format!("f{}_js", i))
        .collect();

    Ok(DependencyAnalyzer::new(catalog, AnalyzerConfig::default()).analyze(&selection))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_edges_are_symmetric_sets_without_self_loops(
        (imports, selected) in strategies::selected_graph(8)
    ) {
        let result = analyze_generated(&imports, &selected).unwrap();

        for (id, node) in &result.nodes {
            prop_assert!(!node.dependencies.contains(id));
            for dep in &node.dependencies {
                prop_assert!(result.nodes.contains_key(dep));
                prop_assert!(result.nodes[dep].dependents.contains(id));
            }
            for dependent in &node.dependents {
                prop_assert!(result.nodes[dependent].dependencies.contains(id));
            }
        }

        let edge_count: usize = result.nodes.values().map(|n| n.dependencies.len()).sum();
        prop_assert_eq!(result.graph.edges.len(), edge_count);
    }

    #[test]
    fn prop_flags_match_edge_emptiness((imports, selected) in strategies::selected_graph(8)) {
        let result = analyze_generated(&imports, &selected).unwrap();

        for node in result.nodes.values() {
            prop_assert_eq!(node.is_entry_point, node.dependents.is_empty());
            prop_assert_eq!(node.is_leaf, node.dependencies.is_empty());
        }
    }

    #[test]
    fn prop_scores_stay_in_range((imports, selected) in strategies::selected_graph(8)) {
        let result = analyze_generated(&imports, &selected).unwrap();
        let n = result.nodes.len();

        if n <= 1 {
            prop_assert_eq!(result.metrics.coupling_score, 0.0);
        } else {
            prop_assert!((0.0..=100.0).contains(&result.metrics.coupling_score));
        }

        if n == 0 {
            prop_assert_eq!(result.completeness_score, 0.0);
        } else if result.missing_dependencies.is_empty() {
            prop_assert_eq!(result.completeness_score, 100.0);
        } else {
            prop_assert!(result.completeness_score < 100.0);
        }
    }

    #[test]
    fn prop_unselected_imports_become_exact_suggestions(
        (imports, selected) in strategies::selected_graph(8)
    ) {
        let result = analyze_generated(&imports, &selected).unwrap();

        for missing in &result.missing_dependencies {
            // every generated import names a cataloged file
            prop_assert_eq!(missing.confidence, 1.0);
            let suggested = missing.suggested_file.as_ref().unwrap();
            prop_assert!(!result.nodes.contains_key(suggested));
            prop_assert!(!result.nodes[&missing.required_by].dependencies.contains(suggested));
        }

        let expected: usize = result
            .nodes
            .keys()
            .map(|id| {
                let i: usize = id.trim_start_matches('f').trim_end_matches("_js").parse().unwrap();
                imports[i]
                    .iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .filter(|target| !selected[**target])
                    .count()
            })
            .sum();
        prop_assert_eq!(result.missing_dependencies.len(), expected);
    }

    #[test]
    fn prop_cycles_are_closed_walks(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..20)
    ) {
        let mut graph = DependencyGraph::new();
        for i in 0..6 {
            graph.add_file(&format!("n{}", i));
        }
        for (from, to) in &edges {
            graph.add_dependency(&format!("n{}", from), &format!("n{}", to));
        }

        let search = graph.elementary_cycles(10_000);
        prop_assert!(!search.truncated);

        let mut seen = BTreeSet::new();
        for cycle in &search.cycles {
            prop_assert!(cycle.len() >= 2);
            let distinct: BTreeSet<_> = cycle.iter().collect();
            prop_assert_eq!(distinct.len(), cycle.len());
            for pair in 0..cycle.len() {
                let next = &cycle[(pair + 1) % cycle.len()];
                prop_assert!(graph.has_dependency(&cycle[pair], next));
            }

            // rotate to the smallest member so rotations compare equal
            let start = cycle
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            let mut canonical = cycle[start..].to_vec();
            canonical.extend_from_slice(&cycle[..start]);
            prop_assert!(seen.insert(canonical));
        }
    }

    #[test]
    fn prop_completeness_formula(selected in 0usize..50, missing in 0usize..50) {
        let score = completeness_score(selected, missing);
        if selected == 0 {
            prop_assert_eq!(score, 0.0);
        } else {
            let exact = selected as f64 / (selected + missing) as f64 * 100.0;
            prop_assert!((score - exact).abs() <= 0.005 + f64::EPSILON);
        }
    }
}
