//! Benchmarks for end-to-end analysis and cycle enumeration.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use depscope::dependency_graph::DependencyGraph;
use depscope::{AnalyzerConfig, DependencyAnalyzer, FileCatalog, FileId, FileRecord};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Layered project: each module imports the two modules of the next layer
fn generate_project(files: usize) -> (TempDir, FileCatalog, Vec<FileId>) {
    let dir = TempDir::new().unwrap();
    let mut catalog = FileCatalog::new(dir.path());
    let mut selection = Vec::with_capacity(files);

    for i in 0..files {
        let (python, rel) = if i % 3 == 0 {
            (true, format!("pkg/mod{}.py", i))
        } else {
            (false, format!("pkg/mod{}.ts", i))
        };

        let mut source = String::new();
        for target in [i + 1, i + 2].into_iter().filter(|t| *t < files) {
            if python {
                source.push_str(&format!("from .mod{} import value{}\n", target, target));
            } else {
                source.push_str(&format!("import {{ value{} }} from './mod{}';\n", target, target));
            }
        }
        if python {
            source.push_str(&format!("\ndef value{}():\n    return {}\n", i, i));
        } else {
            source.push_str(&format!("export const value{} = {};\n", i, i));
        }

        let path = dir.path().join(&rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, &source).unwrap();
        let record = FileRecord::from_relative_path(dir.path(), &rel, source.len() as u64);
        selection.push(record.id.clone());
        catalog.insert(record);
    }

    (dir, catalog, selection)
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.measurement_time(Duration::from_secs(10));

    for files in [50, 200] {
        let (_dir, catalog, selection) = generate_project(files);

        for parallel in [false, true] {
            let mut config = AnalyzerConfig::default();
            config.extraction.parallel = parallel;
            let analyzer = DependencyAnalyzer::new(catalog.clone(), config);
            let label = if parallel { "parallel" } else { "sequential" };

            group.bench_with_input(BenchmarkId::new(label, files), &selection, |b, selection| {
                b.iter(|| black_box(analyzer.analyze(selection)))
            });
        }
    }

    group.finish();
}

fn bench_cycle_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("elementary_cycles");

    for nodes in [6usize, 8] {
        let mut graph = DependencyGraph::new();
        let ids: Vec<String> = (0..nodes).map(|i| format!("n{}", i)).collect();
        for id in &ids {
            graph.add_file(id);
        }
        for from in &ids {
            for to in &ids {
                graph.add_dependency(from, to);
            }
        }

        group.bench_with_input(BenchmarkId::new("complete_graph", nodes), &graph, |b, graph| {
            b.iter(|| black_box(graph.elementary_cycles(10_000)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_cycle_enumeration);
criterion_main!(benches);
