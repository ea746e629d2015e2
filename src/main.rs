// depscope CLI - dependency analysis for a selected set of cataloged files
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

// Macro for conditional printing based on quiet flag
macro_rules! qprintln {
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

use depscope::path_utils::normalize_path_relative;
use depscope::{
    init_logging_with_level, AnalysisResult, AnalyzerConfig, CompletionOutcome,
    DependencyAnalyzer, FileCatalog, FileId,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "depscope - Import dependency analysis for selected project files",
    long_about = None,
    after_help = "EXAMPLES:
  # Analyze two files from a catalog and print a summary
  depscope analyze --catalog catalog.json --select src_app_js --select src_api_js

  # Select by relative path and write the full result as JSON
  depscope analyze --catalog catalog.json --select-path src/app.js -f json -o result.json

  # Render the selection as a Graphviz graph
  depscope analyze --catalog catalog.json --select-path src/app.js -f dot | dot -Tsvg > deps.svg

  # Pull every confidently suggested file into the selection
  depscope complete --catalog catalog.json --select-path src/app.js --min-confidence 0.8"
)]
struct Cli {
    /// Enable verbose logging (DEBUG level). Default is WARN level.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and suppress progress messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Analyzer configuration file (TOML)
    #[arg(short, long, global = true, env = "DEPSCOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Catalog JSON document (`root_dir` + `all_files`)
    #[arg(long)]
    catalog: PathBuf,

    /// Read sources from this directory instead of the catalog's root_dir
    #[arg(long)]
    root: Option<PathBuf>,

    /// File id to include (repeatable)
    #[arg(long = "select", value_name = "FILE_ID")]
    select: Vec<String>,

    /// Project-relative path to include (repeatable)
    #[arg(long = "select-path", value_name = "REL_PATH")]
    select_path: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the dependencies of a selection
    Analyze {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Grow a selection with suggested files until it is self-contained
    Complete {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Minimum suggestion confidence to accept
        #[arg(long, default_value_t = 0.8)]
        min_confidence: f64,
        /// Maximum number of re-analysis rounds
        #[arg(long, default_value_t = 5)]
        max_rounds: usize,
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ignore error if already initialized
    let _ = init_logging_with_level(cli.verbose, cli.quiet);
    let quiet = cli.quiet;

    let config = AnalyzerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            selection,
            format,
            output,
        } => {
            let (analyzer, selected) = prepare(&selection, config)?;
            let result = analyzer.analyze(&selected);

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&result)?,
                OutputFormat::Summary => render_summary(&result),
                OutputFormat::Dot => result.graph.to_dot(),
            };
            emit(&rendered, output.as_deref(), quiet)?;
        }
        Commands::Complete {
            selection,
            min_confidence,
            max_rounds,
            format,
            output,
        } => {
            if !(0.0..=1.0).contains(&min_confidence) {
                bail!("--min-confidence must be between 0 and 1, got {}", min_confidence);
            }
            let (analyzer, selected) = prepare(&selection, config)?;
            let outcome = analyzer.complete_selection(&selected, min_confidence, max_rounds);

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
                OutputFormat::Summary => render_completion(&outcome),
                OutputFormat::Dot => outcome.result.graph.to_dot(),
            };
            emit(&rendered, output.as_deref(), quiet)?;
        }
    }

    Ok(())
}

/// Load the catalog and turn ids and paths into one ordered selection
fn prepare(args: &SelectionArgs, config: AnalyzerConfig) -> Result<(DependencyAnalyzer, Vec<FileId>)> {
    let mut catalog = FileCatalog::from_json_file(&args.catalog)?;
    if let Some(root) = &args.root {
        catalog = catalog.rebase(root);
    }

    let mut selected: Vec<FileId> = args.select.clone();
    for path in &args.select_path {
        let relative = normalize_path_relative(Path::new(path), catalog.root());
        match catalog.id_for_path(&relative) {
            Some(id) => selected.push(id.clone()),
            None => bail!("No cataloged file at path: {}", path),
        }
    }

    if selected.is_empty() {
        bail!("No files selected; pass --select <FILE_ID> or --select-path <REL_PATH>");
    }

    Ok((DependencyAnalyzer::new(catalog, config), selected))
}

fn emit(rendered: &str, output: Option<&Path>, quiet: bool) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            qprintln!(quiet, "Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn render_summary(result: &AnalysisResult) -> String {
    let metrics = &result.metrics;
    let mut out = String::new();

    out.push_str(&format!(
        "Analyzed {} files ({} skipped) in {} ms\n",
        metrics.total_files, result.stats.files_skipped, result.stats.duration_ms
    ));
    out.push_str(&format!(
        "  entry points: {}  leaves: {}  avg deps: {:.2}  max deps: {}  coupling: {:.2}%\n",
        metrics.entry_points,
        metrics.leaf_nodes,
        metrics.average_dependencies,
        metrics.max_dependencies,
        metrics.coupling_score
    ));
    if let Some(most) = &metrics.most_dependent_file {
        out.push_str(&format!(
            "  most depended on: {} ({} dependents)\n",
            most.file_path, most.dependent_count
        ));
    }
    out.push_str(&format!("  completeness: {:.2}%\n", result.completeness_score));

    if !result.missing_dependencies.is_empty() {
        out.push_str(&format!(
            "\nMissing dependencies ({}):\n",
            result.missing_dependencies.len()
        ));
        for missing in &result.missing_dependencies {
            let suggestion = match &missing.suggested_file {
                Some(id) => format!("{} ({:.1})", id, missing.confidence),
                None => "none".to_string(),
            };
            out.push_str(&format!(
                "  {} -> {}  suggest: {}  [{}]\n",
                missing.required_by_path, missing.missing_import, suggestion, missing.reason
            ));
        }
    }

    if !result.circular_dependencies.is_empty() {
        out.push_str(&format!(
            "\nCircular dependencies ({}):\n",
            result.circular_dependencies.len()
        ));
        for cycle in &result.circular_dependencies {
            let paths: Vec<&str> = cycle
                .iter()
                .map(|id| {
                    result
                        .nodes
                        .get(id)
                        .map(|node| node.file_path.as_str())
                        .unwrap_or(id.as_str())
                })
                .collect();
            let start = paths.first().copied().unwrap_or_default();
            out.push_str(&format!("  {} -> {}\n", paths.join(" -> "), start));
        }
    }

    if !result.issues.is_empty() {
        out.push_str(&format!("\nIssues ({}):\n", result.issues.len()));
        for issue in &result.issues {
            match &issue.path {
                Some(path) => out.push_str(&format!("  {}: {}\n", path, issue.message)),
                None => out.push_str(&format!("  {}\n", issue.message)),
            }
        }
    }

    out
}

fn render_completion(outcome: &CompletionOutcome) -> String {
    let mut out = format!(
        "Added {} files in {} rounds\n",
        outcome.added.len(),
        outcome.rounds
    );
    for id in &outcome.added {
        out.push_str(&format!("  + {}\n", id));
    }
    out.push('\n');
    out.push_str(&render_summary(&outcome.result));
    out
}
