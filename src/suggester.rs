//! Missing-dependency inference
//!
//! Every import that does not land inside the selection gets exactly one
//! entry, with a suggestion picked from a fixed decision table:
//!
//! | tier              | match                                         | confidence |
//! |-------------------|-----------------------------------------------|------------|
//! | `ExactPath`       | relative path equals a catalog path           | 1.0        |
//! | `ExactFilename`   | file name equal, directory ignored            | 0.8        |
//! | `SimilarFilename` | one file stem contains the other              | 0.5        |
//! | `NotFound`        | nothing                                       | 0.0        |
//!
//! Tiers are tried in order; inside a tier the first candidate in catalog
//! order is kept.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::catalog::{FileCatalog, FileId, FileRecord};
use crate::parsing::LanguageFamily;
use crate::path_utils::{file_name, file_stem, parent_dir};
use crate::resolver::{specifier_path, PathResolver, ResolutionRules};
use crate::types::{DependencyNode, MissingDependency};

/// Confidence tiers for a suggested replacement file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionTier {
    ExactPath,
    ExactFilename,
    SimilarFilename,
    NotFound,
}

impl SuggestionTier {
    pub const fn confidence(self) -> f64 {
        match self {
            SuggestionTier::ExactPath => 1.0,
            SuggestionTier::ExactFilename => 0.8,
            SuggestionTier::SimilarFilename => 0.5,
            SuggestionTier::NotFound => 0.0,
        }
    }

    fn reason(self, candidate_path: &str) -> String {
        match self {
            SuggestionTier::ExactPath => "Exact path match found".to_string(),
            SuggestionTier::ExactFilename => format!("Filename matches: {}", candidate_path),
            SuggestionTier::SimilarFilename => format!("Similar filename: {}", candidate_path),
            SuggestionTier::NotFound => "File not found".to_string(),
        }
    }
}

/// The single best candidate for one missing path
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub file_id: Option<FileId>,
    pub tier: SuggestionTier,
    pub reason: String,
}

impl Suggestion {
    fn not_found() -> Self {
        Self {
            file_id: None,
            tier: SuggestionTier::NotFound,
            reason: SuggestionTier::NotFound.reason(""),
        }
    }

    fn from_record(tier: SuggestionTier, record: &FileRecord) -> Self {
        Self {
            file_id: Some(record.id.clone()),
            tier,
            reason: tier.reason(&record.relative_path),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.tier.confidence()
    }
}

pub struct MissingDependencySuggester<'c> {
    catalog: &'c FileCatalog,
    resolver: PathResolver<'c>,
    include_non_relative: bool,
}

impl<'c> MissingDependencySuggester<'c> {
    pub fn new(catalog: &'c FileCatalog, include_non_relative: bool) -> Self {
        Self {
            catalog,
            resolver: PathResolver::new(catalog),
            include_non_relative,
        }
    }

    /// Imports of `nodes` that are not satisfied by the nodes themselves
    pub fn find_missing(&self, nodes: &IndexMap<FileId, DependencyNode>) -> Vec<MissingDependency> {
        let selected_paths: HashSet<&str> =
            nodes.values().map(|node| node.file_path.as_str()).collect();
        let mut missing = Vec::new();

        for node in nodes.values() {
            let rules = ResolutionRules::for_extension(&node.file_type);
            let importing_dir = parent_dir(&node.file_path);

            for specifier in &node.imports {
                let missing_path = match self.resolver.resolve(specifier, importing_dir, rules) {
                    Some(resolved) if selected_paths.contains(resolved.as_str()) => continue,
                    Some(resolved) => resolved,
                    None if !self.include_non_relative && !is_relative_specifier(specifier, rules.family) => {
                        continue
                    }
                    None => specifier_path(specifier, importing_dir, rules.family),
                };

                let suggestion = self.suggest(&missing_path, &node.file_id);
                missing.push(MissingDependency {
                    required_by: node.file_id.clone(),
                    required_by_path: node.file_path.clone(),
                    missing_import: specifier.clone(),
                    confidence: suggestion.confidence(),
                    suggested_file: suggestion.file_id,
                    reason: suggestion.reason,
                });
            }
        }

        missing
    }

    /// Best catalog candidate for `missing_path`, never suggesting `requiring_id` by name
    pub fn suggest(&self, missing_path: &str, requiring_id: &str) -> Suggestion {
        if let Some(record) = self
            .catalog
            .id_for_path(missing_path)
            .and_then(|id| self.catalog.get(id))
        {
            return Suggestion::from_record(SuggestionTier::ExactPath, record);
        }

        let missing_name = file_name(missing_path);
        if missing_name.is_empty() {
            return Suggestion::not_found();
        }
        let missing_stem = file_stem(missing_name);
        let has_extension = missing_stem != missing_name;

        let candidates = || self.catalog.iter().filter(|r| r.id != requiring_id);

        if let Some(record) = candidates().find(|r| {
            let name = file_name(&r.relative_path);
            name == missing_name || (!has_extension && file_stem(name) == missing_name)
        }) {
            return Suggestion::from_record(SuggestionTier::ExactFilename, record);
        }

        if let Some(record) = candidates().find(|r| {
            let stem = file_stem(file_name(&r.relative_path));
            !stem.is_empty()
                && !missing_stem.is_empty()
                && (stem.contains(missing_stem) || missing_stem.contains(stem))
        }) {
            return Suggestion::from_record(SuggestionTier::SimilarFilename, record);
        }

        Suggestion::not_found()
    }
}

/// Whether a specifier names a module the resolver could ever find
pub fn is_relative_specifier(specifier: &str, family: Option<LanguageFamily>) -> bool {
    match family {
        Some(LanguageFamily::Python) => specifier.starts_with('.'),
        _ => {
            specifier.starts_with("./")
                || specifier.starts_with("../")
                || specifier == "."
                || specifier == ".."
        }
    }
}
