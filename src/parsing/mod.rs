//! Language-aware import/export extraction
//!
//! Python sources are walked with tree-sitter when the `tree-sitter-parsing`
//! feature is enabled; everything else goes through line patterns. Both paths
//! produce the same [`ExtractedSymbols`] shape.

pub mod patterns;

#[cfg(feature = "tree-sitter-parsing")]
mod tree_sitter;

#[cfg(feature = "tree-sitter-parsing")]
pub use self::tree_sitter::PythonStructureParser;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Language families the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageFamily {
    Python,
    /// JavaScript and TypeScript, including JSX/TSX and module variants
    JavaScript,
}

impl LanguageFamily {
    /// Detect the family from an extension, with or without the leading dot
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "py" | "pyi" => Some(LanguageFamily::Python),
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" | "mts" | "cts" => {
                Some(LanguageFamily::JavaScript)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LanguageFamily::Python => "Python",
            LanguageFamily::JavaScript => "JavaScript/TypeScript",
        }
    }

    /// Extensions tried, in order, when resolving an extension-less import
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            LanguageFamily::Python => &[".py"],
            LanguageFamily::JavaScript => &[".js", ".jsx", ".ts", ".tsx"],
        }
    }

    /// File stems that make a directory importable, in order
    pub fn index_stems(&self) -> &'static [&'static str] {
        match self {
            LanguageFamily::Python => &["index", "__init__"],
            LanguageFamily::JavaScript => &["index"],
        }
    }
}

/// How a file's imports and exports were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Syntax tree walk
    Structural,
    /// Line patterns after the syntax tree was rejected
    PatternFallback,
    /// Line patterns only
    Pattern,
    /// No extractor for this file type
    None,
}

/// Raw imports and top-level exports of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSymbols {
    pub imports: BTreeSet<String>,
    pub exports: BTreeSet<String>,
    pub method: ExtractionMethod,
}

impl ExtractedSymbols {
    pub fn empty(method: ExtractionMethod) -> Self {
        Self {
            imports: BTreeSet::new(),
            exports: BTreeSet::new(),
            method,
        }
    }
}
