//! Per-file import/export extraction
//!
//! Reads one cataloged file and hands its contents to the extractor for its
//! language family. Failures stay local to the file: the caller gets empty
//! sets plus the error to record.

use std::path::Path;
use tracing::{debug, warn};

use crate::catalog::{FileId, FileRecord};
use crate::error::AnalysisError;
use crate::parsing::{patterns, ExtractedSymbols, ExtractionMethod, LanguageFamily};

#[cfg(feature = "tree-sitter-parsing")]
use crate::parsing::PythonStructureParser;

/// Extraction outcome for one file
#[derive(Debug)]
pub struct FileExtraction {
    pub file_id: FileId,
    pub symbols: ExtractedSymbols,
    pub error: Option<AnalysisError>,
}

/// Language-aware extractor shared by all extraction workers
pub struct DependencyExtractor {
    max_file_size: u64,
    #[cfg(feature = "tree-sitter-parsing")]
    python: Option<PythonStructureParser>,
}

impl DependencyExtractor {
    /// Create an extractor; Python degrades to patterns if tree-sitter is unavailable
    pub fn new(max_file_size: u64) -> Self {
        #[cfg(feature = "tree-sitter-parsing")]
        let python = match PythonStructureParser::new() {
            Ok(parser) => Some(parser),
            Err(e) => {
                warn!("Python structural parsing disabled: {}", e);
                None
            }
        };

        Self {
            max_file_size,
            #[cfg(feature = "tree-sitter-parsing")]
            python,
        }
    }

    /// Extract from in-memory contents
    pub fn extract_content(&self, content: &str, extension: &str) -> ExtractedSymbols {
        match LanguageFamily::from_extension(extension) {
            Some(LanguageFamily::Python) => self.extract_python(content),
            Some(LanguageFamily::JavaScript) => patterns::extract_javascript(content),
            None => ExtractedSymbols::empty(ExtractionMethod::None),
        }
    }

    #[cfg(feature = "tree-sitter-parsing")]
    fn extract_python(&self, content: &str) -> ExtractedSymbols {
        match &self.python {
            Some(parser) => parser.extract(content),
            None => patterns::extract_python(content, ExtractionMethod::Pattern),
        }
    }

    #[cfg(not(feature = "tree-sitter-parsing"))]
    fn extract_python(&self, content: &str) -> ExtractedSymbols {
        patterns::extract_python(content, ExtractionMethod::Pattern)
    }

    /// Read a cataloged file from `source_path` and extract it
    pub fn extract_file(&self, record: &FileRecord, source_path: &Path) -> FileExtraction {
        let family = LanguageFamily::from_extension(&record.extension);
        if family.is_none() {
            debug!(
                "No extractor for {} ({}), keeping it as a graph node only",
                record.relative_path, record.extension
            );
            return FileExtraction {
                file_id: record.id.clone(),
                symbols: ExtractedSymbols::empty(ExtractionMethod::None),
                error: None,
            };
        }

        match self.read_source(source_path) {
            Ok(content) => FileExtraction {
                file_id: record.id.clone(),
                symbols: self.extract_content(&content, &record.extension),
                error: None,
            },
            Err(error) => {
                warn!("Skipping {}: {}", record.relative_path, error);
                FileExtraction {
                    file_id: record.id.clone(),
                    symbols: ExtractedSymbols::empty(ExtractionMethod::None),
                    error: Some(error),
                }
            }
        }
    }

    fn read_source(&self, source_path: &Path) -> Result<String, AnalysisError> {
        let metadata = std::fs::metadata(source_path).map_err(|source| AnalysisError::FileRead {
            path: source_path.to_path_buf(),
            source,
        })?;

        if metadata.len() > self.max_file_size {
            return Err(AnalysisError::FileTooLarge {
                path: source_path.to_path_buf(),
                size: metadata.len(),
                max_size: self.max_file_size,
            });
        }

        let bytes = std::fs::read(source_path).map_err(|source| AnalysisError::FileRead {
            path: source_path.to_path_buf(),
            source,
        })?;

        // Mixed encodings are decoded lossily rather than rejected
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileRecord;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_extract_file_reads_and_dispatches() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(
            dir.path().join("main.js"),
            "import { a } from './a';\nexport function run() {}\n",
        )?;
        let record = FileRecord::from_relative_path(dir.path(), "main.js", 0);

        let extractor = DependencyExtractor::new(1024);
        let extraction = extractor.extract_file(&record, &record.path);

        assert!(extraction.error.is_none());
        assert!(extraction.symbols.imports.contains("./a"));
        assert!(extraction.symbols.exports.contains("run"));
        Ok(())
    }

    #[test]
    fn test_missing_file_yields_empty_sets_and_error() {
        let record = FileRecord::from_relative_path(Path::new("/nonexistent-root"), "gone.py", 0);
        let extractor = DependencyExtractor::new(1024);
        let extraction = extractor.extract_file(&record, &record.path);

        assert!(extraction.symbols.imports.is_empty());
        assert!(matches!(
            extraction.error,
            Some(AnalysisError::FileRead { .. })
        ));
    }

    #[test]
    fn test_oversized_file_is_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("big.py"), "import os\n".repeat(100))?;
        let record = FileRecord::from_relative_path(dir.path(), "big.py", 0);

        let extractor = DependencyExtractor::new(10);
        let extraction = extractor.extract_file(&record, &record.path);

        assert!(extraction.symbols.imports.is_empty());
        assert!(matches!(
            extraction.error,
            Some(AnalysisError::FileTooLarge { max_size: 10, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_non_utf8_bytes_are_tolerated() -> Result<()> {
        let dir = TempDir::new()?;
        let mut bytes = b"import x from './x';\n// ".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        std::fs::write(dir.path().join("latin.js"), bytes)?;
        let record = FileRecord::from_relative_path(dir.path(), "latin.js", 0);

        let extraction = DependencyExtractor::new(1024).extract_file(&record, &record.path);
        assert!(extraction.error.is_none());
        assert!(extraction.symbols.imports.contains("./x"));
        Ok(())
    }

    #[test]
    fn test_unknown_extension_is_not_read() {
        let record = FileRecord::from_relative_path(Path::new("/nonexistent-root"), "README.md", 0);
        let extraction = DependencyExtractor::new(1024).extract_file(&record, &record.path);

        assert!(extraction.error.is_none());
        assert_eq!(extraction.symbols.method, ExtractionMethod::None);
    }
}
