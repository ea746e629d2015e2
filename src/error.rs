//! Error types for dependency analysis
//!
//! None of these abort an analysis run. Each failure is converted into an
//! [`AnalysisIssue`] and the run continues with partial data.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failures raised while analyzing a selection
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File too large: {path:?} has {size} bytes, exceeds limit {max_size}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    #[error("Tree-sitter setup failed for {language}: {message}")]
    ParserSetup { language: String, message: String },

    #[error("Cycle enumeration stopped after {limit} cycles")]
    CycleLimitExceeded { limit: usize },

    #[error("Extraction worker pool unavailable: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Stage of the analysis in which an issue was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStage {
    Read,
    Extract,
    Cycles,
}

/// A recovered failure, reported alongside the analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    /// File the issue belongs to, if any
    pub file_id: Option<String>,
    /// Relative path of that file
    pub path: Option<String>,
    pub stage: IssueStage,
    pub message: String,
}

impl AnalysisIssue {
    /// Issue tied to one file
    pub fn for_file(
        file_id: impl Into<String>,
        path: impl Into<String>,
        stage: IssueStage,
        error: &AnalysisError,
    ) -> Self {
        Self {
            file_id: Some(file_id.into()),
            path: Some(path.into()),
            stage,
            message: error.to_string(),
        }
    }

    /// Issue for a whole-graph computation
    pub fn global(stage: IssueStage, error: &AnalysisError) -> Self {
        Self {
            file_id: None,
            path: None,
            stage,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_carries_error_message() {
        let error = AnalysisError::FileTooLarge {
            path: PathBuf::from("/repo/big.js"),
            size: 20,
            max_size: 10,
        };
        let issue = AnalysisIssue::for_file("big_js", "big.js", IssueStage::Read, &error);

        assert_eq!(issue.file_id.as_deref(), Some("big_js"));
        assert!(issue.message.contains("exceeds limit 10"));
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let names: Vec<String> = [IssueStage::Read, IssueStage::Extract, IssueStage::Cycles]
            .iter()
            .map(|stage| serde_json::to_string(stage).unwrap())
            .collect();
        assert_eq!(names, vec!["\"read\"", "\"extract\"", "\"cycles\""]);
    }
}
