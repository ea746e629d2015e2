//! Known-file catalog consumed by the analyzer
//!
//! The catalog is produced by whatever walked the project tree. The analyzer
//! only reads it: ids, relative paths and extensions are taken as given.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::path_utils::{file_name, normalize_path_relative};

/// Identifier of a cataloged file
pub type FileId = String;

/// One cataloged file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub id: FileId,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the project root, forward slashes
    pub relative_path: String,
    /// Extension including the leading dot (".py"), lowercase
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub size: u64,
}

impl FileRecord {
    /// Build a record for a project-relative path, deriving id and extension
    pub fn from_relative_path(root: &Path, relative_path: &str, size: u64) -> Self {
        let relative_path = normalize_path_relative(Path::new(relative_path), root);

        Self {
            id: derive_file_id(&relative_path),
            path: root.join(&relative_path),
            extension: extension_of(&relative_path),
            relative_path,
            size,
        }
    }
}

/// Lowercased extension with its leading dot, empty for dotfiles and bare names
fn extension_of(relative_path: &str) -> String {
    let name = file_name(relative_path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Stable id for a relative path: separators, dots and dashes become `_`
pub fn derive_file_id(relative_path: &str) -> FileId {
    relative_path.replace(['/', '.', '-'], "_")
}

/// Catalog document as persisted by the surrounding application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub root_dir: PathBuf,
    pub all_files: IndexMap<FileId, FileRecord>,
}

/// Insertion-ordered catalog of known files with a relative-path index
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    root: PathBuf,
    files: IndexMap<FileId, FileRecord>,
    by_path: HashMap<String, FileId>,
}

impl FileCatalog {
    /// Create an empty catalog for a project root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: IndexMap::new(),
            by_path: HashMap::new(),
        }
    }

    /// Create a catalog from records, keeping their order
    pub fn from_records(
        root: impl Into<PathBuf>,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Self {
        let mut catalog = Self::new(root);
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Build a catalog from a parsed catalog document
    pub fn from_document(document: CatalogDocument) -> Self {
        let mut catalog = Self::new(document.root_dir);
        for (id, mut record) in document.all_files {
            if record.id.is_empty() {
                record.id = id;
            }
            if record.extension.is_empty() {
                record.extension = extension_of(&record.relative_path);
            }
            catalog.insert(record);
        }
        catalog
    }

    /// Parse a catalog JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: CatalogDocument =
            serde_json::from_str(json).context("Invalid catalog document")?;
        Ok(Self::from_document(document))
    }

    /// Load a catalog JSON document from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))
    }

    /// Add a record
    ///
    /// A record reusing an id replaces the earlier one and drops its path from
    /// the index. A record reusing an indexed path keeps the earlier path entry.
    pub fn insert(&mut self, mut record: FileRecord) {
        record.relative_path = normalize_path_relative(Path::new(&record.relative_path), &self.root);
        if let Some(previous) = self.files.get(&record.id) {
            if previous.relative_path != record.relative_path {
                warn!(
                    id = %record.id,
                    replaced = %previous.relative_path,
                    path = %record.relative_path,
                    "File id collision, keeping the later record"
                );
                if self.by_path.get(&previous.relative_path) == Some(&record.id) {
                    self.by_path.remove(&previous.relative_path);
                }
            }
        }
        self.by_path
            .entry(record.relative_path.clone())
            .or_insert_with(|| record.id.clone());
        self.files.insert(record.id.clone(), record);
    }

    /// Point the catalog at a checkout in another location; relative paths are kept
    pub fn rebase(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        for record in self.files.values_mut() {
            record.path = self.root.join(&record.relative_path);
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.files.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// Id of the file at an exact relative path
    pub fn id_for_path(&self, relative_path: &str) -> Option<&FileId> {
        self.by_path.get(relative_path)
    }

    pub fn contains_path(&self, relative_path: &str) -> bool {
        self.by_path.contains_key(relative_path)
    }

    /// Records in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// On-disk location of a record's contents
    pub fn source_path(&self, record: &FileRecord) -> PathBuf {
        if record.path.is_absolute() {
            record.path.clone()
        } else {
            self.root.join(&record.relative_path)
        }
    }
}
