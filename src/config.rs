use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB
const DEFAULT_MAX_CYCLES: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub extraction: ExtractionConfig,
    pub missing: MissingConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Files larger than this are skipped and reported (in bytes)
    pub max_file_size: u64,
    /// Extract files on the rayon pool
    pub parallel: bool,
    /// Dedicated pool size; `None` uses the global rayon pool
    pub max_threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MissingConfig {
    /// Report non-relative specifiers that survive extraction as missing
    pub include_non_relative: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Upper bound on enumerated elementary cycles
    pub max_cycles: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            parallel: true,
            max_threads: None,
        }
    }
}

impl Default for MissingConfig {
    fn default() -> Self {
        Self {
            include_non_relative: true,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(size) = std::env::var("DEPSCOPE_MAX_FILE_SIZE") {
            config.extraction.max_file_size = size
                .parse()
                .context("DEPSCOPE_MAX_FILE_SIZE must be a byte count")?;
        }
        if let Ok(parallel) = std::env::var("DEPSCOPE_PARALLEL") {
            config.extraction.parallel = parallel
                .parse()
                .context("DEPSCOPE_PARALLEL must be true or false")?;
        }
        if let Ok(threads) = std::env::var("DEPSCOPE_MAX_THREADS") {
            config.extraction.max_threads = Some(
                threads
                    .parse()
                    .context("DEPSCOPE_MAX_THREADS must be a thread count")?,
            );
        }
        if let Ok(cycles) = std::env::var("DEPSCOPE_MAX_CYCLES") {
            config.graph.max_cycles = cycles
                .parse()
                .context("DEPSCOPE_MAX_CYCLES must be a cycle count")?;
        }

        Ok(config)
    }
}
