//! Tree-sitter walk for Python imports and top-level definitions

use parking_lot::Mutex;
use std::collections::BTreeSet;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use super::{patterns, ExtractedSymbols, ExtractionMethod};
use crate::error::{AnalysisError, Result};

/// Upper bound on idle parsers kept for reuse
const MAX_POOLED_PARSERS: usize = 16;

/// Structural Python extractor with a parser pool shared across worker threads
pub struct PythonStructureParser {
    language: Language,
    parser_pool: Mutex<Vec<Parser>>,
}

impl PythonStructureParser {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        // Fail early if the grammar and runtime are ABI-incompatible
        let mut probe = Parser::new();
        probe
            .set_language(&language)
            .map_err(|e| AnalysisError::ParserSetup {
                language: "Python".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            language,
            parser_pool: Mutex::new(vec![probe]),
        })
    }

    fn acquire_parser(&self) -> Result<Parser> {
        if let Some(parser) = self.parser_pool.lock().pop() {
            return Ok(parser);
        }

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AnalysisError::ParserSetup {
                language: "Python".to_string(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }

    fn release_parser(&self, mut parser: Parser) {
        parser.reset();
        let mut pool = self.parser_pool.lock();
        if pool.len() < MAX_POOLED_PARSERS {
            pool.push(parser);
        }
    }

    /// Extract imports and top-level definitions, falling back to patterns on syntax errors
    pub fn extract(&self, content: &str) -> ExtractedSymbols {
        let mut parser = match self.acquire_parser() {
            Ok(parser) => parser,
            Err(e) => {
                debug!("No Python parser available, using patterns: {}", e);
                return patterns::extract_python(content, ExtractionMethod::PatternFallback);
            }
        };

        let tree = parser.parse(content, None);
        self.release_parser(parser);

        let tree = match tree {
            Some(tree) => tree,
            None => {
                return patterns::extract_python(content, ExtractionMethod::PatternFallback);
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            debug!("Python source has syntax errors, falling back to patterns");
            return patterns::extract_python(content, ExtractionMethod::PatternFallback);
        }

        let source = content.as_bytes();
        let mut imports = BTreeSet::new();
        collect_imports(root, source, &mut imports);

        ExtractedSymbols {
            imports,
            exports: top_level_definitions(root, source),
            method: ExtractionMethod::Structural,
        }
    }
}

fn node_text(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source)
        .ok()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Module names from `import a.b as c` and `from X import Y` anywhere in the tree
fn collect_imports(node: Node, source: &[u8], imports: &mut BTreeSet<String>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                let module = match child.kind() {
                    "dotted_name" => Some(child),
                    "aliased_import" => child.child_by_field_name("name"),
                    _ => None,
                };
                if let Some(text) = module.and_then(|m| node_text(m, source)) {
                    if patterns::is_project_module(&text) {
                        imports.insert(text);
                    }
                }
            }
        }
        "import_from_statement" => {
            if let Some(text) = node
                .child_by_field_name("module_name")
                .and_then(|m| node_text(m, source))
                .filter(|text| patterns::is_project_module(text))
            {
                imports.insert(text);
            }
        }
        "future_import_statement" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_imports(child, source, imports);
            }
        }
    }
}

/// Names of module-level functions and classes, decorated or not
fn top_level_definitions(root: Node, source: &[u8]) -> BTreeSet<String> {
    let mut exports = BTreeSet::new();
    let mut cursor = root.walk();

    for child in root.named_children(&mut cursor) {
        let definition = match child.kind() {
            "function_definition" | "class_definition" => Some(child),
            "decorated_definition" => child.child_by_field_name("definition"),
            _ => None,
        };

        if let Some(name) = definition
            .and_then(|d| d.child_by_field_name("name"))
            .and_then(|n| node_text(n, source))
        {
            exports.insert(name);
        }
    }

    exports
}
