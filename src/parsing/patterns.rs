//! Pattern-based import/export extraction
//!
//! Used for the JavaScript/TypeScript family and as the Python fallback when
//! the syntax tree cannot be trusted. Never fails; only package-external
//! specifiers are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::{ExtractedSymbols, ExtractionMethod};

static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)").expect("valid regex"));
static PY_FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import").expect("valid regex"));
static PY_TOP_LEVEL_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:async\s+def|def|class)\s+(\w+)").expect("valid regex")
});

// `[^'";]` spans newlines, so multi-line import clauses are matched
static JS_IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+[^'";]*?\s*from\s*['"]([^'"\n]+)['"]"#).expect("valid regex")
});
static JS_SIDE_EFFECT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).expect("valid regex"));
static JS_REEXPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bexport\s+[^'";]*?\s*from\s*['"]([^'"\n]+)['"]"#).expect("valid regex")
});
static JS_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});
static JS_DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

static JS_EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bexport\s+(?:default\s+)?(?:async\s+)?(?:function\s*\*?|class|const|let|var|interface|type|enum)\s+([\w$]+)",
    )
    .expect("valid regex")
});
static JS_EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bexport\s*(?:type\s*)?\{([^}]*)\}").expect("valid regex"));

/// Extract Python imports and top-level definitions line by line
pub fn extract_python(content: &str, method: ExtractionMethod) -> ExtractedSymbols {
    let mut imports = BTreeSet::new();
    for pattern in [&*PY_IMPORT, &*PY_FROM_IMPORT] {
        for captures in pattern.captures_iter(content) {
            if is_project_module(&captures[1]) {
                imports.insert(captures[1].to_string());
            }
        }
    }

    let exports = PY_TOP_LEVEL_DEF
        .captures_iter(content)
        .map(|captures| captures[1].to_string())
        .collect();

    ExtractedSymbols {
        imports,
        exports,
        method,
    }
}

/// Extract JavaScript/TypeScript imports and exports
pub fn extract_javascript(content: &str) -> ExtractedSymbols {
    let mut imports = BTreeSet::new();
    for pattern in [
        &*JS_IMPORT_FROM,
        &*JS_SIDE_EFFECT_IMPORT,
        &*JS_REEXPORT_FROM,
        &*JS_REQUIRE,
        &*JS_DYNAMIC_IMPORT,
    ] {
        for captures in pattern.captures_iter(content) {
            let specifier = captures[1].trim();
            if is_project_specifier(specifier) {
                imports.insert(specifier.to_string());
            }
        }
    }

    let mut exports: BTreeSet<String> = JS_EXPORT_DECL
        .captures_iter(content)
        .map(|captures| captures[1].to_string())
        .collect();

    for captures in JS_EXPORT_LIST.captures_iter(content) {
        exports.extend(export_list_names(&captures[1]));
    }

    ExtractedSymbols {
        imports,
        exports,
        method: ExtractionMethod::Pattern,
    }
}

/// Relative specifiers are always kept; bare ones only when scoped or path-qualified
pub fn is_project_specifier(specifier: &str) -> bool {
    if specifier.is_empty() {
        return false;
    }
    specifier.starts_with('.') || specifier.starts_with('@') || specifier.contains('/')
}

/// Python counterpart: relative modules and dotted package paths are kept,
/// single-segment names (`os`, `typing`) are left to the interpreter
pub fn is_project_module(module: &str) -> bool {
    !module.is_empty() && (module.starts_with('.') || module.contains('.'))
}

/// Names made visible by an `export { ... }` clause (`a as b` exports `b`)
fn export_list_names(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|item| {
            let item = item.trim();
            let item = item.strip_prefix("type ").unwrap_or(item).trim();
            let name = match item.rsplit_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item,
            };
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
