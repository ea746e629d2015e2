//! Relative import resolution against the known-file catalog
//!
//! Resolution order is fixed: the specifier as written, then the specifier
//! with each family extension, then each directory-index file. The first
//! catalog hit wins, so a direct file always beats a same-named directory.

use crate::catalog::FileCatalog;
use crate::parsing::LanguageFamily;
use crate::path_utils::join_normalized;

/// Candidate extensions and index stems for one importing file
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRules<'a> {
    pub family: Option<LanguageFamily>,
    /// Extension of the importing file, used when the family is unknown
    pub own_extension: &'a str,
}

impl<'a> ResolutionRules<'a> {
    pub fn for_extension(extension: &'a str) -> Self {
        Self {
            family: LanguageFamily::from_extension(extension),
            own_extension: extension,
        }
    }

    fn extensions(&self) -> Vec<String> {
        match self.family {
            Some(family) => family.extensions().iter().map(|e| e.to_string()).collect(),
            None if self.own_extension.is_empty() => Vec::new(),
            None if self.own_extension.starts_with('.') => vec![self.own_extension.to_string()],
            None => vec![format!(".{}", self.own_extension)],
        }
    }

    fn index_stems(&self) -> &'static [&'static str] {
        match self.family {
            Some(family) => family.index_stems(),
            None => &["index"],
        }
    }
}

/// Resolves relative specifiers to catalog paths
pub struct PathResolver<'c> {
    catalog: &'c FileCatalog,
}

impl<'c> PathResolver<'c> {
    pub fn new(catalog: &'c FileCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve `specifier` imported from `importing_dir` to a cataloged relative path
    ///
    /// Non-relative specifiers are never resolved.
    pub fn resolve(
        &self,
        specifier: &str,
        importing_dir: &str,
        rules: ResolutionRules<'_>,
    ) -> Option<String> {
        let candidate = candidate_path(specifier, importing_dir, rules.family)?;

        if !candidate.is_empty() && self.catalog.contains_path(&candidate) {
            return Some(candidate);
        }

        let extensions = rules.extensions();

        if !candidate.is_empty() {
            for ext in &extensions {
                let path = format!("{}{}", candidate, ext);
                if self.catalog.contains_path(&path) {
                    return Some(path);
                }
            }
        }

        for stem in rules.index_stems() {
            for ext in &extensions {
                let path = if candidate.is_empty() {
                    format!("{}{}", stem, ext)
                } else {
                    format!("{}/{}{}", candidate, stem, ext)
                };
                if self.catalog.contains_path(&path) {
                    return Some(path);
                }
            }
        }

        None
    }
}

/// Normalized project-relative path a relative specifier points at, before
/// any extension is tried
///
/// `None` for non-relative specifiers and for paths escaping the project root.
pub fn candidate_path(
    specifier: &str,
    importing_dir: &str,
    family: Option<LanguageFamily>,
) -> Option<String> {
    if !specifier.starts_with('.') {
        return None;
    }

    let specifier = match family {
        Some(LanguageFamily::Python) if !specifier.contains('/') => python_relative_to_path(specifier),
        _ => specifier.to_string(),
    };

    join_normalized(importing_dir, &specifier)
}

/// `.mod` → `./mod`, `..pkg.mod` → `../pkg/mod`, `..` → `../`
pub fn python_relative_to_path(specifier: &str) -> String {
    let module = specifier.trim_start_matches('.');
    let depth = specifier.len() - module.len();

    let mut path = String::from("./");
    for _ in 1..depth {
        path.push_str("../");
    }
    path.push_str(&module.replace('.', "/"));
    path
}

/// Path-like form of any specifier, used to name what is missing
///
/// Relative specifiers are joined to the importing directory; bare ones are
/// only converted to slash form (`package.sub` → `package/sub` for Python).
pub fn specifier_path(specifier: &str, importing_dir: &str, family: Option<LanguageFamily>) -> String {
    if let Some(path) = candidate_path(specifier, importing_dir, family) {
        return path;
    }

    match family {
        Some(LanguageFamily::Python) if !specifier.starts_with('.') => specifier.replace('.', "/"),
        _ => specifier.trim_start_matches("./").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileRecord;
    use std::path::Path;

    fn catalog(paths: &[&str]) -> FileCatalog {
        let root = Path::new("/repo");
        FileCatalog::from_records(
            root,
            paths
                .iter()
                .map(|p| FileRecord::from_relative_path(root, p, 0)),
        )
    }

    #[test]
    fn test_resolves_extension_candidates_in_order() {
        let catalog = catalog(&["src/util.ts", "src/util.js", "src/app.js"]);
        let resolver = PathResolver::new(&catalog);

        assert_eq!(
            resolver
                .resolve("./util", "src", ResolutionRules::for_extension(".js"))
                .as_deref(),
            Some("src/util.js")
        );
    }

    #[test]
    fn test_resolves_specifier_with_extension() {
        let catalog = catalog(&["src/data.json", "src/app.js"]);
        let resolver = PathResolver::new(&catalog);

        assert_eq!(
            resolver
                .resolve("./data.json", "src", ResolutionRules::for_extension(".js"))
                .as_deref(),
            Some("src/data.json")
        );
    }

    #[test]
    fn test_direct_file_beats_directory_index() {
        let catalog = catalog(&["lib/index.js", "lib.js", "main.js"]);
        let resolver = PathResolver::new(&catalog);

        assert_eq!(
            resolver
                .resolve("./lib", "", ResolutionRules::for_extension(".js"))
                .as_deref(),
            Some("lib.js")
        );
    }

    #[test]
    fn test_directory_index_fallback() {
        let catalog = catalog(&["src/components/index.tsx", "src/app.tsx"]);
        let resolver = PathResolver::new(&catalog);

        assert_eq!(
            resolver
                .resolve("./components", "src", ResolutionRules::for_extension(".tsx"))
                .as_deref(),
            Some("src/components/index.tsx")
        );
    }

    #[test]
    fn test_parent_directory_and_root_escape() {
        let catalog = catalog(&["lib/x.js", "src/deep/a.js"]);
        let resolver = PathResolver::new(&catalog);
        let rules = ResolutionRules::for_extension(".js");

        assert_eq!(
            resolver.resolve("../../lib/x", "src/deep", rules).as_deref(),
            Some("lib/x.js")
        );
        assert_eq!(resolver.resolve("../../../lib/x", "src/deep", rules), None);
    }

    #[test]
    fn test_non_relative_is_never_resolved() {
        let catalog = catalog(&["react.js", "lodash/fp.js"]);
        let resolver = PathResolver::new(&catalog);
        let rules = ResolutionRules::for_extension(".js");

        assert_eq!(resolver.resolve("react", "", rules), None);
        assert_eq!(resolver.resolve("lodash/fp", "", rules), None);
    }

    #[test]
    fn test_python_dotted_relatives() {
        let catalog = catalog(&[
            "app/models.py",
            "app/services/user.py",
            "app/__init__.py",
            "shared/tools.py",
        ]);
        let resolver = PathResolver::new(&catalog);
        let rules = ResolutionRules::for_extension(".py");

        assert_eq!(
            resolver.resolve(".models", "app/services", rules),
            None
        );
        assert_eq!(
            resolver.resolve("..models", "app/services", rules).as_deref(),
            Some("app/models.py")
        );
        assert_eq!(
            resolver.resolve(".user", "app/services", rules).as_deref(),
            Some("app/services/user.py")
        );
        assert_eq!(
            resolver.resolve("..", "app/services", rules).as_deref(),
            Some("app/__init__.py")
        );
        assert_eq!(
            resolver.resolve("...shared.tools", "app/services", rules).as_deref(),
            Some("shared/tools.py")
        );
    }

    #[test]
    fn test_unknown_family_uses_own_extension() {
        let catalog = catalog(&["pkg/a.ext", "pkg/b.ext"]);
        let resolver = PathResolver::new(&catalog);

        assert_eq!(
            resolver
                .resolve("./b", "pkg", ResolutionRules::for_extension(".ext"))
                .as_deref(),
            Some("pkg/b.ext")
        );
    }

    #[test]
    fn test_python_relative_to_path() {
        assert_eq!(python_relative_to_path(".models"), "./models");
        assert_eq!(python_relative_to_path("..pkg.mod"), "./../pkg/mod");
        assert_eq!(python_relative_to_path(".."), "./../");
    }

    #[test]
    fn test_specifier_path_for_missing_names() {
        let py = Some(LanguageFamily::Python);
        let js = Some(LanguageFamily::JavaScript);

        assert_eq!(specifier_path("package.sub", "app", py), "package/sub");
        assert_eq!(specifier_path("./nonexistent", "", js), "nonexistent");
        assert_eq!(specifier_path("@org/shared", "src", js), "@org/shared");
    }
}
