//! Packages as nodes of the dependency graph.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::policy::Category;

/// Facts the metadata source reports for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFacts {
    /// Directory holding the package sources; children resolve relative to it.
    pub dir: PathBuf,
    /// Regular imports, as reported by the source.
    pub imports: Vec<String>,
    /// Imports only reachable from `_test.go` files (in-package and external tests).
    pub test_imports: Vec<String>,
    /// Part of the standard distribution.
    pub is_stdlib: bool,
    /// At least one file links native code (cgo).
    pub has_native: bool,
}

/// How resolving a package ended. Set once, when the unit is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Resolved,
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// A uniquely named package reached during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    name: String,
    dir: PathBuf,
    deps: Vec<String>,
    is_stdlib: bool,
    has_native: bool,
    declared: bool,
    outcome: Outcome,
}

impl Unit {
    /// Build a resolved unit. `with_tests` folds test imports into the dependency list.
    pub fn resolved(name: impl Into<String>, facts: UnitFacts, declared: bool, with_tests: bool) -> Self {
        let name = name.into();
        let extra: &[String] = if with_tests { &facts.test_imports } else { &[] };
        let deps = dedup_deps(&name, facts.imports.iter().chain(extra));
        Self {
            name,
            dir: facts.dir,
            deps,
            is_stdlib: facts.is_stdlib,
            has_native: facts.has_native,
            declared,
            outcome: Outcome::Resolved,
        }
    }

    /// Build a unit whose resolution failed. It keeps no dependencies.
    pub fn failed(
        name: impl Into<String>,
        search_dir: &Path,
        declared: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dir: search_dir.to_path_buf(),
            deps: Vec::new(),
            is_stdlib: false,
            has_native: false,
            declared,
            outcome: Outcome::Failed(reason.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Declared dependencies in discovery order, without duplicates or self references.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub fn is_stdlib(&self) -> bool {
        self.is_stdlib
    }

    pub fn has_native(&self) -> bool {
        self.has_native
    }

    /// Matches an entry of the project's required dependency list.
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_failed()
    }

    /// Color category, first match wins: builtin, native, declared dependency, error, internal.
    pub fn category(&self) -> Category {
        if self.is_stdlib {
            Category::Builtin
        } else if self.has_native {
            Category::Native
        } else if self.declared {
            Category::DeclaredDependency
        } else if self.is_failed() {
            Category::Error
        } else {
            Category::Internal
        }
    }
}

fn dedup_deps<'a>(own: &str, names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    for name in names {
        // foo_test importing foo must not become a self edge
        if name == own {
            continue;
        }
        if seen.insert(name.as_str()) {
            deps.push(name.clone());
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(imports: &[&str], test_imports: &[&str]) -> UnitFacts {
        UnitFacts {
            dir: PathBuf::from("/src/app"),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            test_imports: test_imports.iter().map(|s| s.to_string()).collect(),
            ..UnitFacts::default()
        }
    }

    #[test]
    fn test_self_reference_dropped() {
        let unit = Unit::resolved("app", facts(&["app", "lib"], &["app"]), false, true);
        assert_eq!(unit.deps(), ["lib".to_string()]);
    }

    #[test]
    fn test_test_imports_merged_and_deduplicated() {
        let unit = Unit::resolved("app", facts(&["lib", "util"], &["util", "testkit"]), false, true);
        assert_eq!(unit.deps(), ["lib", "util", "testkit"]);

        let unit = Unit::resolved("app", facts(&["lib", "util"], &["util", "testkit"]), false, false);
        assert_eq!(unit.deps(), ["lib", "util"]);
    }

    #[test]
    fn test_failed_unit_has_no_deps() {
        let unit = Unit::failed("missing", Path::new("/src"), false, "cannot find package");
        assert!(unit.is_failed());
        assert!(unit.deps().is_empty());
        assert_eq!(unit.dir(), Path::new("/src"));
        assert_eq!(unit.category(), Category::Error);
    }

    #[test]
    fn test_category_priority() {
        let mut native = facts(&[], &[]);
        native.has_native = true;
        let unit = Unit::resolved("github.com/x/sqlite", native.clone(), true, false);
        assert_eq!(unit.category(), Category::Native);

        let mut std = native;
        std.is_stdlib = true;
        assert_eq!(Unit::resolved("net", std, false, false).category(), Category::Builtin);

        let declared = Unit::resolved("github.com/x/y", facts(&[], &[]), true, false);
        assert_eq!(declared.category(), Category::DeclaredDependency);

        let declared_failed = Unit::failed("github.com/x/z", Path::new("/"), true, "boom");
        assert_eq!(declared_failed.category(), Category::DeclaredDependency);

        let internal = Unit::resolved("app/internal", facts(&[], &[]), false, false);
        assert_eq!(internal.category(), Category::Internal);
    }
}
