//! Visibility and color classification of packages.

use strum_macros::{Display, IntoStaticStr};

use crate::manifest::Manifest;
use crate::unit::Unit;

/// Color bucket of a rendered package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Builtin,
    Native,
    DeclaredDependency,
    Error,
    Internal,
}

impl Category {
    /// Graphviz fill color for the category.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Builtin => "palegreen",
            Category::Native => "darkgoldenrod1",
            Category::DeclaredDependency => "palegoldenrod",
            Category::Error => "red",
            Category::Internal => "paleturquoise",
        }
    }
}

/// External module paths required by the project manifest, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredDeps {
    paths: Vec<String>,
}

impl RequiredDeps {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();
        Self { paths }
    }

    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::new(manifest.requires.iter().map(|r| r.path.clone()))
    }

    /// Substring containment against any entry.
    pub fn matches(&self, name: &str) -> bool {
        self.paths.iter().any(|p| name.contains(p.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Decides which units are hidden from the graph.
#[derive(Debug, Clone, Default)]
pub struct VisibilityPolicy {
    required: RequiredDeps,
    honor_manifest: bool,
}

impl VisibilityPolicy {
    pub fn new(required: RequiredDeps, honor_manifest: bool) -> Self {
        Self {
            required,
            honor_manifest,
        }
    }

    pub fn required(&self) -> &RequiredDeps {
        &self.required
    }

    pub fn honor_manifest(&self) -> bool {
        self.honor_manifest
    }

    /// Whether `name` belongs to the declared external dependency set.
    pub fn is_declared(&self, name: &str) -> bool {
        self.required.matches(name)
    }

    /// Hidden when it matches a required dependency (while the manifest filter is on)
    /// or ships with the standard distribution.
    pub fn is_filtered(&self, unit: &Unit) -> bool {
        let declared = self.honor_manifest && unit.is_declared();
        declared || unit.is_stdlib()
    }
}
